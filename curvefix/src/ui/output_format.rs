//! Plain and coloured message output.
//!
//! Every helper writes one line to the given writer and never decides on
//! colour itself.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use crate::ui::theme::ThemeEntry;

/// Writes `msg` followed by a newline, coloured for `entry` if allowed.
pub fn print_styled<W: Write>(writer: &mut W, msg: &str, entry: ThemeEntry, supports_color: bool) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{}", msg.color(entry.color()))
    } else {
        writeln!(writer, "{}", msg)
    }
}

pub fn print_header<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_styled(writer, msg, ThemeEntry::Header, supports_color)
}

pub fn print_success_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_styled(writer, msg, ThemeEntry::Success, supports_color)
}

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_styled(writer, msg, ThemeEntry::Info, supports_color)
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_styled(writer, msg, ThemeEntry::Warn, supports_color)
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, supports_color: bool) -> io::Result<()> {
    print_styled(writer, msg, ThemeEntry::Error, supports_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_escape_codes_without_color() {
        let mut buf = Vec::new();
        print_warn_message(&mut buf, "careful", false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "careful\n");
    }

    #[test]
    fn escape_codes_with_color() {
        let mut buf = Vec::new();
        print_error_message(&mut buf, "boom", true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("boom"));
    }
}
