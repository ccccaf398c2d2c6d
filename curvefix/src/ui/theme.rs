//! Colours for the logical parts of curvefix's terminal output.
//!
//! Colour is only applied when the target stream is a terminal; callers pass
//! that decision in as `supports_color`.

use owo_colors::AnsiColors;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEntry {
    /// Banner and section titles.
    Header,
    Success,
    Info,
    Warn,
    Error,
    DiffAdded,
    DiffRemoved,
    DiffHeader,
}

impl ThemeEntry {
    /// The foreground colour for this entry.
    pub fn color(self) -> AnsiColors {
        match self {
            ThemeEntry::Header => AnsiColors::BrightCyan,
            ThemeEntry::Success => AnsiColors::Green,
            ThemeEntry::Info => AnsiColors::White,
            ThemeEntry::Warn => AnsiColors::Yellow,
            ThemeEntry::Error => AnsiColors::Red,
            ThemeEntry::DiffAdded => AnsiColors::Green,
            ThemeEntry::DiffRemoved => AnsiColors::Red,
            ThemeEntry::DiffHeader => AnsiColors::BrightBlack,
        }
    }
}
