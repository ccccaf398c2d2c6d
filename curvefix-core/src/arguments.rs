//! Bracket-depth-aware scanning of call argument lists.
//!
//! The regex rules capture each argument as "everything up to the next comma",
//! which breaks on arguments such as `toWei(1, 'ether')` or `[a, b]`. This
//! module provides the two pieces needed to deal with that:
//!
//! * [`is_balanced`] flags a captured argument that was obviously mis-split.
//! * [`find_call_end`] and [`split_top_level`] extract arguments properly, for
//!   the balanced argument mode of the engine.
//! * [`line_comment_start`] and [`join_arguments`] deal with an argument that
//!   ends in a `//` comment, which would swallow whatever follows it on the
//!   same line once the arguments are reordered.
//!
//! Quoted strings (`'`, `"`, `` ` ``) and `//` / `/* */` comments are opaque.
//! Regex literals are not recognised.

use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Unmatched,
    TopLevelComma,
    Other,
    Ignored,
}

/// Walks source text one character at a time, tracking bracket nesting.
#[derive(Debug)]
struct Nesting {
    mode: Mode,
    /// Expected closing brackets, innermost last.
    stack: Vec<char>,
    escaped: bool,
    skip_next: bool,
    mismatched: bool,
}

impl Nesting {
    fn new() -> Self {
        Self {
            mode: Mode::Code,
            stack: Vec::new(),
            escaped: false,
            skip_next: false,
            mismatched: false,
        }
    }

    fn feed(&mut self, c: char, next: Option<char>) -> Token {
        if self.skip_next {
            self.skip_next = false;
            return Token::Ignored;
        }

        match self.mode {
            Mode::LineComment => {
                if c == '\n' {
                    self.mode = Mode::Code;
                }
                Token::Ignored
            }
            Mode::BlockComment => {
                if c == '*' && next == Some('/') {
                    self.skip_next = true;
                    self.mode = Mode::Code;
                }
                Token::Ignored
            }
            Mode::Quoted(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.mode = Mode::Code;
                }
                Token::Ignored
            }
            Mode::Code => match c {
                '/' if next == Some('/') => {
                    self.mode = Mode::LineComment;
                    self.skip_next = true;
                    Token::Ignored
                }
                '/' if next == Some('*') => {
                    self.mode = Mode::BlockComment;
                    self.skip_next = true;
                    Token::Ignored
                }
                '\'' | '"' | '`' => {
                    self.mode = Mode::Quoted(c);
                    Token::Ignored
                }
                '(' => self.open(')'),
                '[' => self.open(']'),
                '{' => self.open('}'),
                ')' | ']' | '}' => {
                    if self.stack.pop() == Some(c) {
                        Token::Close
                    } else {
                        self.mismatched = true;
                        Token::Unmatched
                    }
                }
                ',' if self.stack.is_empty() => Token::TopLevelComma,
                _ => Token::Other,
            },
        }
    }

    fn open(&mut self, closer: char) -> Token {
        self.stack.push(closer);
        Token::Open
    }

    /// True when every bracket is closed and no string is left open.
    fn is_settled(&self) -> bool {
        !self.mismatched
            && self.stack.is_empty()
            && matches!(self.mode, Mode::Code | Mode::LineComment)
    }
}

fn tokens(text: &str) -> impl FnMut(&mut Nesting) -> Option<(usize, Token)> + '_ {
    let mut chars: Peekable<CharIndices<'_>> = text.char_indices().peekable();
    move |nesting| {
        let (idx, c) = chars.next()?;
        let next = chars.peek().map(|&(_, n)| n);
        Some((idx, nesting.feed(c, next)))
    }
}

/// Returns true if `arg` closes every bracket and quote it opens.
pub fn is_balanced(arg: &str) -> bool {
    let mut nesting = Nesting::new();
    let mut next_token = tokens(arg);
    while let Some((_, token)) = next_token(&mut nesting) {
        if token == Token::Unmatched {
            return false;
        }
    }
    nesting.is_settled()
}

/// Byte offset of the `//` comment that `arg` ends in, if any.
pub fn line_comment_start(arg: &str) -> Option<usize> {
    let mut nesting = Nesting::new();
    let mut start = None;
    let mut next_token = tokens(arg);
    while let Some((idx, _)) = next_token(&mut nesting) {
        match nesting.mode {
            Mode::LineComment if start.is_none() => start = Some(idx),
            Mode::LineComment => {}
            _ => start = None,
        }
    }
    start
}

/// Joins reordered arguments with `", "`.
///
/// An argument ending in a `//` comment gets its separator placed before the
/// comment and a newline after it, so the comment cannot reach the arguments
/// that follow or the closing parenthesis.
pub fn join_arguments(args: &[&str]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        let last = i + 1 == args.len();
        match line_comment_start(arg) {
            Some(at) => {
                out.push_str(arg[..at].trim_end());
                if !last {
                    out.push(',');
                }
                out.push(' ');
                out.push_str(&arg[at..]);
                out.push('\n');
            }
            None => {
                out.push_str(arg);
                if !last {
                    out.push_str(", ");
                }
            }
        }
    }
    out
}

/// Given the byte offset of an opening `(`, returns the byte offset of the
/// `)` that closes it, or `None` if the text ends first or the brackets
/// cross.
pub fn find_call_end(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return None;
    }
    let body = &text[open + 1..];
    let mut nesting = Nesting::new();
    nesting.stack.push(')');

    let mut next_token = tokens(body);
    while let Some((idx, token)) = next_token(&mut nesting) {
        match token {
            Token::Close if nesting.stack.is_empty() => return Some(open + 1 + idx),
            Token::Unmatched => return None,
            _ => {}
        }
    }
    None
}

/// Splits an argument list (the text between the call's parentheses) on
/// top-level commas. Each piece is trimmed. A trailing comma does not produce
/// an extra empty argument, and an empty list yields no arguments.
pub fn split_top_level(args: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut nesting = Nesting::new();
    let mut start = 0;

    let mut next_token = tokens(args);
    while let Some((idx, token)) = next_token(&mut nesting) {
        if token == Token::TopLevelComma {
            pieces.push(args[start..idx].trim());
            start = idx + 1;
        }
    }
    pieces.push(args[start..].trim());

    if pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_arguments_are_balanced() {
        assert!(is_balanced("LIQUIDITY_PARAM"));
        assert!(is_balanced("ethers.parseEther(\"1\")"));
        assert!(is_balanced("[1, 2]"));
    }

    #[test]
    fn half_of_a_nested_call_is_not_balanced() {
        assert!(!is_balanced("toWei(1"));
        assert!(!is_balanced("'ether')"));
        assert!(!is_balanced("\"unterminated"));
    }

    #[test]
    fn brackets_inside_strings_and_comments_are_ignored() {
        assert!(is_balanced("'(' // )"));
        assert!(is_balanced("x /* ( */"));
    }

    #[test]
    fn finds_matching_paren_across_nesting() {
        let text = "f(a, g(b, c), [d, e]) + 1";
        assert_eq!(find_call_end(text, 1), Some(20));
        assert_eq!(&text[2..20], "a, g(b, c), [d, e]");
    }

    #[test]
    fn unterminated_call_has_no_end() {
        assert_eq!(find_call_end("f(a, (b", 1), None);
        assert_eq!(find_call_end("f(a]", 1), None);
        assert_eq!(find_call_end("fa", 1), None);
    }

    #[test]
    fn splits_only_on_top_level_commas() {
        let pieces = split_top_level("\n    toWei(1, 'ether'),\n    [a, b],\n    \"x,y\",\n    last,\n");
        assert_eq!(pieces, vec!["toWei(1, 'ether')", "[a, b]", "\"x,y\"", "last"]);
    }

    #[test]
    fn empty_argument_list() {
        assert!(split_top_level("").is_empty());
        assert!(split_top_level("   ").is_empty());
    }

    #[test]
    fn finds_a_trailing_line_comment() {
        assert_eq!(line_comment_start("0 // Invalid b = 0"), Some(2));
        assert_eq!(line_comment_start("// currentYes\n1"), None);
        assert_eq!(line_comment_start("'//' + x"), None);
        assert_eq!(line_comment_start("x /* // */"), None);
        assert_eq!(line_comment_start("ONE_ETHER"), None);
    }

    #[test]
    fn joining_keeps_trailing_comments_closed() {
        assert_eq!(join_arguments(&["a", "b", "c"]), "a, b, c");
        assert_eq!(join_arguments(&["0 // Invalid b = 0", "x", "y"]), "0, // Invalid b = 0\nx, y");
        assert_eq!(join_arguments(&["x", "y // last"]), "x, y // last\n");
    }

    #[test]
    fn comments_do_not_split() {
        let pieces = split_top_level("0, // currentYes, really\n1");
        assert_eq!(pieces, vec!["0", "// currentYes, really\n1"]);
    }
}
