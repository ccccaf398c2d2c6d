//! rewrite_match.rs - Records of individual rewrites and their aggregation.
//!
//! License: MIT OR APACHE 2.0

use crate::config::RewriteSummaryItem;

/// One applied rewrite.
///
/// Offsets and line numbers refer to the text the rule ran on, which is the
/// output of the rules before it, not necessarily the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteMatch {
    pub rule_name: String,
    /// The matched text.
    pub original: String,
    /// The text it was replaced with.
    pub replacement: String,
    pub start: usize,
    pub end: usize,
    /// 1-based line of `start`.
    pub line_number: usize,
    /// Set when a captured argument had unbalanced brackets or quotes, which
    /// means the naive comma split probably cut an argument in two.
    pub suspect: bool,
    pub source_id: String,
}

/// Returns the 1-based line containing byte offset `pos`.
pub fn line_number_at(content: &str, pos: usize) -> usize {
    content.as_bytes()[..pos.min(content.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

/// Builds the summary entry for one rule from the matches it produced.
pub fn summarize(rule_name: &str, label: &str, matches: &[RewriteMatch]) -> RewriteSummaryItem {
    RewriteSummaryItem {
        rule_name: rule_name.to_string(),
        label: label.to_string(),
        occurrences: matches.len(),
        suspect_occurrences: matches.iter().filter(|m| m.suspect).count(),
        original_texts: matches.iter().map(|m| m.original.clone()).collect(),
        rewritten_texts: matches.iter().map(|m| m.replacement.clone()).collect(),
    }
}
