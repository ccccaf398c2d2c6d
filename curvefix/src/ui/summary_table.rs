//! Per-rule rewrite counts as a table.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::io::{self, Write};

use curvefix_core::RewriteSummaryItem;

/// Builds the summary table: one row per rule, in pass order.
pub fn build_summary_table(summary: &[RewriteSummaryItem]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rule", "Change", "Rewrites", "Suspect"]);

    for item in summary {
        table.add_row(vec![
            Cell::new(&item.rule_name),
            Cell::new(&item.label),
            Cell::new(item.occurrences),
            Cell::new(item.suspect_occurrences),
        ]);
    }
    table
}

pub fn print_summary<W: Write>(summary: &[RewriteSummaryItem], writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{}", build_summary_table(summary))
}
