//! Terminal output: coloured messages, the diff view and the summary table.

pub mod diff_viewer;
pub mod output_format;
pub mod summary_table;
pub mod theme;
