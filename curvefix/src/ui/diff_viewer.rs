//! Unified diff of a rewrite, for reviewing changes before replacing the
//! original test file.

use diffy::{create_patch, Line as DiffLine};
use std::io::{self, Write};

use crate::ui::output_format::print_styled;
use crate::ui::theme::ThemeEntry;

/// Writes a unified diff from `original` to `rewritten`.
///
/// `old_name` and `new_name` label the `---`/`+++` header lines.
pub fn print_diff<W: Write>(
    original: &str,
    rewritten: &str,
    old_name: &str,
    new_name: &str,
    writer: &mut W,
    supports_color: bool,
) -> io::Result<()> {
    let patch = create_patch(original, rewritten);

    if patch.hunks().is_empty() {
        return print_styled(writer, "No changes.", ThemeEntry::DiffHeader, supports_color);
    }

    print_styled(writer, &format!("--- {}", old_name), ThemeEntry::DiffHeader, supports_color)?;
    print_styled(writer, &format!("+++ {}", new_name), ThemeEntry::DiffHeader, supports_color)?;

    for hunk in patch.hunks() {
        let old = hunk.old_range();
        let new = hunk.new_range();
        print_styled(
            writer,
            &format!("@@ -{},{} +{},{} @@", old.start(), old.len(), new.start(), new.len()),
            ThemeEntry::DiffHeader,
            supports_color,
        )?;

        for line in hunk.lines() {
            match line {
                DiffLine::Delete(s) => {
                    print_styled(writer, &format!("-{}", s.trim_end_matches('\n')), ThemeEntry::DiffRemoved, supports_color)?;
                }
                DiffLine::Insert(s) => {
                    print_styled(writer, &format!("+{}", s.trim_end_matches('\n')), ThemeEntry::DiffAdded, supports_color)?;
                }
                DiffLine::Context(s) => {
                    writeln!(writer, " {}", s.trim_end_matches('\n'))?;
                }
            }
        }
    }
    Ok(())
}
