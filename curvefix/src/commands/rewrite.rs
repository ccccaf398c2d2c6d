//! The rewrite command: runs the engine over one file and reports progress.

use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use curvefix_core::{
    merge_rules, rewrite_file_with_progress, ArgumentMode, EngineOptions, RegexRewriteEngine, RewriteConfig,
    RewriteEngine, RewriteProgress, RewriteReport, RewriteSummaryItem, RuleKind, DEFAULT_INPUT_PATH,
};

use crate::ui::{diff_viewer, output_format, summary_table};

/// Path handed to `npm test` in the closing instructions for the default file.
const DEFAULT_TEST_TARGET: &str = "test/bonding-curves/LMSRBondingCurve.test.js";

const RULE_WIDTH: usize = 60;

/// Options for [`run_rewrite`].
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub diff: bool,
    pub summary: bool,
    pub quiet: bool,
}

/// Prints the per-step progress lines while `rewrite_file_with_progress` runs.
struct ConsoleProgress<'w, W: Write> {
    writer: &'w mut W,
    color: bool,
    quiet: bool,
    note_basis_points: bool,
}

impl<W: Write> ConsoleProgress<'_, W> {
    fn info(&mut self, msg: &str) {
        if !self.quiet {
            let _ = output_format::print_info_message(self.writer, msg, self.color);
        }
    }

    fn success(&mut self, msg: &str) {
        if !self.quiet {
            let _ = output_format::print_success_message(self.writer, msg, self.color);
        }
    }

    fn warn(&mut self, msg: &str) {
        if !self.quiet {
            let _ = output_format::print_warn_message(self.writer, msg, self.color);
        }
    }
}

impl<W: Write> RewriteProgress for ConsoleProgress<'_, W> {
    fn started(&mut self, _input: &Path) {
        self.info("🔧 Starting systematic fix...");
    }

    fn pass_finished(&mut self, item: &RewriteSummaryItem) {
        debug!("Pass '{}' finished with {} rewrite(s).", item.rule_name, item.occurrences);
        self.success(&format!("  ✅ Fixing {}", item.label));
    }

    fn writing(&mut self, _output: &Path) {
        if self.note_basis_points {
            self.warn("  ⚠️  Note: getPrices() returns basis points (0-10000), not ETH amounts");
            self.warn("      Test expectations may need adjustment if they expect ETH values");
        }
    }
}

/// Loads the embedded rules, merges `config_path` over them, applies the
/// receiver override and compiles the result.
pub fn build_engine(
    config_path: Option<&Path>,
    receiver: Option<&str>,
    balanced_args: bool,
) -> Result<RegexRewriteEngine> {
    let defaults = RewriteConfig::load_default_rules().context("Failed to load the built-in rewrite rules")?;
    let user = config_path
        .map(|p| {
            debug!("Loading user rules from {}", p.display());
            RewriteConfig::load_from_file(p)
        })
        .transpose()?;
    let mut config = merge_rules(defaults, user);
    if let Some(receiver) = receiver {
        config.set_receiver(receiver);
    }

    let options = EngineOptions {
        argument_mode: if balanced_args { ArgumentMode::Balanced } else { ArgumentMode::Naive },
    };
    debug!("Compiling rules for receiver '{}' with {:?}", config.receiver(), options.argument_mode);
    RegexRewriteEngine::with_options(config, options).context("Failed to compile rewrite rules")
}

fn test_target(input: &Path) -> String {
    if input == Path::new(DEFAULT_INPUT_PATH) {
        DEFAULT_TEST_TARGET.to_string()
    } else {
        input.display().to_string()
    }
}

/// Rewrites `opts.input` into `opts.output` with `engine`, writing the
/// progress log, optional diff and summary, and next-step instructions to
/// `out`.
pub fn run_rewrite<W: Write>(
    engine: &dyn RewriteEngine,
    opts: &RewriteOptions,
    out: &mut W,
    color: bool,
) -> Result<RewriteReport> {
    info!("Starting curvefix rewrite operation.");

    if !opts.quiet {
        output_format::print_header(out, "🚀 LMSR Test Suite Fixer", color)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    }

    let note_basis_points = engine
        .compiled_rules()
        .rules
        .iter()
        .any(|r| r.kind == RuleKind::PriceSplit);

    let report = {
        let mut progress = ConsoleProgress {
            writer: &mut *out,
            color,
            quiet: opts.quiet,
            note_basis_points,
        };
        rewrite_file_with_progress(engine, &opts.input, &opts.output, &mut progress)
            .with_context(|| format!("Failed to rewrite {}", opts.input.display()))?
    };

    if !opts.quiet {
        writeln!(out)?;
        output_format::print_success_message(
            out,
            &format!("✅ Fixed test file written to: {}", opts.output.display()),
            color,
        )?;
        writeln!(out)?;
        output_format::print_header(out, "📋 Changes made:", color)?;
        for rule in &engine.compiled_rules().rules {
            writeln!(out, "  - {}", rule.description)?;
        }

        let suspects = report.suspect_rewrites();
        if suspects > 0 {
            writeln!(out)?;
            output_format::print_warn_message(
                out,
                &format!(
                    "⚠️  {} rewrite(s) may have mangled an argument (nested comma or trailing // comment); review them or re-run with --balanced-args",
                    suspects
                ),
                color,
            )?;
        }
    }

    if opts.diff {
        writeln!(out)?;
        diff_viewer::print_diff(
            &report.original,
            &report.rewritten,
            &opts.input.display().to_string(),
            &opts.output.display().to_string(),
            out,
            color,
        )?;
    }

    if opts.summary {
        writeln!(out)?;
        summary_table::print_summary(&report.summary, out)?;
    }

    if !opts.quiet {
        writeln!(out)?;
        output_format::print_success_message(
            out,
            "✅ SUCCESS! Review the fixed file and replace the original if correct.",
            color,
        )?;
        writeln!(out)?;
        writeln!(out, "Next steps:")?;
        writeln!(out, "  1. Review: {}", opts.output.display())?;
        writeln!(out, "  2. If correct: mv {} {}", opts.output.display(), opts.input.display())?;
        writeln!(out, "  3. Run tests: npm test -- {}", test_target(&opts.input))?;
    }

    info!("curvefix rewrite operation completed with {} rewrite(s).", report.total_rewrites());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn engine() -> RegexRewriteEngine {
        build_engine(None, None, false).unwrap()
    }

    #[test]
    fn prints_progress_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.test.js");
        fs::write(&input, "lmsr.name();\n").unwrap();
        let opts = RewriteOptions {
            output: dir.path().join("in.test.js.fixed"),
            input,
            diff: false,
            summary: false,
            quiet: false,
        };

        let mut out = Vec::new();
        run_rewrite(&engine(), &opts, &mut out, false).unwrap();
        let out = String::from_utf8(out).unwrap();

        let order = [
            "🚀 LMSR Test Suite Fixer",
            "🔧 Starting systematic fix...",
            "  ✅ Fixing name() → curveName()",
            "  ✅ Fixing getPrice() → getPrices() patterns",
            "  ✅ Fixing calculateCost() parameter order",
            "  ✅ Fixing calculateRefund() parameter order",
            "  ⚠️  Note: getPrices() returns basis points (0-10000), not ETH amounts",
            "✅ Fixed test file written to:",
            "📋 Changes made:",
            "  - getPrice() → getPrices() with destructuring",
            "✅ SUCCESS!",
            "  2. If correct: mv ",
        ];
        let mut from = 0;
        for needle in order {
            let at = out[from..].find(needle).unwrap_or_else(|| panic!("missing {:?} in:\n{}", needle, out));
            from += at + needle.len();
        }
        assert!(!out.contains("may have mangled"));
    }

    #[test]
    fn quiet_prints_only_requested_extras() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.test.js");
        fs::write(&input, "lmsr.name();\n").unwrap();
        let opts = RewriteOptions {
            output: dir.path().join("out.js"),
            input,
            diff: true,
            summary: false,
            quiet: true,
        };

        let mut out = Vec::new();
        run_rewrite(&engine(), &opts, &mut out, false).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(!out.contains("LMSR Test Suite Fixer"));
        assert!(out.contains("-lmsr.name();"));
        assert!(out.contains("+lmsr.curveName();"));
    }

    #[test]
    fn warns_about_suspect_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.test.js");
        fs::write(&input, "lmsr.calculateCost(0, 0, toWei(1, 'ether'), true, P);\n").unwrap();
        let opts = RewriteOptions {
            output: dir.path().join("out.js"),
            input,
            diff: false,
            summary: true,
            quiet: false,
        };

        let mut out = Vec::new();
        let report = run_rewrite(&engine(), &opts, &mut out, false).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(report.suspect_rewrites(), 1);
        assert!(out.contains("1 rewrite(s) may have mangled an argument"));
        assert!(out.contains("calculate_cost"));
    }

    #[test]
    fn receiver_override_reaches_the_rules() {
        let engine = build_engine(None, Some("curve"), true).unwrap();
        let (out, _) = engine.rewrite("curve.name(); lmsr.name();", "inline").unwrap();
        assert_eq!(out, "curve.curveName(); lmsr.name();");
        assert_eq!(engine.get_options().argument_mode, ArgumentMode::Balanced);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(build_engine(Some(&dir.path().join("nope.yaml")), None, false).is_err());
    }

    #[test]
    fn default_input_uses_the_package_test_path() {
        assert_eq!(test_target(Path::new(DEFAULT_INPUT_PATH)), DEFAULT_TEST_TARGET);
        assert_eq!(test_target(Path::new("a/b.js")), "a/b.js");
    }
}
