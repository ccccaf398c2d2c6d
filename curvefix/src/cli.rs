//! This file defines the command-line interface (CLI) for the curvefix
//! application.
//! License: MIT OR Apache-2.0

use clap::Parser;
use std::path::PathBuf;

use curvefix_core::DEFAULT_INPUT_PATH;

/// Top-level CLI definition.
///
/// Every flag is optional: running `curvefix` with no arguments rewrites the
/// default LMSR test file into `<file>.fixed`.
#[derive(Parser, Debug)]
#[command(
    name = "curvefix",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Migrate LMSR bonding-curve tests to the IBondingCurve interface",
    long_about = "curvefix rewrites a JavaScript test file so its calls match the IBondingCurve interface: name() becomes curveName(), getPrice(yes, no, isYes, params) becomes a destructured getPrices(params, yes, no), and calculateCost/calculateRefund take their arguments in the new order. The input is never modified; the result is written next to it with a .fixed suffix for review.",
)]
pub struct Cli {
    /// Test file to rewrite.
    #[arg(long, short = 'i', value_name = "FILE", default_value = DEFAULT_INPUT_PATH, help = "Test file to rewrite.")]
    pub input: PathBuf,

    /// Where to write the result (defaults to the input path plus `.fixed`).
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the rewritten file here instead of <input>.fixed.")]
    pub output: Option<PathBuf>,

    /// Receiver variable the calls are made on.
    #[arg(long, short = 'r', value_name = "NAME", help = "Receiver variable the calls are made on (default: lmsr).")]
    pub receiver: Option<String>,

    /// Path to a YAML file of extra or overriding rewrite rules.
    #[arg(long = "config", value_name = "FILE", help = "Path to a YAML file of extra or overriding rewrite rules.")]
    pub config: Option<PathBuf>,

    /// Print a unified diff of the changes.
    #[arg(long, short = 'D', help = "Print a unified diff of the changes.")]
    pub diff: bool,

    /// Split call arguments on top-level commas only.
    #[arg(
        long = "balanced-args",
        help = "Split calculateCost/calculateRefund arguments on top-level commas only, so nested calls and literals stay whole."
    )]
    pub balanced_args: bool,

    /// Print a table of rewrites per rule.
    #[arg(long, help = "Print a table of rewrites per rule.")]
    pub summary: bool,

    /// Disable informational messages
    #[arg(long, short = 'q', conflicts_with = "debug", help = "Suppress progress output and logging.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_uses_the_default_file() {
        let cli = Cli::try_parse_from(["curvefix"]).unwrap();
        assert_eq!(cli.input, PathBuf::from(DEFAULT_INPUT_PATH));
        assert!(cli.output.is_none());
        assert!(!cli.balanced_args);
    }

    #[test]
    fn quiet_and_debug_conflict() {
        assert!(Cli::try_parse_from(["curvefix", "-q", "-d"]).is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["curvefix", "-i", "a.js", "-o", "b.js", "-r", "curve", "-D"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("a.js"));
        assert_eq!(cli.output, Some(PathBuf::from("b.js")));
        assert_eq!(cli.receiver.as_deref(), Some("curve"));
        assert!(cli.diff);
    }
}
