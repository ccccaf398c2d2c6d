// File: curvefix-core/src/headless.rs

//! `headless.rs`
//! One-shot entry points that need no UI: rewrite a string, or rewrite one
//! file into another.
//!
//! `rewrite_file` reads the whole input into memory, runs every pass, and
//! only then writes the output in a single call, so a failure never leaves a
//! partially written result behind.

use log::{debug, info};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{RewriteConfig, RewriteSummaryItem};
use crate::engine::{EngineOptions, RewriteEngine};
use crate::engines::regex_engine::RegexRewriteEngine;
use crate::errors::CurvefixError;

/// The test file the migration was written for, relative to the repository root.
pub const DEFAULT_INPUT_PATH: &str = "expansion-packs/bmad-blockchain-dev/test/bonding-curves/LMSRBondingCurve.test.js";

/// Suffix appended to the input path when no output path is given.
pub const OUTPUT_SUFFIX: &str = ".fixed";

/// Result of a successful [`rewrite_file`] run.
#[derive(Debug, Clone)]
pub struct RewriteReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original: String,
    pub rewritten: String,
    pub summary: Vec<RewriteSummaryItem>,
}

impl RewriteReport {
    pub fn total_rewrites(&self) -> usize {
        self.summary.iter().map(|s| s.occurrences).sum()
    }

    pub fn suspect_rewrites(&self) -> usize {
        self.summary.iter().map(|s| s.suspect_occurrences).sum()
    }
}

/// Hooks called by [`rewrite_file_with_progress`] between its steps.
///
/// All methods default to doing nothing; `()` is the silent implementation.
pub trait RewriteProgress {
    /// The input was read and the passes are about to run.
    fn started(&mut self, _input: &Path) {}
    /// One pass has run. Called once per rule, in pass order.
    fn pass_finished(&mut self, _item: &RewriteSummaryItem) {}
    /// All passes have run and the output is about to be written.
    fn writing(&mut self, _output: &Path) {}
}

impl RewriteProgress for () {}

/// `input` with [`OUTPUT_SUFFIX`] appended, e.g. `a.test.js` → `a.test.js.fixed`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut s: OsString = input.as_os_str().to_owned();
    s.push(OUTPUT_SUFFIX);
    PathBuf::from(s)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rewrites `input` into `output` with `engine`.
///
/// The input file is never modified: an `output` that resolves to the same
/// file is rejected before anything is read.
pub fn rewrite_file(engine: &dyn RewriteEngine, input: &Path, output: &Path) -> Result<RewriteReport, CurvefixError> {
    rewrite_file_with_progress(engine, input, output, &mut ())
}

/// [`rewrite_file`], reporting each step to `progress`.
pub fn rewrite_file_with_progress(
    engine: &dyn RewriteEngine,
    input: &Path,
    output: &Path,
    progress: &mut dyn RewriteProgress,
) -> Result<RewriteReport, CurvefixError> {
    if is_same_file(input, output) {
        return Err(CurvefixError::OutputIsInput(output.to_path_buf()));
    }

    info!("Reading input from {}", input.display());
    let original = fs::read_to_string(input).map_err(|source| CurvefixError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes.", original.len());
    progress.started(input);

    let source_id = input.display().to_string();
    let (rewritten, summary) = engine.rewrite(&original, &source_id)?;
    for item in &summary {
        progress.pass_finished(item);
    }

    progress.writing(output);
    info!("Writing rewritten content to {}", output.display());
    fs::write(output, &rewritten).map_err(|source| CurvefixError::WriteOutput {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(RewriteReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        original,
        rewritten,
        summary,
    })
}

/// Rewrites a string with a freshly compiled regex engine.
pub fn headless_rewrite_string(
    config: RewriteConfig,
    options: EngineOptions,
    content: &str,
    source_id: &str,
) -> Result<String, CurvefixError> {
    let engine = RegexRewriteEngine::with_options(config, options)?;
    let (rewritten, _) = engine.rewrite(content, source_id)?;
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_appends_fixed() {
        assert_eq!(
            default_output_path(Path::new(DEFAULT_INPUT_PATH)),
            PathBuf::from("expansion-packs/bmad-blockchain-dev/test/bonding-curves/LMSRBondingCurve.test.js.fixed")
        );
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl RewriteProgress for Recorder {
        fn started(&mut self, _input: &Path) {
            self.events.push("started".to_string());
        }
        fn pass_finished(&mut self, item: &RewriteSummaryItem) {
            self.events.push(format!("{}={}", item.rule_name, item.occurrences));
        }
        fn writing(&mut self, _output: &Path) {
            self.events.push("writing".to_string());
        }
    }

    #[test]
    fn progress_sees_every_pass_between_read_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.test.js");
        fs::write(&input, "lmsr.name();").unwrap();
        let engine = RegexRewriteEngine::new(RewriteConfig::load_default_rules().unwrap()).unwrap();

        let mut recorder = Recorder::default();
        rewrite_file_with_progress(&engine, &input, &default_output_path(&input), &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec!["started", "curve_name=1", "get_prices=0", "calculate_cost=0", "calculate_refund=0", "writing"]
        );
    }

    #[test]
    fn unreadable_input_skips_every_hook() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.test.js");
        let engine = RegexRewriteEngine::new(RewriteConfig::load_default_rules().unwrap()).unwrap();

        let mut recorder = Recorder::default();
        let result = rewrite_file_with_progress(&engine, &input, &default_output_path(&input), &mut recorder);

        assert!(result.is_err());
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn headless_rewrite_string_uses_all_default_rules() {
        let config = RewriteConfig::load_default_rules().unwrap();
        let out = headless_rewrite_string(
            config,
            EngineOptions::default(),
            "lmsr.name(); lmsr.calculateRefund(a, b, c, d, e);",
            "inline",
        )
        .unwrap();
        assert_eq!(out, "lmsr.curveName(); lmsr.calculateRefund(e, a, b, d, c);");
    }
}
