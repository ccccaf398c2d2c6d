// curvefix-core/src/engine.rs
//! Defines the core RewriteEngine trait and related data structures.
//!
//! The `RewriteEngine` trait is the contract between the rule set and the
//! callers that run it (the CLI, `headless`). It applies every compiled rule
//! in order, each rule seeing the output of the previous one.
//!
//! License: MIT OR APACHE 2.0

use crate::config::{RewriteConfig, RewriteSummaryItem};
use crate::errors::CurvefixError;
use crate::rewrite_match::RewriteMatch;
use crate::rules::compiler::CompiledRules;

/// How `reorder` rules extract call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgumentMode {
    /// The rule's own regex, one `[^,]+` capture per argument. Arguments that
    /// contain commas are split wrongly; such matches are flagged as suspect.
    #[default]
    Naive,
    /// Scan for the rule's `call` prefix and split arguments on top-level
    /// commas only.
    Balanced,
}

/// Options that change how an engine applies its rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub argument_mode: ArgumentMode,
}

/// A trait that defines the core functionality of a rewrite engine.
pub trait RewriteEngine {
    /// Applies all rules in order and returns the rewritten content together
    /// with one summary item per rule, in pass order.
    ///
    /// Rules that match nothing still get a summary item with zero
    /// occurrences.
    fn rewrite(&self, content: &str, source_id: &str) -> Result<(String, Vec<RewriteSummaryItem>), CurvefixError>;

    /// Runs the same passes as [`RewriteEngine::rewrite`] but only returns the
    /// individual matches. Offsets of each match refer to the input of the
    /// pass that produced it.
    fn find_matches(&self, content: &str, source_id: &str) -> Result<Vec<RewriteMatch>, CurvefixError>;

    /// Returns a reference to the `CompiledRules` used by the engine.
    fn compiled_rules(&self) -> &CompiledRules;

    /// Returns a reference to the engine's configuration.
    fn get_rules(&self) -> &RewriteConfig;

    /// Returns a reference to the engine's options.
    fn get_options(&self) -> &EngineOptions;
}
