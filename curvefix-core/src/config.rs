//! Configuration management for `curvefix-core`.
//!
//! This module defines the data structures for rewrite rules. It handles
//! deserialization of the YAML rule format and provides utilities for loading,
//! merging and validating rule sets. The built-in migration rules are embedded
//! from `config/default_rules.yaml`.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::errors::CurvefixError;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Receiver variable used when neither the config nor the CLI names one.
pub const DEFAULT_RECEIVER: &str = "lmsr";

/// Placeholder substituted with the receiver name in `pattern` and `call`.
pub const RECEIVER_PLACEHOLDER: &str = "{receiver}";

/// How a rule turns a match into replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Exact-text search and replace.
    #[default]
    Literal,
    /// A boolean-flagged getter split into a destructured tuple getter.
    PriceSplit,
    /// A positional argument permutation.
    Reorder,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::Literal => "literal",
            RuleKind::PriceSplit => "price_split",
            RuleKind::Reorder => "reorder",
        };
        f.write_str(s)
    }
}

/// A single rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteRule {
    /// Unique identifier for the rule (e.g., "calculate_cost").
    pub name: String,
    /// Human-readable description of the interface change.
    pub description: Option<String>,
    /// Short progress label, e.g. "name() → curveName()".
    pub label: Option<String>,
    pub kind: RuleKind,
    /// Literal text for `literal` rules, a regex for the other kinds.
    pub pattern: Option<String>,
    /// A tinytemplate template rendered for each match.
    pub replace_with: String,
    /// New order of the positional (unnamed) capture groups, 0-based.
    pub argument_order: Option<Vec<usize>>,
    /// Regex prefix of the call site, used by balanced argument scanning.
    pub call: Option<String>,
    /// If true, enables multiline mode for the regex engine.
    pub multiline: bool,
    /// If true, the dot character `.` in regex will match newlines.
    pub dot_matches_new_line: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
}

impl RewriteRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| self.label())
    }
}

/// The top-level rule configuration.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RewriteConfig {
    /// Variable name the rewritten calls are made on.
    #[serde(default)]
    pub receiver: Option<String>,
    /// Rules, applied in order.
    #[serde(default)]
    pub rules: Vec<RewriteRule>,
}

/// Per-rule summary of one rewrite run, in pass order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSummaryItem {
    pub rule_name: String,
    pub label: String,
    pub occurrences: usize,
    /// Matches whose captured arguments looked mis-split.
    pub suspect_occurrences: usize,
    pub original_texts: Vec<String>,
    pub rewritten_texts: Vec<String>,
}

impl RewriteConfig {
    /// Returns the configured receiver, falling back to [`DEFAULT_RECEIVER`].
    pub fn receiver(&self) -> &str {
        self.receiver.as_deref().unwrap_or(DEFAULT_RECEIVER)
    }

    /// Replaces the receiver, e.g. from a CLI override.
    pub fn set_receiver(&mut self, receiver: impl Into<String>) {
        self.receiver = Some(receiver.into());
    }

    /// Loads rewrite rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());
        Ok(config)
    }

    /// Loads the built-in migration rules.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config = Self::from_yaml(default_yaml).context("Failed to parse default rules")?;
        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Parses and validates a YAML rule document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: RewriteConfig =
            serde_yml::from_str(text).map_err(|e| CurvefixError::ConfigParse(e.to_string()))?;
        validate_rules(&config.rules)?;
        Ok(config)
    }

    /// Rules that will actually run, in order.
    pub fn active_rules(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter().filter(|r| r.is_enabled())
    }
}

/// Merges user-defined rules over the defaults.
///
/// A user rule with the name of a default rule replaces it in place, so pass
/// order is kept; new rules run after the defaults in the order given.
pub fn merge_rules(default_config: RewriteConfig, user_config: Option<RewriteConfig>) -> RewriteConfig {
    debug!("merge_rules called. Initial default rules count: {}", default_config.rules.len());

    let mut merged = default_config;
    let Some(user_cfg) = user_config else {
        return merged;
    };

    debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
    if let Some(receiver) = user_cfg.receiver {
        debug!("Overriding receiver with user value: {}", receiver);
        merged.receiver = Some(receiver);
    }

    for user_rule in user_cfg.rules {
        match merged.rules.iter_mut().find(|r| r.name == user_rule.name) {
            Some(existing) => {
                debug!("User rule '{}' overrides the default.", user_rule.name);
                *existing = user_rule;
            }
            None => merged.rules.push(user_rule),
        }
    }

    debug!("Final total rules after merge: {}", merged.rules.len());
    merged
}

/// Checks the structural parts of each rule; regex and template errors are
/// reported later by the compiler.
fn validate_rules(rules: &[RewriteRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.as_str()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        // A disabled entry may be a bare `name` + `enabled: false` override.
        if !rule.is_enabled() {
            continue;
        }

        match rule.pattern.as_deref() {
            None => errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name)),
            Some("") => errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name)),
            Some(_) => {}
        }

        match rule.kind {
            RuleKind::Literal => {
                if rule.argument_order.is_some() {
                    warn!("Rule '{}': `argument_order` is ignored for literal rules.", rule.name);
                }
            }
            RuleKind::PriceSplit | RuleKind::Reorder => {
                if rule.argument_order.as_ref().map_or(true, |o| o.is_empty()) {
                    errors.push(format!(
                        "Rule '{}' ({}) requires a non-empty `argument_order`.",
                        rule.name, rule.kind
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("Rule validation failed:\n{}", errors.join("\n")))
    }
}
