// curvefix-core/src/lib.rs
//! # curvefix Core Library
//!
//! `curvefix-core` holds the rewrite logic behind the `curvefix` CLI: a fixed
//! sequence of pattern substitutions that migrates LMSR bonding-curve test
//! call sites to the `IBondingCurve` interface.
//!
//! The default rule set, applied in this order:
//!
//! 1. `lmsr.name()` → `lmsr.curveName()`
//! 2. `const v = await lmsr.getPrice(a, b, <bool>, d)` → a destructuring
//!    `lmsr.getPrices(d, a, b)` followed by `const v = yesPrice` / `noPrice`
//! 3. `lmsr.calculateCost(p1, p2, p3, p4, p5)` → `lmsr.calculateCost(p5, p1, p2, p4, p3)`
//! 4. the same permutation for `lmsr.calculateRefund`
//!
//! Each rule runs once over the whole text and sees the output of the rules
//! before it. Zero matches is not an error.
//!
//! ## Modules
//!
//! * `config`: `RewriteRule`s and `RewriteConfig`, YAML loading and merging.
//! * `rules`: compilation of rules into regexes and checked templates.
//! * `engine`: the `RewriteEngine` trait and `EngineOptions`.
//! * `engines`: the regex-based implementation.
//! * `arguments`: bracket-aware argument scanning.
//! * `rewrite_match`: per-match records and summaries.
//! * `headless`: one-shot string and file entry points.
//!
//! ## Usage Example
//!
//! ```rust
//! use curvefix_core::{headless_rewrite_string, EngineOptions, RewriteConfig};
//!
//! let config = RewriteConfig::load_default_rules().unwrap();
//! let out = headless_rewrite_string(
//!     config,
//!     EngineOptions::default(),
//!     "lmsr.calculateCost(0, 0, ONE_ETHER, true, LIQUIDITY_PARAM)",
//!     "example",
//! )
//! .unwrap();
//! assert_eq!(out, "lmsr.calculateCost(LIQUIDITY_PARAM, 0, 0, true, ONE_ETHER)");
//! ```
//!
//! ## Error Handling
//!
//! Loading YAML uses `anyhow` for context-rich messages. Compilation and
//! rewriting return [`CurvefixError`]; once rules have compiled, only I/O can
//! fail.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod arguments;
pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod rewrite_match;
pub mod rules;

/// Re-exports the configuration types and functions for managing rewrite rules.
pub use config::{merge_rules, RewriteConfig, RewriteRule, RewriteSummaryItem, RuleKind, DEFAULT_RECEIVER, MAX_PATTERN_LENGTH};

/// Re-exports the custom error type for clear error reporting.
pub use errors::CurvefixError;

/// Re-exports types related to the core rewrite engine trait.
pub use engine::{ArgumentMode, EngineOptions, RewriteEngine};

pub use engines::regex_engine::RegexRewriteEngine;

pub use rewrite_match::RewriteMatch;

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{
    default_output_path, headless_rewrite_string, rewrite_file, rewrite_file_with_progress, RewriteProgress,
    RewriteReport, DEFAULT_INPUT_PATH, OUTPUT_SUFFIX,
};

pub use rules::compiler::{compile_rules, price_bindings, CompiledRule, CompiledRules};
