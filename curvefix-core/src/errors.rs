//! errors.rs - Custom error types for the curvefix-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use std::path::PathBuf;
use thiserror::Error;

/// This enum represents all possible error types in the `curvefix-core` library.
///
/// At run time only the I/O variants can occur; everything else is raised while
/// loading or compiling rules, before any file is touched.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CurvefixError {
    #[error("Failed to read input file '{}': {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output file '{}': {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to overwrite the input file '{}'; choose a different output path", .0.display())]
    OutputIsInput(PathBuf),

    #[error("Failed to compile rewrite rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Rule '{rule}': argument index {index} is out of range ({available} positional arguments captured)")]
    InvalidArgumentOrder {
        rule: String,
        index: usize,
        available: usize,
    },

    #[error("Rule '{rule}': pattern must define the named capture group '{group}'")]
    MissingCaptureGroup { rule: String, group: String },

    #[error("Rule '{0}': invalid replacement template: {1}")]
    Template(String, String),

    #[error("Failed to parse rule configuration: {0}")]
    ConfigParse(String),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}
