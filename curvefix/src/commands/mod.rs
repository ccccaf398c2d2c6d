//! Command implementations for the curvefix binary.

pub mod rewrite;
