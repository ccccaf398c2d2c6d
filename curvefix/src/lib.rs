// curvefix/src/lib.rs
//! # curvefix CLI Application
//!
//! The terminal front end for `curvefix-core`: argument parsing, logging
//! setup, and the console output of a rewrite run.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
