// curvefix-core/src/engines/mod.rs
//! Concrete implementations of the `RewriteEngine` trait.

pub mod regex_engine;
