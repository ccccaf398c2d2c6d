//! Rule compilation for the rewrite engines.
//!
//! Rules are declared in YAML (see `config`), then compiled here into regexes
//! and checked templates before any text is rewritten. The regex engine in
//! `engines::regex_engine` consumes the compiled form.

pub mod compiler;
