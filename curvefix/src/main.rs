// curvefix/src/main.rs
//! curvefix entry point.
//!
//! Rewrites one LMSR test file into `<file>.fixed` and exits non-zero on any
//! failure.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use log::LevelFilter;
use std::io::{self, Write};
use std::process::ExitCode;

use curvefix::cli::Cli;
use curvefix::commands::rewrite::{build_engine, run_rewrite, RewriteOptions};
use curvefix::logger;
use curvefix::ui::output_format;
use curvefix_core::default_output_path;

fn run(cli: Cli) -> Result<()> {
    let engine = build_engine(cli.config.as_deref(), cli.receiver.as_deref(), cli.balanced_args)?;

    let output = cli.output.clone().unwrap_or_else(|| default_output_path(&cli.input));
    let opts = RewriteOptions {
        input: cli.input,
        output,
        diff: cli.diff,
        summary: cli.summary,
        quiet: cli.quiet,
    };

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    run_rewrite(&engine, &opts, &mut out, color)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut out = io::stdout();
            let color = out.is_terminal();
            let _ = writeln!(out);
            let _ = output_format::print_error_message(&mut out, &format!("❌ ERROR: {:#}", e), color);
            ExitCode::FAILURE
        }
    }
}
