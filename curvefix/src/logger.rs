// curvefix/src/logger.rs
//! Logger setup for the curvefix binary and its tests.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes `env_logger`, writing to stderr so stdout stays reserved for
/// the progress log.
///
/// With `Some(level)` the level applies to everything and `RUST_LOG` is
/// ignored; with `None`, `RUST_LOG` decides and the default is `warn`.
/// Calling it more than once is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .try_init()
        .ok();
}
