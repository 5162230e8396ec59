//! Logging setup for the application.

use crate::config::{GlobalLogLevel, ProgressLogLevel, Settings};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Module whose records carry the periodic progress reports.
pub const PROGRESS_MODULE: &str = "tile_forge::progress";

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

impl From<ProgressLogLevel> for LevelFilter {
    fn from(level: ProgressLogLevel) -> Self {
        match level {
            ProgressLogLevel::Trace => Self::Trace,
            ProgressLogLevel::Debug => Self::Debug,
            ProgressLogLevel::Info => Self::Info,
            ProgressLogLevel::Warn => Self::Warn,
        }
    }
}

/// Builds a logger from the settings, with `RUST_LOG` directives applied last
/// so they override both configured levels.
pub fn logger_builder(settings: &Settings) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(settings.global_log_level.into())
        .filter_module(PROGRESS_MODULE, settings.progress_log_level.into())
        .parse_env(Env::default());
    builder
}

/// Initializes the global logger.
///
/// * The progress reports use `settings.progress_log_level`.
/// * Everything else uses `settings.global_log_level`.
/// * `RUST_LOG`, if set, refines or overrides both.
pub fn init_logger(settings: &Settings) {
    logger_builder(settings).init();

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        settings.global_log_level,
        settings.progress_log_level
    );
}
