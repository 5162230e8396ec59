use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::LoadError;

/// Errors surfaced by the `tile-forge` application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable settings.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// File system failure.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// The rule file could not be turned into a catalog.
    #[error("Rule Loading Error: {0}")]
    Rules(#[from] LoadError),

    /// The engine failed outside of a recoverable contradiction.
    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),

    /// Every attempt ended in a contradiction.
    #[error("No solution after {attempts} attempts (last error: {last})")]
    AttemptsExhausted {
        /// Number of runs tried.
        attempts: u32,
        /// Error of the final run.
        last: WfcError,
    },

    /// Rendering the grid failed.
    #[error("Visualization Error: {0}")]
    Visualization(String),

    /// Writing results failed.
    #[error("Save Error: {0}")]
    Save(anyhow::Error),

    /// Other failures.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
