//! Tile Forge application library.
//!
//! Configuration, logging, catalog selection, the restart policy and the
//! output writers behind the `tile-forge` binary.

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod setup;
pub mod visualization;

pub use config::{Cli, Settings};
pub use error::AppError;
