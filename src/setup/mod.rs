//! Wiring of settings, catalog, driver and outputs.

pub mod execution;
