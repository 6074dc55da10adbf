//! pointcast library
//!
//! Exposes the forecast pipeline and the terminal UI modules for use by the
//! binary and in integration tests.

pub mod app;
pub mod cli;
pub mod data;
pub mod forecast;
pub mod logging;
pub mod report;
pub mod state;
pub mod ui;
