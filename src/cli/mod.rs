//! CLI module for the students API
//!
//! Loads configuration, builds storage and runs the HTTP server.

mod args;
mod commands;
mod errors;

pub use args::Cli;
pub use commands::{run, serve, SHUTDOWN_TIMEOUT};
pub use errors::{CliError, CliErrorCode, CliResult};
