//! CLI argument definitions using clap
//!
//! students-api --config <path>
//!
//! The path may also come from `CONFIG_PATH`.

use clap::Parser;
use std::path::PathBuf;

/// Students API - CRUD over student records backed by SQLite or MySQL
#[derive(Parser, Debug)]
#[command(name = "students-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
