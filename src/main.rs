//! students-api entry point
//!
//! All logic lives in the CLI module; this only reports a fatal error and
//! sets the exit status.

use students_api::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
