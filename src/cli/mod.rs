//! CLI module for rosterdb
//!
//! - init: write a default config and create the data directory
//! - start: open the student store and serve the HTTP API

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, open_store, run, run_command, start};
pub use config::{Config, ENV_DATA_DIR, ENV_LOG_FORMAT, ENV_PORT};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
