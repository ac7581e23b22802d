//! CLI argument definitions using clap
//!
//! Commands:
//! - rosterdb init --config <path>
//! - rosterdb start --config <path> [--port <port>] [--in-memory]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rosterdb - student records over a small REST API
#[derive(Parser, Debug)]
#[command(name = "rosterdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default config (if absent) and create the data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./rosterdb.json")]
        config: PathBuf,
    },

    /// Start the HTTP server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./rosterdb.json")]
        config: PathBuf,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,

        /// Keep records in memory only; nothing is written to disk
        #[arg(long)]
        in_memory: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from(["rosterdb", "start", "--port", "8080", "--in-memory"]).unwrap();
        match cli.command {
            Command::Start {
                config,
                port,
                in_memory,
            } => {
                assert_eq!(config, PathBuf::from("./rosterdb.json"));
                assert_eq!(port, Some(8080));
                assert!(in_memory);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_init_config_path() {
        let cli = Cli::try_parse_from(["rosterdb", "init", "--config", "/tmp/r.json"]).unwrap();
        assert!(matches!(cli.command, Command::Init { config } if config == PathBuf::from("/tmp/r.json")));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["rosterdb", "query"]).is_err());
    }
}
