//! CLI command implementations
//!
//! `init` prepares a data directory. `start` opens the store, serves HTTP
//! until a shutdown signal, then drops the store.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::http_server::HttpServer;
use crate::observability::{init_logging, Event};
use crate::storage::data_file_path;
use crate::store::{FileStore, MemoryStore, StudentStore};

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start {
            config,
            port,
            in_memory,
        } => start(&config, port, in_memory),
    }
}

/// Writes a default config if none exists and creates the data directory.
///
/// Refuses to run over an existing data file. Environment overrides are
/// not applied, so the saved file never captures them.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config_existed = config_path.exists();
    let config = Config::load_file(config_path)?;
    config.validate()?;

    let data_file = data_file_path(config.data_path());
    if data_file.exists() {
        return Err(CliError::already_initialized(data_file.display()));
    }

    if let Some(dir) = data_file.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }

    if !config_existed {
        config.save(config_path)?;
    }

    write_response(json!({
        "initialized": true,
        "config": config_path.display().to_string(),
        "config_written": !config_existed,
        "data_dir": config.data_dir,
    }))
}

/// Boots the store and serves until Ctrl-C or SIGTERM.
pub fn start(config_path: &Path, port: Option<u16>, in_memory: bool) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    init_logging(&config.log_level, config.log_format);
    tracing::info!(event = %Event::BootStart, version = env!("CARGO_PKG_VERSION"), "starting rosterdb");
    tracing::info!(
        event = %Event::ConfigLoaded,
        config = %config_path.display(),
        data_dir = %config.data_dir,
        port = config.http.port,
        "configuration loaded"
    );

    let store = open_store(&config, in_memory)?;
    let students = store.len()?;
    tracing::info!(event = %Event::StoreOpened, in_memory, students, "student store ready");

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let server = HttpServer::new(config.http.clone(), Arc::clone(&store));
    tracing::info!(event = %Event::ServerListening, addr = %server.socket_addr(), "serving student API");

    let served = runtime.block_on(server.start());

    tracing::info!(event = %Event::ShutdownStart, "closing student store");
    drop(store);
    tracing::info!(event = %Event::ShutdownComplete, "rosterdb stopped");

    served.map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
}

/// Opens the durable store under the configured data directory, or a
/// volatile one when `in_memory` is set.
pub fn open_store(config: &Config, in_memory: bool) -> CliResult<Arc<dyn StudentStore>> {
    if in_memory {
        tracing::warn!("running with an in-memory store; records are lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = FileStore::open(config.data_path())?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::config::ENV_DATA_DIR;
    use crate::student::StudentInput;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().join("data-root").display().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_store_file_backed() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let store = open_store(&config, false).unwrap();
        store
            .insert(&StudentInput::new("Ada", 36, "Maths", "ada@example.com"))
            .unwrap();
        drop(store);

        assert!(data_file_path(config.data_path()).exists());
        let reopened = open_store(&config, false).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
    }

    #[test]
    fn test_open_store_in_memory_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let store = open_store(&config, true).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(!config.data_path().exists());
    }

    #[test]
    fn test_open_store_reports_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let data_file = data_file_path(config.data_path());
        fs::create_dir_all(data_file.parent().unwrap()).unwrap();
        fs::write(&data_file, [0xFFu8; 40]).unwrap();

        let err = open_store(&config, false).err().unwrap();
        assert_eq!(err.code_str(), "ROSTER_CLI_BOOT_FAILED");
    }

    #[test]
    fn test_init_refuses_existing_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rosterdb.json");
        let config = config_in(&temp_dir);
        config.save(&config_path).unwrap();

        let data_file = data_file_path(config.data_path());
        fs::create_dir_all(data_file.parent().unwrap()).unwrap();
        fs::write(&data_file, b"").unwrap();

        let err = init(&config_path).unwrap_err();
        assert_eq!(err.code_str(), "ROSTER_CLI_ALREADY_INITIALIZED");
    }

    #[test]
    fn test_init_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rosterdb.json");
        let config = config_in(&temp_dir);
        config.save(&config_path).unwrap();

        init(&config_path).unwrap();

        let data_file = data_file_path(config.data_path());
        assert!(data_file.parent().unwrap().is_dir());
    }

    #[test]
    fn test_init_ignores_environment_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("rosterdb.json");
        let config = Config {
            data_dir: temp_dir.path().join("from-file").display().to_string(),
            ..Default::default()
        };
        config.save(&config_path).unwrap();

        let env_dir = temp_dir.path().join("from-env");
        std::env::set_var(ENV_DATA_DIR, &env_dir);
        let result = init(&config_path);
        std::env::remove_var(ENV_DATA_DIR);
        result.unwrap();

        assert!(data_file_path(config.data_path()).parent().unwrap().is_dir());
        assert!(!env_dir.exists());
        assert_eq!(Config::load_file(&config_path).unwrap(), config);
    }
}
