//! CLI error types
//!
//! Every CLI error ends the process with a non-zero exit status.

use std::fmt;
use std::io;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Unreadable or invalid configuration
    ConfigError,
    /// Filesystem or stdout failure
    IoError,
    /// Data file already present during `init`
    AlreadyInitialized,
    /// Store or runtime could not be brought up
    BootFailed,
    /// Server stopped with an error
    ServeFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "ROSTER_CLI_CONFIG_ERROR",
            Self::IoError => "ROSTER_CLI_IO_ERROR",
            Self::AlreadyInitialized => "ROSTER_CLI_ALREADY_INITIALIZED",
            Self::BootFailed => "ROSTER_CLI_BOOT_FAILED",
            Self::ServeFailed => "ROSTER_CLI_SERVE_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized(data_file: impl fmt::Display) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Data file {} already exists", data_file),
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn serve_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ServeFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::boot_failed(format!("Failed to open student store: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;
