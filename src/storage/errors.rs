//! Storage error types
//!
//! Error codes:
//! - ROSTER_STORAGE_IO_ERROR (ERROR severity)
//! - ROSTER_STORAGE_WRITE_FAILED (ERROR severity)
//! - ROSTER_STORAGE_READ_FAILED (ERROR severity)
//! - ROSTER_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, server continues
    Error,
    /// The data file cannot be trusted; the store must not open
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure outside a read or write (e.g. rename)
    IoError,
    /// Record append or fsync failed
    WriteFailed,
    /// Record read failed
    ReadFailed,
    /// Checksum, length or encoding failure
    DataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::IoError => "ROSTER_STORAGE_IO_ERROR",
            StorageErrorCode::WriteFailed => "ROSTER_STORAGE_WRITE_FAILED",
            StorageErrorCode::ReadFailed => "ROSTER_STORAGE_READ_FAILED",
            StorageErrorCode::DataCorruption => "ROSTER_DATA_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with code, message and optional context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::IoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::WriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::ReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Corruption found at a byte offset of the data file
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Corruption found while decoding a specific record
    pub fn corruption_for_record(student_id: &str, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::DataCorruption,
            message: reason.into(),
            details: Some(format!("student_id: {}", student_id)),
            source: None,
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the data file must be considered untrustworthy
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
