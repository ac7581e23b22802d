//! Storage engine for rosterdb
//!
//! A single append-only data file of checksummed student records.
//!
//! # Design Principles
//!
//! - Appends are fsynced before they are acknowledged
//! - Checksum verified on every read; corruption is fatal
//! - Latest record wins for the same student id
//! - Removal rewrites the file atomically, nothing deleted stays on disk

mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StorageReader;
pub use record::StudentRecord;
pub use writer::{data_file_path, StorageWriter};
