//! Append-only writer for the student data file
//!
//! - Every append is fsynced before it returns
//! - Updates append a new version; the latest version of an id wins
//! - Deletes and compaction rewrite the file through a temporary copy that
//!   is fsynced and renamed over the original, so the data file is always
//!   either the old or the new complete set

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::StudentRecord;

const DATA_SUBDIR: &str = "data";
const DATA_FILE: &str = "students.dat";
const COMPACT_SUFFIX: &str = "compact";

/// Location of the data file inside a data directory.
pub fn data_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATA_SUBDIR).join(DATA_FILE)
}

pub struct StorageWriter {
    storage_path: PathBuf,
    file: File,
    current_offset: u64,
    record_count: usize,
}

impl StorageWriter {
    /// Opens or creates `<data_dir>/data/students.dat`.
    ///
    /// A leftover compaction file from an interrupted rewrite is discarded;
    /// the data file itself was never touched by it.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let data_subdir = data_dir.join(DATA_SUBDIR);
        let storage_path = data_file_path(data_dir);

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let compact_path = storage_path.with_extension(format!("dat.{}", COMPACT_SUFFIX));
        if compact_path.exists() {
            fs::remove_file(&compact_path).map_err(|e| {
                StorageError::io_error(
                    format!(
                        "Failed to remove stale compaction file: {}",
                        compact_path.display()
                    ),
                    e,
                )
            })?;
        }

        let file = Self::open_append(&storage_path)?;
        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            storage_path,
            file,
            current_offset,
            record_count: 0,
        })
    }

    fn open_append(path: &Path) -> StorageResult<File> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open storage file: {}", path.display()),
                    e,
                )
            })
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Number of records appended or rewritten through this writer.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Appends one record and fsyncs.
    ///
    /// Returns the byte offset the record was written at. If the write or the
    /// fsync fails, the file is truncated back to the last acknowledged
    /// record before the error is returned.
    pub fn append(&mut self, record: &StudentRecord) -> StorageResult<u64> {
        self.discard_unacknowledged_tail()?;

        let serialized = record.serialize();
        let offset = self.current_offset;

        let written = self
            .file
            .write_all(&serialized)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to write student: {}", record.student_id),
                    e,
                )
            })
            .and_then(|_| {
                self.file.sync_all().map_err(|e| {
                    StorageError::write_failed(
                        format!("fsync failed after writing student: {}", record.student_id),
                        e,
                    )
                })
            });

        if let Err(err) = written {
            self.truncate_to_acknowledged();
            return Err(err);
        }

        self.current_offset += serialized.len() as u64;
        self.record_count += 1;

        Ok(offset)
    }

    /// Drops bytes past the last acknowledged record, left by an append
    /// whose rollback also failed.
    fn discard_unacknowledged_tail(&mut self) -> StorageResult<()> {
        let len = self
            .file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        if len < self.current_offset {
            return Err(StorageError::corruption_at_offset(
                len,
                format!(
                    "Data file shrank below acknowledged size {}",
                    self.current_offset
                ),
            ));
        }

        if len > self.current_offset {
            tracing::warn!(
                path = %self.storage_path.display(),
                acknowledged = self.current_offset,
                len,
                "discarding partial record at end of data file"
            );
            self.file
                .set_len(self.current_offset)
                .and_then(|_| self.file.sync_all())
                .map_err(|e| StorageError::write_failed("Failed to discard partial record", e))?;
        }

        Ok(())
    }

    fn truncate_to_acknowledged(&mut self) {
        let rolled_back = self
            .file
            .set_len(self.current_offset)
            .and_then(|_| self.file.sync_all());

        if let Err(e) = rolled_back {
            // Retried by the next append.
            tracing::error!(
                path = %self.storage_path.display(),
                error = %e,
                "failed to roll back partial record"
            );
        }
    }

    /// Replaces the whole data file with `records`.
    ///
    /// Records are written to a sibling compaction file, fsynced, and
    /// renamed over the data file. The compaction file's own handle becomes
    /// the append handle, so nothing is reopened after the rename. On
    /// failure before the rename the original file and handle are intact.
    pub fn rewrite(&mut self, records: &[StudentRecord]) -> StorageResult<()> {
        let compact_path = self
            .storage_path
            .with_extension(format!("dat.{}", COMPACT_SUFFIX));

        let mut buffer = Vec::new();
        for record in records {
            buffer.extend_from_slice(&record.serialize());
        }

        let mut compact = Self::open_append(&compact_path)?;
        let prepared = compact
            .set_len(0)
            .and_then(|_| compact.write_all(&buffer))
            .and_then(|_| compact.sync_all());

        if let Err(e) = prepared {
            let _ = fs::remove_file(&compact_path);
            return Err(StorageError::write_failed(
                format!("Failed to write compaction file: {}", compact_path.display()),
                e,
            ));
        }

        if let Err(e) = fs::rename(&compact_path, &self.storage_path) {
            let _ = fs::remove_file(&compact_path);
            return Err(StorageError::io_error(
                format!(
                    "Failed to replace storage file: {}",
                    self.storage_path.display()
                ),
                e,
            ));
        }

        if let Some(parent) = self.storage_path.parent() {
            // Persist the rename itself. Directories cannot be opened on every platform.
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        self.file = compact;
        self.current_offset = buffer.len() as u64;
        self.record_count = records.len();

        Ok(())
    }
}
