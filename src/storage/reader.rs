//! Sequential reader for the student data file
//!
//! Every record is checksum-verified as it is read. Any corruption,
//! truncation or impossible length aborts the scan.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StorageError, StorageResult};
use super::record::{StudentRecord, MIN_RECORD_SIZE};

pub struct StorageReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl StorageReader {
    /// Opens a data file for reading.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        let file = File::open(storage_path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open storage file: {}", storage_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of file and `ROSTER_DATA_CORRUPTION` on any
    /// malformed record.
    pub fn read_next(&mut self) -> StorageResult<Option<StudentRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        let min_size = MIN_RECORD_SIZE as u64;

        if remaining < min_size {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated storage: {} bytes remaining, minimum record size is {}",
                    remaining, min_size
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < min_size {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);

        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = StudentRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;

        Ok(Some(record))
    }

    /// Reads every record in file order.
    pub fn read_all(&mut self) -> StorageResult<Vec<StudentRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Scans the whole file and keeps only the latest version of each student.
    ///
    /// Also returns the total number of records scanned, so callers can tell
    /// whether superseded versions are present.
    pub fn latest_versions(&mut self) -> StorageResult<(HashMap<String, StudentRecord>, usize)> {
        let mut latest = HashMap::new();
        let mut scanned = 0;

        while let Some(record) = self.read_next()? {
            scanned += 1;
            latest.insert(record.student_id.clone(), record);
        }

        Ok((latest, scanned))
    }
}
