//! Durable store backed by the storage engine
//!
//! Inserts and updates append a new record version and fsync before the
//! in-memory index changes. Deletes rewrite the data file without the
//! student, so removed records do not survive on disk. Opening the store
//! replays the data file, keeps the latest version of every student and
//! compacts superseded versions away.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

use super::errors::{StoreError, StoreResult};
use super::roster::{Entry, Roster};
use super::StudentStore;
use crate::storage::{StorageError, StorageReader, StorageWriter, StudentRecord};
use crate::student::{Student, StudentId, StudentInput};

struct FileState {
    roster: Roster,
    writer: StorageWriter,
}

pub struct FileStore {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileStore {
    /// Opens (or creates) the store under `data_dir`.
    ///
    /// # Errors
    ///
    /// Fails with `ROSTER_DATA_CORRUPTION` if any record in the data file is
    /// damaged or does not decode to a valid student.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let mut writer = StorageWriter::open(data_dir)?;
        let path = writer.path().to_path_buf();

        let (latest, scanned) = StorageReader::open(&path)?.latest_versions()?;
        let entries = latest
            .into_values()
            .map(decode_entry)
            .collect::<StoreResult<Vec<_>>>()?;
        let roster = Roster::from_entries(entries);

        if scanned > roster.len() {
            let records = encode_all(&roster, None)?;
            writer.rewrite(&records)?;
            tracing::info!(
                path = %path.display(),
                superseded = scanned - roster.len(),
                "compacted student data file"
            );
        }

        tracing::info!(
            path = %path.display(),
            students = roster.len(),
            "student store opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState { roster, writer }),
        })
    }

    /// Path of the underlying data file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn decode_entry(record: StudentRecord) -> StoreResult<Entry> {
    let student: Student = serde_json::from_slice(&record.body).map_err(|e| {
        StorageError::corruption_for_record(
            &record.student_id,
            format!("Undecodable student document: {}", e),
        )
    })?;

    if student.id.to_string() != record.student_id {
        return Err(StorageError::corruption_for_record(
            &record.student_id,
            format!("Document id {} does not match record key", student.id),
        )
        .into());
    }

    Ok(Entry {
        sequence: record.sequence,
        student,
    })
}

fn encode_entry(entry: &Entry) -> StoreResult<StudentRecord> {
    let body = serde_json::to_vec(&entry.student)?;
    Ok(StudentRecord::new(
        entry.student.id.to_string(),
        entry.sequence,
        body,
    ))
}

fn encode_all(roster: &Roster, excluding: Option<&StudentId>) -> StoreResult<Vec<StudentRecord>> {
    roster
        .entries_by_sequence(excluding)
        .into_iter()
        .map(encode_entry)
        .collect()
}

impl StudentStore for FileStore {
    fn list_all(&self) -> StoreResult<Vec<Student>> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.roster.list())
    }

    fn get_by_id(&self, id: &StudentId) -> StoreResult<Student> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        state
            .roster
            .get(id)
            .map(|e| e.student.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    fn insert(&self, input: &StudentInput) -> StoreResult<Student> {
        let fields = input.validate()?;
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;

        let entry = state.roster.prepare_insert(fields, Utc::now());
        let offset = state.writer.append(&encode_entry(&entry)?)?;
        let student = entry.student.clone();
        state.roster.commit(entry);

        tracing::debug!(student_id = %student.id, offset, "student inserted");
        Ok(student)
    }

    fn update_by_id(&self, id: &StudentId, input: &StudentInput) -> StoreResult<Student> {
        let fields = input.validate()?;
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;

        let entry = state
            .roster
            .prepare_update(id, fields)
            .ok_or(StoreError::NotFound(*id))?;
        let offset = state.writer.append(&encode_entry(&entry)?)?;
        let student = entry.student.clone();
        state.roster.commit(entry);

        tracing::debug!(student_id = %id, offset, "student updated");
        Ok(student)
    }

    fn delete_by_id(&self, id: &StudentId) -> StoreResult<Student> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;

        if state.roster.get(id).is_none() {
            return Err(StoreError::NotFound(*id));
        }

        let remaining = encode_all(&state.roster, Some(id))?;
        state.writer.rewrite(&remaining)?;
        let entry = state.roster.remove(id).ok_or(StoreError::NotFound(*id))?;

        tracing::debug!(
            student_id = %id,
            remaining = state.writer.record_count(),
            file_bytes = state.writer.current_offset(),
            "student deleted"
        );
        Ok(entry.student)
    }

    fn len(&self) -> StoreResult<usize> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.roster.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ada() -> StudentInput {
        StudentInput::new("Ada", 36, "Maths", "ada@example.com")
    }

    #[test]
    fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let created = {
            let store = FileStore::open(temp_dir.path()).unwrap();
            store.insert(&ada()).unwrap()
        };

        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get_by_id(&created.id).unwrap(), created);
    }

    #[test]
    fn test_update_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let id = {
            let store = FileStore::open(temp_dir.path()).unwrap();
            let created = store.insert(&ada()).unwrap();
            store
                .update_by_id(
                    &created.id,
                    &StudentInput::new("Ada King", 37, "Maths", "ada@example.com"),
                )
                .unwrap();
            created.id
        };

        let store = FileStore::open(temp_dir.path()).unwrap();
        let reloaded = store.get_by_id(&id).unwrap();
        assert_eq!(reloaded.name, "Ada King");
        assert_eq!(reloaded.age, 37);
    }

    #[test]
    fn test_reopen_compacts_superseded_versions() {
        let temp_dir = TempDir::new().unwrap();

        let path = {
            let store = FileStore::open(temp_dir.path()).unwrap();
            let created = store.insert(&ada()).unwrap();
            for age in 37..40 {
                store
                    .update_by_id(
                        &created.id,
                        &StudentInput::new("Ada", age, "Maths", "ada@example.com"),
                    )
                    .unwrap();
            }
            store.path().to_path_buf()
        };

        let _store = FileStore::open(temp_dir.path()).unwrap();
        let records = StorageReader::open(&path).unwrap().read_all().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_failed_validation_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();

        let err = store.insert(&StudentInput::default()).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let size = std::fs::metadata(store.path()).unwrap().len();
        assert_eq!(size, 0);
    }
}
