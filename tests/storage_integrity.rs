//! Storage Integrity Tests
//!
//! - Corruption anywhere in the data file fails the open
//! - Deleted students are physically absent from the data file
//! - Superseded versions are compacted away on reopen
//! - A partially written record does not block later writes

use rosterdb::storage::{data_file_path, StorageReader};
use rosterdb::store::{FileStore, StoreError, StudentStore};
use rosterdb::student::StudentInput;
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn student(name: &str) -> StudentInput {
    StudentInput::new(name, 30, "Physics", &format!("{}@example.com", name.to_lowercase()))
}

fn assert_corruption(err: StoreError) {
    match err {
        StoreError::Storage(e) => {
            assert!(e.is_fatal());
            assert_eq!(e.code().code(), "ROSTER_DATA_CORRUPTION");
        }
        other => panic!("expected corruption, got {other:?}"),
    }
}

// =============================================================================
// Corruption
// =============================================================================

#[test]
fn test_flipped_byte_fails_open() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(&student("Ada")).unwrap();
    }

    let path = data_file_path(temp_dir.path());
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    assert_corruption(FileStore::open(temp_dir.path()).err().unwrap());
}

#[test]
fn test_truncated_tail_fails_open() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(&student("Ada")).unwrap();
        store.insert(&student("Grace")).unwrap();
    }

    let path = data_file_path(temp_dir.path());
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 3]).unwrap();

    assert_corruption(FileStore::open(temp_dir.path()).err().unwrap());
}

#[test]
fn test_corruption_is_not_repaired_by_failed_open() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        store.insert(&student("Ada")).unwrap();
    }

    let path = data_file_path(temp_dir.path());
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0x01;
    fs::write(&path, &contents).unwrap();

    assert!(FileStore::open(temp_dir.path()).is_err());
    assert_eq!(fs::read(&path).unwrap(), contents);
}

// =============================================================================
// Hard delete
// =============================================================================

#[test]
fn test_deleted_student_absent_from_data_file() {
    let temp_dir = TempDir::new().unwrap();
    let (deleted, kept) = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let a = store.insert(&student("Ada")).unwrap();
        let b = store.insert(&student("Grace")).unwrap();
        store.delete_by_id(&a.id).unwrap();
        (a, b)
    };

    let path = data_file_path(temp_dir.path());
    let bytes = fs::read(&path).unwrap();
    let needle = deleted.id.to_string();
    assert!(
        !bytes.windows(needle.len()).any(|w| w == needle.as_bytes()),
        "deleted id still present on disk"
    );

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.list_all().unwrap(), vec![kept]);
}

#[test]
fn test_delete_all_leaves_empty_file() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let a = store.insert(&student("Ada")).unwrap();
        store.delete_by_id(&a.id).unwrap();
    }

    let path = data_file_path(temp_dir.path());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert!(FileStore::open(temp_dir.path()).unwrap().is_empty().unwrap());
}

// =============================================================================
// Compaction
// =============================================================================

#[test]
fn test_reopen_keeps_only_latest_versions() {
    let temp_dir = TempDir::new().unwrap();
    let id = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let a = store.insert(&student("Ada")).unwrap();
        store.insert(&student("Grace")).unwrap();
        store
            .update_by_id(&a.id, &StudentInput::new("Ada King", 31, "Physics", "ada@example.com"))
            .unwrap();
        a.id
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.get_by_id(&id).unwrap().name, "Ada King");

    let records = StorageReader::open(store.path()).unwrap().read_all().unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_order_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let expected = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        for name in ["Ada", "Grace", "Edsger"] {
            store.insert(&student(name)).unwrap();
        }
        store.list_all().unwrap()
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.list_all().unwrap(), expected);
}

// =============================================================================
// Partial writes
// =============================================================================

#[test]
fn test_partial_record_does_not_poison_later_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = data_file_path(temp_dir.path());

    let (first, second) = {
        let store = FileStore::open(temp_dir.path()).unwrap();
        let first = store.insert(&student("Ada")).unwrap();

        // Bytes of a write that never completed
        {
            use std::io::Write;
            let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[0x40, 0, 0, 0, 7, 0]).unwrap();
        }

        let second = store.insert(&student("Grace")).unwrap();
        (first, second)
    };

    let store = FileStore::open(temp_dir.path()).unwrap();
    assert_eq!(store.list_all().unwrap(), vec![second, first]);
}
