//! Record store for rosterdb
//!
//! The [`StudentStore`] trait is the store handle handed to the HTTP layer
//! at startup. Implementations validate every write before it is persisted,
//! assign ids and creation timestamps, and serialize individual writes
//! behind an internal lock. There is no cross-request coordination:
//! concurrent writers to the same record race and the last write wins.

mod errors;
mod file;
mod memory;
mod roster;

pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::student::{Student, StudentId, StudentInput};

pub trait StudentStore: Send + Sync {
    /// All students, newest first.
    fn list_all(&self) -> StoreResult<Vec<Student>>;

    fn get_by_id(&self, id: &StudentId) -> StoreResult<Student>;

    /// Validates `input`, assigns id and creation time, persists.
    fn insert(&self, input: &StudentInput) -> StoreResult<Student>;

    /// Validates `input` and replaces the mutable fields of an existing student.
    fn update_by_id(&self, id: &StudentId, input: &StudentInput) -> StoreResult<Student>;

    /// Removes a student, returning the removed record.
    fn delete_by_id(&self, id: &StudentId) -> StoreResult<Student>;

    /// Number of live students.
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
