//! Volatile store, used by tests and `start --in-memory`

use std::sync::RwLock;

use chrono::Utc;

use super::errors::{StoreError, StoreResult};
use super::roster::Roster;
use super::StudentStore;
use crate::student::{Student, StudentId, StudentInput};

#[derive(Debug, Default)]
pub struct MemoryStore {
    roster: RwLock<Roster>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StudentStore for MemoryStore {
    fn list_all(&self) -> StoreResult<Vec<Student>> {
        let roster = self.roster.read().map_err(|_| StoreError::Poisoned)?;
        Ok(roster.list())
    }

    fn get_by_id(&self, id: &StudentId) -> StoreResult<Student> {
        let roster = self.roster.read().map_err(|_| StoreError::Poisoned)?;
        roster
            .get(id)
            .map(|e| e.student.clone())
            .ok_or(StoreError::NotFound(*id))
    }

    fn insert(&self, input: &StudentInput) -> StoreResult<Student> {
        let fields = input.validate()?;
        let mut roster = self.roster.write().map_err(|_| StoreError::Poisoned)?;

        let entry = roster.prepare_insert(fields, Utc::now());
        let student = entry.student.clone();
        roster.commit(entry);

        tracing::debug!(student_id = %student.id, "student inserted");
        Ok(student)
    }

    fn update_by_id(&self, id: &StudentId, input: &StudentInput) -> StoreResult<Student> {
        let fields = input.validate()?;
        let mut roster = self.roster.write().map_err(|_| StoreError::Poisoned)?;

        let entry = roster
            .prepare_update(id, fields)
            .ok_or(StoreError::NotFound(*id))?;
        let student = entry.student.clone();
        roster.commit(entry);

        tracing::debug!(student_id = %id, "student updated");
        Ok(student)
    }

    fn delete_by_id(&self, id: &StudentId) -> StoreResult<Student> {
        let mut roster = self.roster.write().map_err(|_| StoreError::Poisoned)?;
        let entry = roster.remove(id).ok_or(StoreError::NotFound(*id))?;

        tracing::debug!(student_id = %id, "student deleted");
        Ok(entry.student)
    }

    fn len(&self) -> StoreResult<usize> {
        let roster = self.roster.read().map_err(|_| StoreError::Poisoned)?;
        Ok(roster.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get() {
        let store = MemoryStore::new();
        let created = store
            .insert(&StudentInput::new("Ada", 36, "Maths", "ADA@example.com"))
            .unwrap();

        assert_eq!(created.email, "ada@example.com");
        assert_eq!(store.get_by_id(&created.id).unwrap(), created);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_invalid_insert_stores_nothing() {
        let store = MemoryStore::new();
        let err = store
            .insert(&StudentInput::new("Ada", 0, "Maths", "ada@example.com"))
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_delete_twice() {
        let store = MemoryStore::new();
        let created = store
            .insert(&StudentInput::new("Ada", 36, "Maths", "ada@example.com"))
            .unwrap();

        assert_eq!(store.delete_by_id(&created.id).unwrap(), created);
        assert!(matches!(
            store.delete_by_id(&created.id),
            Err(StoreError::NotFound(_))
        ));
    }
}
