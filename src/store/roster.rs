//! In-memory index shared by every store implementation
//!
//! Holds the live set of students keyed by id, plus the insertion
//! sequence used to break creation-time ties. Writes are split into a
//! `prepare_*` step that builds the new entry without touching the index
//! and a `commit` step, so durable stores can persist in between and leave
//! the index untouched when persistence fails.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::student::{Student, StudentFields, StudentId};

/// A live student and its insertion sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub sequence: u64,
    pub student: Student,
}

#[derive(Debug, Default)]
pub(crate) struct Roster {
    entries: HashMap<StudentId, Entry>,
    next_sequence: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from persisted entries.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut roster = Self::new();
        for entry in entries {
            roster.commit(entry);
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: &StudentId) -> Option<&Entry> {
        self.entries.get(id)
    }

    /// All students, newest first. Equal timestamps fall back to insertion order.
    pub fn list(&self) -> Vec<Student> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            b.student
                .created_at
                .cmp(&a.student.created_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        entries.into_iter().map(|e| e.student.clone()).collect()
    }

    /// Live entries in insertion order, optionally leaving one out.
    pub fn entries_by_sequence(&self, excluding: Option<&StudentId>) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self
            .entries
            .values()
            .filter(|e| Some(&e.student.id) != excluding)
            .collect();
        entries.sort_by_key(|e| e.sequence);
        entries
    }

    /// Builds the entry for a new student. Not visible until committed.
    pub fn prepare_insert(&self, fields: StudentFields, now: DateTime<Utc>) -> Entry {
        Entry {
            sequence: self.next_sequence,
            student: Student::create(fields, now),
        }
    }

    /// Builds the updated entry for an existing student, keeping its
    /// id, creation time and sequence.
    pub fn prepare_update(&self, id: &StudentId, fields: StudentFields) -> Option<Entry> {
        self.entries.get(id).map(|existing| {
            let mut updated = existing.clone();
            updated.student.apply(fields);
            updated
        })
    }

    /// Inserts or replaces an entry.
    pub fn commit(&mut self, entry: Entry) {
        if entry.sequence >= self.next_sequence {
            self.next_sequence = entry.sequence + 1;
        }
        self.entries.insert(entry.student.id, entry);
    }

    pub fn remove(&mut self, id: &StudentId) -> Option<Entry> {
        self.entries.remove(id)
    }
}
