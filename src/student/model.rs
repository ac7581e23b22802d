//! Student record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::ValidationErrors;
use super::id::StudentId;
use super::validator;

/// Raw write request as it arrives on the wire.
///
/// Every field is optional and untyped so that a missing or mistyped value
/// becomes a validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub course: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

impl StudentInput {
    /// Convenience constructor for well-typed input.
    pub fn new(name: &str, age: i64, course: &str, email: &str) -> Self {
        Self {
            name: Some(Value::from(name)),
            age: Some(Value::from(age)),
            course: Some(Value::from(course)),
            email: Some(Value::from(email)),
        }
    }

    pub fn validate(&self) -> Result<StudentFields, ValidationErrors> {
        validator::validate(self)
    }
}

/// The mutable fields of a student, already normalized and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
    pub name: String,
    pub age: u32,
    pub course: String,
    pub email: String,
}

/// A persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: u32,
    pub course: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Creates a new record with a fresh id.
    pub fn create(fields: StudentFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: StudentId::generate(),
            name: fields.name,
            age: fields.age,
            course: fields.course,
            email: fields.email,
            created_at,
        }
    }

    /// Replaces the mutable fields. `id` and `created_at` are untouched.
    pub fn apply(&mut self, fields: StudentFields) {
        self.name = fields.name;
        self.age = fields.age;
        self.course = fields.course;
        self.email = fields.email;
    }
}
