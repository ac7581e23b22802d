//! Validation error types
//!
//! A validation failure carries one entry per violated field, in field
//! declaration order, so callers can surface every problem at once.

use std::fmt;

/// Mutable student fields, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Age,
    Course,
    Email,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Age, Field::Course, Field::Email];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Course => "course",
            Field::Email => "email",
        }
    }

    /// Label used at the start of user-facing messages.
    fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Age => "Age",
            Field::Course => "Course",
            Field::Email => "Email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: Field) -> Self {
        Self::new(field, format!("{} is required", field.label()))
    }

    pub fn not_text(field: Field) -> Self {
        Self::new(field, format!("{} must be a string", field.label()))
    }

    pub fn invalid_age() -> Self {
        Self::new(Field::Age, "Age must be a positive number")
    }

    pub fn invalid_email() -> Self {
        Self::new(Field::Email, "Please provide a valid email")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a write violated. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Wraps at least one collected error.
    pub(crate) fn new(mut errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        errors.sort_by_key(|e| e.field);
        Self { errors }
    }

    /// Wraps the collected errors, returning `None` when there are none.
    pub fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            return None;
        }
        Some(Self::new(errors))
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// User-facing messages in field order.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
