//! Student domain model for rosterdb
//!
//! A student is the only entity the service stores. Records are created
//! and mutated through a [`StudentInput`] which must pass validation
//! before anything is persisted.
//!
//! # Invariants
//!
//! - Every persisted record satisfies all field constraints
//! - `id` and `created_at` are assigned once and never change
//! - Validation reports every violated field, not only the first

mod errors;
mod id;
mod model;
mod validator;

pub use errors::{Field, FieldError, ValidationErrors};
pub use id::{MalformedKey, StudentId};
pub use model::{Student, StudentFields, StudentInput};
pub use validator::{validate, EMAIL_PATTERN};
