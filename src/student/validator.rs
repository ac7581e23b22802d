//! Field validation for student writes
//!
//! Rules:
//! - name, course: required, non-empty after trim, stored trimmed
//! - age: required, integer >= 1 (JSON integer, integral float such as `20.0`,
//!   or numeric string)
//! - email: required, trimmed, must match [`EMAIL_PATTERN`], stored lower-cased
//!
//! All fields are checked; the result lists every violation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::errors::{Field, FieldError, ValidationErrors};
use super::model::{StudentFields, StudentInput};

/// Permissive `local@domain.tld` shape check. No deliverability is implied.
pub const EMAIL_PATTERN: &str = r"^\S+@\S+\.\S+$";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// Validates and normalizes a write request.
pub fn validate(input: &StudentInput) -> Result<StudentFields, ValidationErrors> {
    let name = required_text(Field::Name, input.name.as_ref());
    let age = positive_age(input.age.as_ref());
    let course = required_text(Field::Course, input.course.as_ref());
    let email = email(input.email.as_ref());

    match (name, age, course, email) {
        (Ok(name), Ok(age), Ok(course), Ok(email)) => Ok(StudentFields {
            name,
            age,
            course,
            email,
        }),
        (name, age, course, email) => {
            let errors = [name.err(), age.err(), course.err(), email.err()]
                .into_iter()
                .flatten()
                .collect();
            Err(ValidationErrors::new(errors))
        }
    }
}

fn required_text(field: Field, value: Option<&Value>) -> Result<String, FieldError> {
    match value {
        None | Some(Value::Null) => Err(FieldError::required(field)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(FieldError::required(field))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(FieldError::not_text(field)),
    }
}

fn positive_age(value: Option<&Value>) -> Result<u32, FieldError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(FieldError::required(Field::Age)),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(FieldError::required(Field::Age))
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Some(_) => None,
    };

    parsed
        .filter(|age| *age >= 1)
        .and_then(|age| u32::try_from(age).ok())
        .ok_or_else(FieldError::invalid_age)
}

fn email(value: Option<&Value>) -> Result<String, FieldError> {
    let trimmed = required_text(Field::Email, value)?;
    if EMAIL_RE.is_match(&trimmed) {
        Ok(trimmed.to_lowercase())
    } else {
        Err(FieldError::invalid_email())
    }
}
