//! Uniform response envelope
//!
//! Every response body, success or failure, has the shape
//! `{success, data?, count?, message?, errors?}`. Absent members are
//! omitted rather than serialized as `null`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            message: None,
            errors: None,
        }
    }

    pub fn data_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::data(data)
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self {
            count: Some(count),
            ..Self::data(data)
        }
    }
}

impl Envelope<()> {
    /// Success without a payload.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::message(message)
        }
    }

    pub fn failure_with_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::failure(message)
        }
    }
}
