//! Student identifiers
//!
//! Ids are random UUIDs assigned by the store. A string that does not
//! parse as a UUID is a malformed key, which callers must keep distinct
//! from a well-formed key that simply has no record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier that does not match the store's key encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed student id '{0}'")]
pub struct MalformedKey(pub String);

/// Opaque, immutable student identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an id from its wire form.
    pub fn parse(raw: &str) -> Result<Self, MalformedKey> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| MalformedKey(raw.to_string()))
    }
}

impl FromStr for StudentId {
    type Err = MalformedKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
