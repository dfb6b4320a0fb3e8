use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::UNKNOWN_ADDRESS;

/// Opaque ledger address. Only equality, hashing and ordering are meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Sentinel for a sender that could not be resolved.
    pub fn unknown() -> Self {
        Self(UNKNOWN_ADDRESS.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe stem used to name the address flow table.
    pub fn file_stem(&self) -> String {
        self.0.replace(':', "_")
    }
}

impl fmt::Display for Address {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
