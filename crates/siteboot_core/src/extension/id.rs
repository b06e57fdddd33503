//! Extension identifiers.
//!
//! # Invariants
//! - An id is never blank and never contains whitespace.
//! - Ids are otherwise opaque: `jekyll-assets/compass` is as valid as `x`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque name identifying one loadable extension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Builds an id from raw text, trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidExtensionId> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidExtensionId::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidExtensionId::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExtensionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ExtensionId {
    type Error = InvalidExtensionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExtensionId> for String {
    fn from(value: ExtensionId) -> Self {
        value.0
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rejection reason for a malformed extension id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidExtensionId {
    Empty,
    Whitespace(String),
}

impl Display for InvalidExtensionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "extension id must not be empty"),
            Self::Whitespace(value) => {
                write!(f, "extension id must not contain whitespace: {value}")
            }
        }
    }
}

impl Error for InvalidExtensionId {}
