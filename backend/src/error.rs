//! Error taxonomy for the herd domain.
//!
//! Storage failures travel as `anyhow::Error` (repositories attach context),
//! everything the caller can act on has its own variant. A unique-key
//! violation reported by storage is an integrity error, not a storage failure.

use thiserror::Error;

use crate::storage::DuplicateKey;

pub type Result<T> = std::result::Result<T, HerdError>;

#[derive(Debug, Error)]
pub enum HerdError {
    /// A referenced animal, event or sale does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input: missing field, out-of-range count, sex mismatch
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The write would break a relationship other records depend on
    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl From<anyhow::Error> for HerdError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<DuplicateKey>() {
            Ok(duplicate) => HerdError::Integrity(duplicate.to_string()),
            Err(err) => HerdError::Storage(err),
        }
    }
}

impl HerdError {
    pub fn not_found(what: impl Into<String>) -> Self {
        HerdError::NotFound(what.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        HerdError::Validation(reason.into())
    }

    pub fn integrity(reason: impl Into<String>) -> Self {
        HerdError::Integrity(reason.into())
    }
}
