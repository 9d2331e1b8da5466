//! Error types for store operations.

use crate::store::path::Path;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The dotted string does not describe a usable path.
    #[error("invalid store path {input:?}: {reason}")]
    InvalidPath { input: String, reason: &'static str },

    /// An intermediate segment holds a value that is not a mapping.
    #[error("path conflict at {at} while writing {path}: segment holds a value, not a mapping")]
    PathConflict { path: String, at: String },

    /// No store handle was supplied to the component.
    #[error("object store not available")]
    StoreUnavailable,
}

impl StoreError {
    #[inline]
    pub fn invalid_path(input: impl Into<String>, reason: &'static str) -> Self {
        StoreError::InvalidPath {
            input: input.into(),
            reason,
        }
    }

    #[inline]
    pub fn path_conflict(path: &Path, at: impl Into<String>) -> Self {
        StoreError::PathConflict {
            path: path.to_string(),
            at: at.into(),
        }
    }
}
