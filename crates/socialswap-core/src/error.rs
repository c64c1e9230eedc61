//! Error types for the marketplace store

use socialswap_types::{EntityKind, Id};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Id },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(Constraint),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Dangling reference to {kind} {id}")]
    DanglingReference { kind: EntityKind, id: Id },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: Id) -> Self {
        StoreError::NotFound { kind, id }
    }

    /// Only backend failures are transient. Duplicate keys and missing
    /// references are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}

/// Uniqueness constraints enforced by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Username,
    Email,
    PlatformName,
    CategoryName,
    WatchlistPair,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Username => write!(f, "username already taken"),
            Constraint::Email => write!(f, "email already registered"),
            Constraint::PlatformName => write!(f, "platform name already exists"),
            Constraint::CategoryName => write!(f, "category name already exists"),
            Constraint::WatchlistPair => write!(f, "listing already in watchlist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_errors_retry() {
        assert!(StoreError::Storage("disk I/O".into()).is_retryable());
        assert!(!StoreError::ConstraintViolation(Constraint::Email).is_retryable());
        assert!(!StoreError::not_found(EntityKind::Listing, 7).is_retryable());
    }

    #[test]
    fn test_not_found_names_reference() {
        let err = StoreError::not_found(EntityKind::Platform, 42);
        assert_eq!(err.to_string(), "platform not found: 42");
    }
}
