//! Storage error types.
//!
//! Only writes (`set`, `unset`) and `begin` fail hard. Reads report bad input
//! through [`Lookup::Invalid`](crate::storage::Lookup::Invalid), and
//! `rollback`/`commit` on an empty stack return [`NoActiveTransaction`].

use std::fmt;
use thiserror::Error;

/// Which half of a key/value pair failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Key,
    Value,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Key => write!(f, "Key"),
            TokenKind::Value => write!(f, "Value"),
        }
    }
}

/// Hard failures surfaced by mutating store operations.
///
/// A failed operation leaves the store exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A key or value is empty or contains non-alphanumeric characters
    #[error("{0} must be alphanumeric string")]
    InvalidFormat(TokenKind),

    /// The committed store already holds the maximum number of keys
    #[error("Database size limit reached")]
    CapacityExceeded { limit: usize },

    /// The transaction stack is already at its maximum depth
    #[error("Maximum transaction depth reached")]
    TransactionDepthExceeded { limit: usize },
}

/// Signal returned by `rollback`/`commit` when no transaction is open.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no active transaction")]
pub struct NoActiveTransaction;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            StoreError::InvalidFormat(TokenKind::Key).to_string(),
            "Key must be alphanumeric string"
        );
        assert_eq!(
            StoreError::InvalidFormat(TokenKind::Value).to_string(),
            "Value must be alphanumeric string"
        );
        assert_eq!(
            StoreError::CapacityExceeded { limit: 10 }.to_string(),
            "Database size limit reached"
        );
        assert_eq!(
            StoreError::TransactionDepthExceeded { limit: 3 }.to_string(),
            "Maximum transaction depth reached"
        );
        assert_eq!(NoActiveTransaction.to_string(), "no active transaction");
    }
}
