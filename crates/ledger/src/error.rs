//! The error type shared by every ledger operation.
//!
//! Validation errors are raised before any row is written; a
//! [`Database`](LedgerError::Database) error aborts the whole atomic unit.

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A referenced account, credit card or category does not exist for the
    /// acting user. Foreign-owned references surface as this error too, so
    /// existence never leaks across users.
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),
    /// The referenced category's kind does not match the transaction kind.
    #[error("category kind mismatch: {0}")]
    CategoryKindMismatch(String),
    /// A transfer names the same balance target on both sides.
    #[error("invalid transfer target: {0}")]
    InvalidTransferTarget(String),
    /// A reference was supplied that the transaction kind forbids.
    #[error("unexpected reference: {0}")]
    UnexpectedReference(String),
    /// Deletion blocked because transactions still reference the entity.
    #[error("\"{0}\" is still referenced by transactions")]
    EntityInUse(String),
    /// The requested entity does not exist for the acting user.
    #[error("{0} not found")]
    NotFound(String),
    /// Invalid amount or other malformed value.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Invalid entity name (empty after trimming).
    #[error("invalid name: {0}")]
    InvalidName(String),
    /// Another entity of the same type already uses this name.
    #[error("\"{0}\" already exists")]
    ExistingName(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ReferenceNotFound(a), Self::ReferenceNotFound(b)) => a == b,
            (Self::CategoryKindMismatch(a), Self::CategoryKindMismatch(b)) => a == b,
            (Self::InvalidTransferTarget(a), Self::InvalidTransferTarget(b)) => a == b,
            (Self::UnexpectedReference(a), Self::UnexpectedReference(b)) => a == b,
            (Self::EntityInUse(a), Self::EntityInUse(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::ExistingName(a), Self::ExistingName(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
