//! Use-case error types.

use domain::DomainError;
use storage::StorageError;
use thiserror::Error;

/// Errors that can occur during use-case execution.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A domain validation rule was violated.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The producer row could not be deleted after its farms and crops
    /// were already removed. The cascade is not transactional, so the
    /// dependent deletions are not rolled back.
    #[error("Failed to delete producer after cascade deletion")]
    CascadeIncomplete,

    /// A storage error, propagated unmodified.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
