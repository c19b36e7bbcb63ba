//! # Repository Errors
//!
//! Error taxonomy shared by the compilers, the result mapper and the
//! repository. Every failure surfaces to the immediate caller; nothing is
//! retried or downgraded to an empty result.

use thiserror::Error;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository errors
#[derive(Debug, Clone, Error)]
pub enum RepoError {
    // ==================
    // Caller Errors
    // ==================
    /// Query or document failed validation before reaching the backend
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Single-document operation addressed a missing identifier
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    // ==================
    // Collaborator Errors
    // ==================
    /// Transport failure or non-success status from the backend
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Raw record could not be coerced into the target type
    #[error("Mapping failed for record {index}: {reason}")]
    Mapping { index: usize, reason: String },
}

impl RepoError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        RepoError::Validation(reason.into())
    }

    /// Create a not-found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        RepoError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            RepoError::Validation(_) => "REPO_VALIDATION",
            RepoError::NotFound { .. } => "REPO_NOT_FOUND",
            RepoError::Backend(_) => "REPO_BACKEND",
            RepoError::Mapping { .. } => "REPO_MAPPING",
        }
    }
}

/// Failures reported by a [`SearchBackend`](crate::repository::SearchBackend)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Target index does not exist
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Request never completed
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Request completed with a non-success status
    #[error("Status {status}: {reason}")]
    Status { status: u16, reason: String },
}
