//! Search backend collaborator
//!
//! The repository never talks to a cluster directly. Everything it needs is
//! behind [`SearchBackend`]: one search call for the paging paths plus the
//! single-document operations used by the CRUD glue.

use crate::compiler::{SearchRequest, SearchResponse};
use crate::errors::BackendError;
use crate::mapper::RawRecord;

/// Result of a single-document write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new document was stored
    Created,
    /// Create-if-absent found an existing document; nothing was written
    AlreadyExists,
    /// An existing document was changed
    Updated,
    /// The document was removed
    Deleted,
    /// The addressed document does not exist
    NotFound,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::Created => "created",
            WriteOutcome::AlreadyExists => "already_exists",
            WriteOutcome::Updated => "updated",
            WriteOutcome::Deleted => "deleted",
            WriteOutcome::NotFound => "not_found",
        }
    }
}

/// Document search backend.
///
/// Implementations take `&self` and handle their own synchronization, so a
/// backend can be shared between threads.
pub trait SearchBackend {
    /// Executes a compiled search against `index`.
    ///
    /// `total` in the response counts every match, ignoring `from`/`size`.
    fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse, BackendError>;

    /// Fetches one document by identifier
    fn get(&self, index: &str, id: &str) -> Result<Option<RawRecord>, BackendError>;

    fn exists(&self, index: &str, id: &str) -> Result<bool, BackendError> {
        Ok(self.get(index, id)?.is_some())
    }

    /// Stores `document` unless `id` is taken. Returns `Created` or `AlreadyExists`.
    fn create(&self, index: &str, id: &str, document: RawRecord) -> Result<WriteOutcome, BackendError>;

    /// Merges `partial` into an existing document. Returns `Updated` or `NotFound`.
    fn update(&self, index: &str, id: &str, partial: RawRecord) -> Result<WriteOutcome, BackendError>;

    /// Removes a document. Returns `Deleted` or `NotFound`.
    fn delete(&self, index: &str, id: &str) -> Result<WriteOutcome, BackendError>;
}
