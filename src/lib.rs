//! docrepo - generic repository over a document search backend
//!
//! Compiles filter maps and sort specs into search requests, and pages
//! through results by offset or by keyset cursor.

pub mod cli;
pub mod compiler;
pub mod errors;
pub mod mapper;
pub mod query;
pub mod repository;
pub mod schema;

pub use errors::{BackendError, RepoError, RepoResult};
