//! Repository subsystem for docrepo
//!
//! [`Repository`] glues the planners, the [`SearchBackend`] and the result
//! mapper together. [`MemoryBackend`] is the in-process backend.

mod backend;
mod memory;
mod repository;

pub use backend::{SearchBackend, WriteOutcome};
pub use memory::MemoryBackend;
pub use repository::{ChangeInfo, Repository};
