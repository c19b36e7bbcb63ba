//! Query compilation for docrepo
//!
//! Turns caller query objects into backend search requests, and cursor
//! responses back into typed lists.
//!
//! # Pipeline
//!
//! 1. Validate the query (sizes, page numbers, cursor property)
//! 2. Compile filters into an AND-ed clause list
//! 3. Compile or derive the sort
//! 4. Build an offset or keyset [`SearchRequest`]
//! 5. (cursor only) Assemble the raw response: truncate, un-reverse,
//!    extract min/max cursors, map
//!
//! # Invariants
//!
//! - Deterministic: same query, same request
//! - Stateless: compilers hold configuration only and are `Send + Sync`
//! - One clause per filter entry; no OR across fields

mod clause;
mod cursor;
mod filter;
mod page;
mod request;
mod sort;

pub use clause::{Clause, Conjunction, RangeBounds};
pub use cursor::{inject_boundary, CursorQueryPlanner, PendingAssembly};
pub use filter::{FilterCompiler, DEFAULT_EXACT_SUFFIX};
pub use page::PageQueryPlanner;
pub use request::{SearchRequest, SearchResponse, SortField};
pub use sort::SortCompiler;
