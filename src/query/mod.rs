//! Query model
//!
//! Immutable value objects built by the caller per repository call:
//! filter maps, sort specs, page and cursor requests, and the typed
//! results they produce.

mod cursor;
mod filter;
mod page;
mod sort;

pub use cursor::{CursorDirection, CursorExtra, CursorList, CursorQuery};
pub use filter::{
    compare_scalars, FilterMap, FilterOperator, FilterValue, OperatorMap, QualifiedLiteral,
};
pub use page::{Page, PageQuery};
pub use sort::{SortDirection, SortSpec};
