//! Keyset (cursor) planner
//!
//! A cursor read is split in two halves around the backend call:
//! [`CursorQueryPlanner::plan`] builds the request, and the returned
//! [`PendingAssembly`] turns the raw response into a [`CursorList`].
//!
//! Boundaries are strict (`LT`/`GT`), so rows sharing the cursor value with
//! the boundary row are skipped. The cursor property should be unique per
//! row; no tie-breaker is added.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::filter::FilterCompiler;
use super::request::{SearchRequest, SearchResponse, SortField};
use crate::errors::{RepoError, RepoResult};
use crate::mapper::ResultMapper;
use crate::query::{
    compare_scalars, CursorDirection, CursorExtra, CursorList, CursorQuery, FilterMap,
    FilterOperator, FilterValue,
};
use crate::schema::EntitySchema;

/// Builds keyset search requests
pub struct CursorQueryPlanner<'a> {
    filter_compiler: &'a FilterCompiler,
}

impl<'a> CursorQueryPlanner<'a> {
    pub fn new(filter_compiler: &'a FilterCompiler) -> Self {
        Self { filter_compiler }
    }

    /// Plans a cursor read against `schema`.
    ///
    /// The caller's filter map is not modified; the boundary is injected
    /// into a copy.
    pub fn plan(
        &self,
        query: &CursorQuery,
        schema: &dyn EntitySchema,
    ) -> RepoResult<(SearchRequest, PendingAssembly)> {
        query.validate()?;

        let property = query.property();
        if !schema.has_attribute(property) {
            return Err(RepoError::validation(format!(
                "unknown cursor property '{}' for collection '{}'",
                property,
                schema.collection_name()
            )));
        }
        if query.cursor.is_null() {
            return Err(RepoError::validation("cursor value is required"));
        }

        let boundary = query.direction.boundary_operator();
        let filters = inject_boundary(&query.filters, property, boundary, &query.cursor)?;

        let sort = vec![SortField {
            field: property.to_string(),
            direction: query.direction.execution_sort(),
            ignore_case: query.cursor_sort.ignore_case,
        }];
        let request = SearchRequest::keyset(self.filter_compiler.compile(&filters), query.size, sort);

        debug!(
            collection = schema.collection_name(),
            property,
            direction = query.direction.as_str(),
            size = query.size,
            "planned cursor query"
        );

        Ok((
            request,
            PendingAssembly {
                direction: query.direction,
                property: property.to_string(),
                requested: query.size,
            },
        ))
    }
}

/// Adds the strict boundary for `property` to a copy of `filters`.
///
/// - no entry: `{op: cursor}`
/// - operator map without `op`: `op` added next to the existing tags
/// - operator map with `op`: the tighter bound wins
/// - literal: kept with its own rendering, qualified by the boundary
pub fn inject_boundary(
    filters: &FilterMap,
    property: &str,
    op: FilterOperator,
    cursor: &Value,
) -> RepoResult<FilterMap> {
    let mut merged = filters.clone();

    let value = match merged.remove(property) {
        None => FilterValue::op(op, cursor.clone()),
        Some(existing) => {
            let replace = match existing.operand(op) {
                None => true,
                Some(current) => is_tighter(op, cursor, current)?,
            };
            if replace {
                existing.with_op(op, cursor.clone())
            } else {
                existing
            }
        }
    };

    merged.insert(property, value);
    Ok(merged)
}

fn is_tighter(op: FilterOperator, candidate: &Value, current: &Value) -> RepoResult<bool> {
    let ordering = compare_scalars(candidate, current).ok_or_else(|| {
        RepoError::validation(format!(
            "cursor {} cannot be compared with existing {} bound {}",
            candidate, op, current
        ))
    })?;

    Ok(match op {
        FilterOperator::Gt | FilterOperator::Gte => ordering == Ordering::Greater,
        FilterOperator::Lt | FilterOperator::Lte => ordering == Ordering::Less,
        _ => false,
    })
}

/// Second half of a cursor read, applied to the backend response
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAssembly {
    direction: CursorDirection,
    property: String,
    requested: u64,
}

impl PendingAssembly {
    pub fn direction(&self) -> CursorDirection {
        self.direction
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Builds the typed cursor list.
    ///
    /// Backward reads arrive nearest-first (descending) and are reversed so
    /// items always come back ascending by the cursor property. Min/max
    /// cursors are read from the raw records before mapping.
    pub fn assemble<T: DeserializeOwned>(self, response: SearchResponse) -> RepoResult<CursorList<T>> {
        let mut documents = response.documents;
        documents.truncate(usize::try_from(self.requested).unwrap_or(usize::MAX));

        if self.direction == CursorDirection::Backward {
            documents.reverse();
        }

        let min_cursor = documents.first().and_then(|d| d.get(&self.property)).cloned();
        let max_cursor = documents.last().and_then(|d| d.get(&self.property)).cloned();

        let items: Vec<T> = ResultMapper::map(documents)?;

        Ok(CursorList {
            extra: CursorExtra {
                direction: self.direction,
                size: items.len(),
                has_more: response.total > self.requested,
                min_cursor,
                max_cursor,
            },
            items,
        })
    }
}
