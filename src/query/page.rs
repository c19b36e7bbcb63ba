//! Offset paging requests and results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{FilterMap, FilterOperator};
use super::sort::SortSpec;
use crate::errors::{RepoError, RepoResult};

/// Offset page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Filter conditions (AND)
    #[serde(default)]
    pub filters: FilterMap,
    /// Sort order, primary first
    #[serde(default)]
    pub sort: Vec<SortSpec>,
    /// 1-based page number
    pub page_no: u64,
    /// Items per page
    pub page_size: u64,
}

impl PageQuery {
    pub fn new(page_no: u64, page_size: u64) -> Self {
        Self {
            filters: FilterMap::new(),
            sort: Vec::new(),
            page_no,
            page_size,
        }
    }

    pub fn with_filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }

    /// Adds an equality filter
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters = self.filters.equals(field, value);
        self
    }

    /// Adds an operator filter
    pub fn filter_op(
        mut self,
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters = self.filters.op(field, op, value);
        self
    }

    /// Appends a sort key
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn validate(&self) -> RepoResult<()> {
        if self.page_no < 1 {
            return Err(RepoError::validation("pageNo must be >= 1"));
        }
        if self.page_size == 0 {
            return Err(RepoError::validation("pageSize must be > 0"));
        }
        Ok(())
    }

    /// Number of documents skipped before this page
    pub fn offset(&self) -> u64 {
        self.page_no.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of typed results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total matches across all pages
    pub total: u64,
    /// Items on this page
    pub page_count: usize,
    pub items: Vec<T>,
}
