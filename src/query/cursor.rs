//! Keyset (cursor) paging requests and results

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::filter::{FilterMap, FilterOperator};
use super::sort::{SortDirection, SortSpec};
use crate::errors::{RepoError, RepoResult};

/// Which side of the cursor to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "DirectionRepr")]
pub enum CursorDirection {
    /// Rows strictly before the cursor
    #[default]
    Backward,
    /// Rows strictly after the cursor
    Forward,
}

impl CursorDirection {
    /// Legacy byte encoding: 0 = before the cursor, 1 = after
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(CursorDirection::Backward),
            1 => Some(CursorDirection::Forward),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CursorDirection::Backward => "backward",
            CursorDirection::Forward => "forward",
        }
    }

    /// Strict boundary operator injected for this direction
    pub fn boundary_operator(&self) -> FilterOperator {
        match self {
            CursorDirection::Backward => FilterOperator::Lt,
            CursorDirection::Forward => FilterOperator::Gt,
        }
    }

    /// Sort the backend must apply so the rows nearest the cursor come first
    pub fn execution_sort(&self) -> SortDirection {
        match self {
            CursorDirection::Backward => SortDirection::Desc,
            CursorDirection::Forward => SortDirection::Asc,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Byte(u8),
    Name(String),
}

impl TryFrom<DirectionRepr> for CursorDirection {
    type Error = String;

    fn try_from(repr: DirectionRepr) -> Result<Self, Self::Error> {
        match repr {
            DirectionRepr::Byte(b) => {
                CursorDirection::from_byte(b).ok_or_else(|| format!("invalid direction byte: {}", b))
            }
            DirectionRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "backward" => Ok(CursorDirection::Backward),
                "forward" => Ok(CursorDirection::Forward),
                other => Err(format!("invalid direction: {}", other)),
            },
        }
    }
}

/// Keyset page request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorQuery {
    /// Filter conditions (AND)
    #[serde(default)]
    pub filters: FilterMap,
    /// Cursor property. Its direction is ignored; `direction` decides.
    pub cursor_sort: SortSpec,
    /// Boundary value from the previous page
    pub cursor: Value,
    /// Maximum rows to return
    pub size: u64,
    #[serde(default)]
    pub direction: CursorDirection,
}

impl CursorQuery {
    pub fn new(
        property: impl Into<String>,
        cursor: impl Into<Value>,
        size: u64,
        direction: CursorDirection,
    ) -> Self {
        Self {
            filters: FilterMap::new(),
            cursor_sort: SortSpec::asc(property),
            cursor: cursor.into(),
            size,
            direction,
        }
    }

    /// Rows after `cursor`
    pub fn forward(property: impl Into<String>, cursor: impl Into<Value>, size: u64) -> Self {
        Self::new(property, cursor, size, CursorDirection::Forward)
    }

    /// Rows before `cursor`
    pub fn backward(property: impl Into<String>, cursor: impl Into<Value>, size: u64) -> Self {
        Self::new(property, cursor, size, CursorDirection::Backward)
    }

    pub fn with_filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }

    pub fn property(&self) -> &str {
        &self.cursor_sort.property
    }

    /// Checks sizes and the cursor property name. Schema membership is
    /// checked by the planner.
    pub fn validate(&self) -> RepoResult<()> {
        if self.cursor_sort.property.trim().is_empty() {
            return Err(RepoError::validation("cursorSort.property is required"));
        }
        if self.size == 0 {
            return Err(RepoError::validation("size must be > 0"));
        }
        Ok(())
    }
}

/// Pagination metadata for one cursor read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorExtra {
    pub direction: CursorDirection,
    /// Rows actually returned
    pub size: usize,
    /// More matches exist beyond the requested size
    pub has_more: bool,
    /// Cursor value of the first returned row
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_cursor: Option<Value>,
    /// Cursor value of the last returned row
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_cursor: Option<Value>,
}

/// Typed rows of one cursor read, ascending by the cursor property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorList<T> {
    pub extra: CursorExtra,
    pub items: Vec<T>,
}
