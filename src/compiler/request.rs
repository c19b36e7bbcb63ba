//! Search requests handed to the backend and the raw responses it returns

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Map, Value};

use super::clause::Conjunction;
use crate::mapper::RawRecord;
use crate::query::SortDirection;

/// One compiled sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
    pub ignore_case: bool,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
            ignore_case: false,
        }
    }
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, self.direction.as_str())?;
        map.end()
    }
}

/// Backend-executable search
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchRequest {
    pub query: Conjunction,
    /// Offset; absent for keyset requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    /// Result-size limit
    pub size: u64,
    /// Empty means backend default ordering
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,
}

impl SearchRequest {
    /// Offset request
    pub fn offset(query: Conjunction, from: u64, size: u64, sort: Vec<SortField>) -> Self {
        Self {
            query,
            from: Some(from),
            size,
            sort,
        }
    }

    /// Keyset request
    pub fn keyset(query: Conjunction, size: u64, sort: Vec<SortField>) -> Self {
        Self {
            query,
            from: None,
            size,
            sort,
        }
    }

    /// Elasticsearch search body
    pub fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".into(), self.query.to_dsl());
        if let Some(from) = self.from {
            body.insert("from".into(), json!(from));
        }
        body.insert("size".into(), json!(self.size));
        if !self.sort.is_empty() {
            body.insert(
                "sort".into(),
                Value::Array(
                    self.sort
                        .iter()
                        .map(|s| json!({ s.field.as_str(): s.direction.as_str() }))
                        .collect(),
                ),
            );
        }
        Value::Object(body)
    }
}

/// Raw result of one search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    /// Documents in backend order
    pub documents: Vec<RawRecord>,
    /// Matches across the whole index, ignoring `from`/`size`
    pub total: u64,
}

impl SearchResponse {
    pub fn new(documents: Vec<RawRecord>, total: u64) -> Self {
        Self { documents, total }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}
