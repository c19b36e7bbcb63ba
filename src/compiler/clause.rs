//! Compiled query clauses
//!
//! The clause tree is backend-neutral. `Serialize` renders the abstract
//! shape (`{"and": [{"exactMatch": {...}}]}`); [`Clause::to_dsl`] renders
//! the Elasticsearch query DSL.

use serde::ser::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::query::FilterOperator;

/// Bounds of one range clause
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

impl RangeBounds {
    /// Sets the bound for a range operator. Non-range operators are ignored.
    pub fn set(&mut self, op: FilterOperator, value: Value) {
        match op {
            FilterOperator::Gt => self.gt = Some(value),
            FilterOperator::Gte => self.gte = Some(value),
            FilterOperator::Lt => self.lt = Some(value),
            FilterOperator::Lte => self.lte = Some(value),
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    /// Bounds as a JSON object, unset bounds omitted
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, bound) in [
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
        ] {
            if let Some(v) = bound {
                map.insert(key.to_string(), v.clone());
            }
        }
        Value::Object(map)
    }
}

/// One compiled condition
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Keyword equality. `field` already carries the exact suffix when needed.
    ExactMatch { field: String, value: Value },

    /// Range with one or more bounds
    Range { field: String, bounds: RangeBounds },

    /// Set membership
    In { field: String, values: Vec<Value> },

    /// Phrase match on the analysed field
    PhraseMatch { field: String, value: Value },

    /// None of the inner clauses may match
    Not(Vec<Clause>),

    /// Every inner clause must match
    And(Vec<Clause>),
}

impl Clause {
    /// Abstract rendering
    pub fn to_abstract(&self) -> Value {
        match self {
            Clause::ExactMatch { field, value } => json!({ "exactMatch": { field: value } }),
            Clause::Range { field, bounds } => json!({ "range": { field: bounds.to_value() } }),
            Clause::In { field, values } => json!({ "in": { field: values } }),
            Clause::PhraseMatch { field, value } => json!({ "phraseMatch": { field: value } }),
            Clause::Not(inner) => {
                json!({ "not": inner.iter().map(Clause::to_abstract).collect::<Vec<_>>() })
            }
            Clause::And(inner) => {
                json!({ "and": inner.iter().map(Clause::to_abstract).collect::<Vec<_>>() })
            }
        }
    }

    /// Elasticsearch query DSL rendering
    pub fn to_dsl(&self) -> Value {
        match self {
            Clause::ExactMatch { field, value } => json!({ "term": { field: value } }),
            Clause::Range { field, bounds } => json!({ "range": { field: bounds.to_value() } }),
            Clause::In { field, values } => json!({ "terms": { field: values } }),
            Clause::PhraseMatch { field, value } => {
                json!({ "match_phrase": { field: { "query": value } } })
            }
            Clause::Not(inner) => json!({
                "bool": { "must_not": inner.iter().map(Clause::to_dsl).collect::<Vec<_>>() }
            }),
            Clause::And(inner) => json!({
                "bool": { "must": inner.iter().map(Clause::to_dsl).collect::<Vec<_>>() }
            }),
        }
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_abstract().serialize(serializer)
    }
}

/// Top-level AND of clauses
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Conjunction {
    #[serde(rename = "and")]
    pub clauses: Vec<Clause>,
}

impl Conjunction {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Elasticsearch query DSL. An empty conjunction matches everything.
    pub fn to_dsl(&self) -> Value {
        if self.clauses.is_empty() {
            return json!({ "match_all": {} });
        }
        json!({
            "bool": { "must": self.clauses.iter().map(Clause::to_dsl).collect::<Vec<_>>() }
        })
    }
}
