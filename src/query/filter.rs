//! # Filter Maps
//!
//! Caller-facing filter representation. A filter map binds each field name
//! either to a literal (equality) or to an operator map (`{"GT": 22}`).
//! All entries are combined with AND; there is no OR across fields.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals (always matched on the exact sub-field)
    #[serde(rename = "EQ")]
    Eq,

    /// Not equals
    #[serde(rename = "NE")]
    Ne,

    /// Greater than
    #[serde(rename = "GT")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "GTE")]
    Gte,

    /// Less than
    #[serde(rename = "LT")]
    Lt,

    /// Less than or equal
    #[serde(rename = "LTE")]
    Lte,

    /// Value in list
    #[serde(rename = "IN")]
    In,

    /// Phrase match
    #[serde(rename = "LIKE")]
    Like,
}

impl FilterOperator {
    /// Get the operator tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::Ne => "NE",
            FilterOperator::Gt => "GT",
            FilterOperator::Gte => "GTE",
            FilterOperator::Lt => "LT",
            FilterOperator::Lte => "LTE",
            FilterOperator::In => "IN",
            FilterOperator::Like => "LIKE",
        }
    }

    /// Parse an operator tag.
    ///
    /// Tags are case-insensitive and the legacy `GT_FILTER` spelling is
    /// accepted. Returns `None` for anything else.
    pub fn parse(tag: &str) -> Option<Self> {
        let upper = tag.trim().to_ascii_uppercase();
        let base = upper.strip_suffix("_FILTER").unwrap_or(&upper);

        match base {
            "EQ" => Some(FilterOperator::Eq),
            "NE" => Some(FilterOperator::Ne),
            "GT" => Some(FilterOperator::Gt),
            "GTE" => Some(FilterOperator::Gte),
            "LT" => Some(FilterOperator::Lt),
            "LTE" => Some(FilterOperator::Lte),
            "IN" => Some(FilterOperator::In),
            "LIKE" => Some(FilterOperator::Like),
            _ => None,
        }
    }

    /// Returns true for the four range bounds
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator tag → operand. Tags stay raw so unknown ones can be skipped.
pub type OperatorMap = BTreeMap<String, Value>;

/// A literal that picked up operators on the same field, e.g. an equality
/// filter on the cursor property once the boundary is injected.
///
/// The literal keeps its own rendering; the operators compile next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualifiedLiteral {
    pub literal: Value,
    pub operators: OperatorMap,
}

/// The value bound to a field in a [`FilterMap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `{"literal": 1500, "operators": {"LT": 2000}}`
    Qualified(QualifiedLiteral),

    /// Operator map, e.g. `{"GT": 22, "LT": 40}`
    Operators(OperatorMap),

    /// Bare value, implies equality
    Literal(Value),
}

impl FilterValue {
    /// Create a literal (equality) value
    pub fn literal(value: impl Into<Value>) -> Self {
        FilterValue::Literal(value.into())
    }

    /// Create a single-operator map
    pub fn op(op: FilterOperator, value: impl Into<Value>) -> Self {
        let mut ops = OperatorMap::new();
        ops.insert(op.as_str().to_string(), value.into());
        FilterValue::Operators(ops)
    }

    /// Returns the operand for `op` if this is an operator map holding it.
    ///
    /// Lookup goes through [`FilterOperator::parse`], so `gt` and `GT_FILTER`
    /// both resolve to `GT`.
    pub fn operand(&self, op: FilterOperator) -> Option<&Value> {
        let ops = match self {
            FilterValue::Operators(ops) => ops,
            FilterValue::Qualified(q) => &q.operators,
            FilterValue::Literal(_) => return None,
        };
        ops.iter()
            .find(|(tag, _)| FilterOperator::parse(tag) == Some(op))
            .map(|(_, v)| v)
    }

    /// The bare literal, if this value carries one
    pub fn literal_value(&self) -> Option<&Value> {
        match self {
            FilterValue::Literal(literal) => Some(literal),
            FilterValue::Qualified(q) => Some(&q.literal),
            FilterValue::Operators(_) => None,
        }
    }

    /// Adds `op` to this value. A literal is kept as is and qualified by
    /// the new operator.
    ///
    /// Any existing spelling of the same operator is replaced.
    pub fn with_op(self, op: FilterOperator, value: impl Into<Value>) -> Self {
        let insert = |mut ops: OperatorMap, value: Value| {
            ops.retain(|tag, _| FilterOperator::parse(tag) != Some(op));
            ops.insert(op.as_str().to_string(), value);
            ops
        };

        match self {
            FilterValue::Operators(ops) => FilterValue::Operators(insert(ops, value.into())),
            FilterValue::Qualified(q) => FilterValue::Qualified(QualifiedLiteral {
                literal: q.literal,
                operators: insert(q.operators, value.into()),
            }),
            FilterValue::Literal(literal) => FilterValue::Qualified(QualifiedLiteral {
                literal,
                operators: insert(OperatorMap::new(), value.into()),
            }),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::deserialize(&value).unwrap_or(FilterValue::Literal(value))
    }
}

/// Field name → filter value, combined with AND.
///
/// Entries iterate in field-name order, which keeps compiled output stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterMap {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality entry
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .insert(field.into(), FilterValue::literal(value));
        self
    }

    /// Adds an operator to a field, merging with what is already there
    pub fn op(mut self, field: impl Into<String>, op: FilterOperator, value: impl Into<Value>) -> Self {
        let field = field.into();
        let merged = match self.entries.remove(&field) {
            Some(existing) => existing.with_op(op, value),
            None => FilterValue::op(op, value),
        };
        self.entries.insert(field, merged);
        self
    }

    /// Inserts an entry, replacing any previous value for the field
    pub fn insert(&mut self, field: impl Into<String>, value: FilterValue) -> Option<FilterValue> {
        self.entries.insert(field.into(), value)
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.entries.get(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        self.entries.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, FilterValue)> for FilterMap {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<Map<String, Value>> for FilterMap {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(field, value)| (field, FilterValue::from(value)))
            .collect()
    }
}

/// Orders two scalar JSON values of the same kind.
///
/// Numbers compare numerically, strings lexically, booleans false < true.
/// Mixed kinds, nulls, arrays and objects are incomparable.
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
