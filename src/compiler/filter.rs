//! Filter map → conjunction compiler
//!
//! Every filter entry yields exactly one clause and all clauses are AND-ed.
//! OR across fields cannot be expressed; callers needing it must issue
//! separate queries.
//!
//! Per-entry rules:
//! - string literal → exact match on `<field>.<suffix>`
//! - other literal → exact match on `<field>`
//! - literal with operators → the literal's clause AND the operators' clauses
//! - GT/GTE/LT/LTE → one merged range clause
//! - EQ → exact match on `<field>.<suffix>`, whatever the operand type
//! - NE → NOT of the EQ rendering
//! - IN → set membership
//! - LIKE → phrase match on `<field>`
//! - unknown tag → dropped

use serde_json::Value;
use tracing::warn;

use super::clause::{Clause, Conjunction, RangeBounds};
use crate::query::{FilterMap, FilterOperator, FilterValue, OperatorMap};

/// Sub-field holding the untokenized copy of a text field.
/// Mappings that name it `exact` set the suffix through configuration.
pub const DEFAULT_EXACT_SUFFIX: &str = "keyword";

/// Compiles filter maps into conjunctions. Stateless apart from the suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCompiler {
    exact_suffix: String,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self {
            exact_suffix: DEFAULT_EXACT_SUFFIX.to_string(),
        }
    }
}

impl FilterCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `suffix` for the exact sub-field instead of `keyword`
    pub fn with_exact_suffix(suffix: impl Into<String>) -> Self {
        Self {
            exact_suffix: suffix.into(),
        }
    }

    pub fn exact_suffix(&self) -> &str {
        &self.exact_suffix
    }

    /// Name of the exact sub-field for `field`
    pub fn exact_field(&self, field: &str) -> String {
        format!("{}.{}", field, self.exact_suffix)
    }

    /// Compiles a filter map.
    ///
    /// Entries are visited in field-name order, so the same map always
    /// produces the same clause list.
    pub fn compile(&self, filters: &FilterMap) -> Conjunction {
        let clauses = filters
            .iter()
            .filter_map(|(field, value)| self.compile_entry(field, value))
            .collect();
        Conjunction::new(clauses)
    }

    fn compile_entry(&self, field: &str, value: &FilterValue) -> Option<Clause> {
        match value {
            FilterValue::Literal(literal) => Some(self.literal_clause(field, literal)),
            FilterValue::Operators(ops) => self.compile_operators(field, ops),
            FilterValue::Qualified(q) => {
                let literal = self.literal_clause(field, &q.literal);
                Some(match self.compile_operators(field, &q.operators) {
                    None => literal,
                    Some(Clause::And(mut inner)) => {
                        inner.insert(0, literal);
                        Clause::And(inner)
                    }
                    Some(other) => Clause::And(vec![literal, other]),
                })
            }
        }
    }

    fn literal_clause(&self, field: &str, literal: &Value) -> Clause {
        match literal {
            Value::String(_) => self.exact_clause(field, literal),
            _ => Clause::ExactMatch {
                field: field.to_string(),
                value: literal.clone(),
            },
        }
    }

    /// Compiles one operator map. Several resulting clauses are wrapped in a
    /// nested AND so the entry still counts as one clause.
    fn compile_operators(&self, field: &str, ops: &OperatorMap) -> Option<Clause> {
        let mut clauses = Vec::new();
        let mut bounds = RangeBounds::default();

        for (tag, operand) in ops {
            let op = match FilterOperator::parse(tag) {
                Some(op) => op,
                None => {
                    warn!(field, tag = tag.as_str(), "dropping unsupported filter operator");
                    continue;
                }
            };

            if op.is_range() {
                bounds.set(op, operand.clone());
                continue;
            }

            match op {
                FilterOperator::Eq => clauses.push(self.exact_clause(field, operand)),
                FilterOperator::Ne => clauses.push(Clause::Not(vec![self.exact_clause(field, operand)])),
                FilterOperator::In => clauses.push(Clause::In {
                    field: field.to_string(),
                    values: as_list(operand),
                }),
                FilterOperator::Like => clauses.push(Clause::PhraseMatch {
                    field: field.to_string(),
                    value: operand.clone(),
                }),
                // collected into `bounds` above
                FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {}
            }
        }

        if !bounds.is_empty() {
            clauses.push(Clause::Range {
                field: field.to_string(),
                bounds,
            });
        }

        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Clause::And(clauses)),
        }
    }

    fn exact_clause(&self, field: &str, value: &Value) -> Clause {
        Clause::ExactMatch {
            field: self.exact_field(field),
            value: value.clone(),
        }
    }
}

fn as_list(operand: &Value) -> Vec<Value> {
    match operand {
        Value::Array(values) => values.clone(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(filters: Value) -> Conjunction {
        let filters: FilterMap = serde_json::from_value(filters).unwrap();
        FilterCompiler::new().compile(&filters)
    }

    #[test]
    fn test_single_range_operator() {
        let conj = compile(json!({"age": {"GT": 22}}));
        assert_eq!(
            serde_json::to_value(&conj).unwrap(),
            json!({"and": [{"range": {"age": {"gt": 22}}}]})
        );
    }

    #[test]
    fn test_range_operators_merge_into_one_clause() {
        let conj = compile(json!({"age": {"GT": 22, "LT": 40}}));
        assert_eq!(conj.len(), 1);
        assert_eq!(
            conj.clauses[0],
            Clause::Range {
                field: "age".into(),
                bounds: RangeBounds {
                    gt: Some(json!(22)),
                    lt: Some(json!(40)),
                    ..Default::default()
                },
            }
        );
    }

    #[test]
    fn test_string_literal_uses_exact_field() {
        let conj = compile(json!({"name": "Zhao"}));
        assert_eq!(
            conj.clauses,
            vec![Clause::ExactMatch {
                field: "name.keyword".into(),
                value: json!("Zhao"),
            }]
        );
    }

    #[test]
    fn test_custom_exact_suffix() {
        let filters = FilterMap::new().equals("name", "Zhao");
        let conj = FilterCompiler::with_exact_suffix("exact").compile(&filters);
        assert_eq!(
            serde_json::to_value(&conj).unwrap(),
            json!({"and": [{"exactMatch": {"name.exact": "Zhao"}}]})
        );
    }

    #[test]
    fn test_non_string_literal_uses_plain_field() {
        let conj = compile(json!({"age": 30}));
        assert_eq!(
            conj.clauses,
            vec![Clause::ExactMatch {
                field: "age".into(),
                value: json!(30),
            }]
        );
    }

    #[test]
    fn test_eq_always_uses_exact_field() {
        let conj = compile(json!({"age": {"EQ": 30}}));
        assert_eq!(
            conj.clauses,
            vec![Clause::ExactMatch {
                field: "age.keyword".into(),
                value: json!(30),
            }]
        );
    }

    #[test]
    fn test_ne_wraps_exact_clause() {
        let conj = compile(json!({"name": {"NE": "2"}}));
        assert_eq!(
            serde_json::to_value(&conj).unwrap(),
            json!({"and": [{"not": [{"exactMatch": {"name.keyword": "2"}}]}]})
        );
    }

    #[test]
    fn test_in_lists_values_unmodified() {
        let conj = compile(json!({"name": {"IN": ["A", "B"]}}));
        assert_eq!(
            serde_json::to_value(&conj).unwrap(),
            json!({"and": [{"in": {"name": ["A", "B"]}}]})
        );
    }

    #[test]
    fn test_in_scalar_operand_becomes_list() {
        let conj = compile(json!({"name": {"IN": "A"}}));
        assert_eq!(
            conj.clauses,
            vec![Clause::In {
                field: "name".into(),
                values: vec![json!("A")],
            }]
        );
    }

    #[test]
    fn test_like_is_phrase_match_without_wildcards() {
        let conj = compile(json!({"title": {"LIKE": "%fox%"}}));
        assert_eq!(
            conj.clauses,
            vec![Clause::PhraseMatch {
                field: "title".into(),
                value: json!("%fox%"),
            }]
        );
    }

    #[test]
    fn test_unknown_operator_dropped() {
        let conj = compile(json!({"age": {"BETWEEN": [1, 2], "GT": 1}, "name": {"REGEX": "x"}}));
        assert_eq!(conj.len(), 1);
        assert!(matches!(conj.clauses[0], Clause::Range { .. }));
    }

    #[test]
    fn test_mixed_operators_stay_one_clause() {
        let conj = compile(json!({"age": {"NE": 30, "GTE": 18}}));
        assert_eq!(conj.len(), 1);
        match &conj.clauses[0] {
            Clause::And(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(matches!(inner[0], Clause::Not(_)));
                assert!(matches!(inner[1], Clause::Range { .. }));
            }
            other => panic!("expected nested AND, got {:?}", other),
        }
    }

    #[test]
    fn test_clause_count_matches_key_count() {
        let conj = compile(json!({
            "a": "x",
            "b": 1,
            "c": {"GT": 1, "LTE": 9},
            "d": {"IN": [1, 2]},
            "e": {"LIKE": "y"},
            "f": {"NE": false}
        }));
        assert_eq!(conj.len(), 6);
    }

    #[test]
    fn test_qualified_literal_keeps_its_field() {
        let filters = FilterMap::new()
            .equals("ctime", 1500)
            .op("ctime", FilterOperator::Lt, 2000)
            .equals("name", "Lu")
            .op("name", FilterOperator::Ne, "Zhao");

        let conj = FilterCompiler::new().compile(&filters);

        assert_eq!(conj.len(), 2);
        assert_eq!(
            serde_json::to_value(&conj).unwrap(),
            json!({"and": [
                {"and": [{"exactMatch": {"ctime": 1500}}, {"range": {"ctime": {"lt": 2000}}}]},
                {"and": [
                    {"exactMatch": {"name.keyword": "Lu"}},
                    {"not": [{"exactMatch": {"name.keyword": "Zhao"}}]}
                ]}
            ]})
        );
    }

    #[test]
    fn test_qualified_literal_nests_flat() {
        let filters = FilterMap::new()
            .equals("age", 30)
            .op("age", FilterOperator::Ne, 31)
            .op("age", FilterOperator::Gte, 18);

        let conj = FilterCompiler::new().compile(&filters);

        match &conj.clauses[0] {
            Clause::And(inner) => {
                assert_eq!(inner.len(), 3);
                assert_eq!(
                    inner[0],
                    Clause::ExactMatch {
                        field: "age".into(),
                        value: json!(30),
                    }
                );
            }
            other => panic!("expected nested AND, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_filters() {
        let conj = FilterCompiler::new().compile(&FilterMap::new());
        assert!(conj.is_empty());
    }
}
