//! Result mapping
//!
//! Coerces raw backend records into caller types with serde. Mapping is
//! all-or-nothing: one bad record fails the whole batch and nothing is
//! appended to the caller's list.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::{RepoError, RepoResult};

/// One document as returned by the backend
pub type RawRecord = Map<String, Value>;

/// Maps raw records to typed values
pub struct ResultMapper;

impl ResultMapper {
    /// Maps every record, preserving order
    pub fn map<T: DeserializeOwned>(records: Vec<RawRecord>) -> RepoResult<Vec<T>> {
        let mut out = Vec::with_capacity(records.len());
        Self::map_into(records, &mut out)?;
        Ok(out)
    }

    /// Appends the mapped records to `out`. On error `out` is left as it was.
    pub fn map_into<T: DeserializeOwned>(records: Vec<RawRecord>, out: &mut Vec<T>) -> RepoResult<()> {
        let mapped = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Self::map_at(index, record))
            .collect::<RepoResult<Vec<T>>>()?;
        out.extend(mapped);
        Ok(())
    }

    /// Maps a single record
    pub fn map_one<T: DeserializeOwned>(record: RawRecord) -> RepoResult<T> {
        Self::map_at(0, record)
    }

    /// Serializes a value into a raw record. Only JSON objects qualify.
    pub fn to_record<T: Serialize>(value: &T) -> RepoResult<RawRecord> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(RepoError::Mapping {
                index: 0,
                reason: format!("expected a JSON object, got {}", kind(&other)),
            }),
            Err(e) => Err(RepoError::Mapping {
                index: 0,
                reason: e.to_string(),
            }),
        }
    }

    fn map_at<T: DeserializeOwned>(index: usize, record: RawRecord) -> RepoResult<T> {
        serde_json::from_value(Value::Object(record)).map_err(|e| RepoError::Mapping {
            index,
            reason: e.to_string(),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: String,
        name: String,
        age: u32,
        #[serde(default)]
        tags: Vec<String>,
    }

    fn raw(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_map_preserves_order() {
        let users: Vec<User> = ResultMapper::map(vec![
            raw(json!({"id": "2", "name": "Lu", "age": 30})),
            raw(json!({"id": "1", "name": "Zhao", "age": 25, "extra": true})),
        ])
        .unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, "2");
        assert_eq!(users[1].name, "Zhao");
        assert!(users[1].tags.is_empty());
    }

    #[test]
    fn test_map_error_names_index() {
        let err = ResultMapper::map::<User>(vec![
            raw(json!({"id": "1", "name": "Lu", "age": 30})),
            raw(json!({"id": "2", "name": "Zhao", "age": "old"})),
        ])
        .unwrap_err();

        match err {
            RepoError::Mapping { index, .. } => assert_eq!(index, 1),
            other => panic!("expected mapping error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_into_is_all_or_nothing() {
        let mut out = vec![User {
            id: "0".into(),
            name: "Existing".into(),
            age: 1,
            tags: vec![],
        }];

        let result = ResultMapper::map_into(
            vec![
                raw(json!({"id": "1", "name": "Lu", "age": 30})),
                raw(json!({"id": "2"})),
            ],
            &mut out,
        );

        assert!(result.is_err());
        assert_eq!(out.len(), 1);

        ResultMapper::map_into(vec![raw(json!({"id": "1", "name": "Lu", "age": 30}))], &mut out).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_to_record() {
        let user = User {
            id: "1".into(),
            name: "Lu".into(),
            age: 30,
            tags: vec!["a".into()],
        };
        let record = ResultMapper::to_record(&user).unwrap();
        assert_eq!(record.get("age"), Some(&json!(30)));

        let err = ResultMapper::to_record(&vec![1, 2]).unwrap_err();
        assert!(err.to_string().contains("array"));
    }
}
