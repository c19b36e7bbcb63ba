//! In-memory search backend
//!
//! Executes compiled requests against documents held in process. Used by the
//! tests and by `docrepo run`.
//!
//! Matching follows the search engine's behavior closely enough for paging:
//! - exact sub-fields (`name.keyword`) resolve to the base field
//! - array fields match when any element matches
//! - missing or null fields never match a positive clause
//! - phrase match is a case-insensitive substring test
//! - documents missing a sort field sort last in either direction

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::backend::{SearchBackend, WriteOutcome};
use crate::compiler::{
    Clause, RangeBounds, SearchRequest, SearchResponse, SortField, DEFAULT_EXACT_SUFFIX,
};
use crate::errors::BackendError;
use crate::mapper::RawRecord;
use crate::query::{compare_scalars, SortDirection};

type Collection = BTreeMap<String, RawRecord>;

/// Index name → (document id → document). Default order is by id.
#[derive(Debug)]
pub struct MemoryBackend {
    indices: RwLock<BTreeMap<String, Collection>>,
    exact_suffix: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_exact_suffix(DEFAULT_EXACT_SUFFIX)
    }

    /// Backend resolving `<field>.<suffix>` to `<field>`
    pub fn with_exact_suffix(suffix: impl Into<String>) -> Self {
        Self {
            indices: RwLock::new(BTreeMap::new()),
            exact_suffix: suffix.into(),
        }
    }

    /// Creates an empty index. No-op if it exists.
    pub fn create_index(&self, index: &str) {
        self.write().entry(index.to_string()).or_default();
    }

    /// Bulk-loads documents keyed by `id_field`. Documents without a string
    /// or numeric id are skipped; the number loaded is returned.
    pub fn load(&self, index: &str, id_field: &str, documents: Vec<RawRecord>) -> usize {
        let mut indices = self.write();
        let collection = indices.entry(index.to_string()).or_default();
        let mut loaded = 0;
        for document in documents {
            let id = match document.get(id_field) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => continue,
            };
            collection.insert(id, document);
            loaded += 1;
        }
        loaded
    }

    /// Number of documents in `index`, `None` if it does not exist
    pub fn count(&self, index: &str) -> Option<usize> {
        self.read().get(index).map(BTreeMap::len)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Collection>> {
        self.indices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Collection>> {
        self.indices.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================
    // Matching
    // ==================

    fn matches(&self, document: &RawRecord, clause: &Clause) -> bool {
        match clause {
            Clause::ExactMatch { field, value } => self
                .resolve(document, field)
                .map_or(false, |actual| any_element(actual, |v| values_equal(v, value))),
            Clause::Range { field, bounds } => self
                .resolve(document, field)
                .map_or(false, |actual| any_element(actual, |v| within(v, bounds))),
            Clause::In { field, values } => self.resolve(document, field).map_or(false, |actual| {
                any_element(actual, |v| values.iter().any(|candidate| values_equal(v, candidate)))
            }),
            Clause::PhraseMatch { field, value } => {
                let phrase = match value {
                    Value::String(s) => s.to_lowercase(),
                    other => other.to_string().to_lowercase(),
                };
                self.resolve(document, field).map_or(false, |actual| {
                    any_element(actual, |v| match v {
                        Value::String(s) => s.to_lowercase().contains(&phrase),
                        _ => false,
                    })
                })
            }
            Clause::Not(inner) => !inner.iter().any(|c| self.matches(document, c)),
            Clause::And(inner) => inner.iter().all(|c| self.matches(document, c)),
        }
    }

    /// Looks up a field, stripping the exact suffix and walking dotted paths
    fn resolve<'d>(&self, document: &'d RawRecord, field: &str) -> Option<&'d Value> {
        let suffix = format!(".{}", self.exact_suffix);
        let base = field.strip_suffix(suffix.as_str()).unwrap_or(field);

        let value = match document.get(base) {
            Some(v) => Some(v),
            None => {
                let mut parts = base.split('.');
                let first = document.get(parts.next()?)?;
                parts.try_fold(first, |current, part| current.get(part))
            }
        };
        value.filter(|v| !v.is_null())
    }

    // ==================
    // Sorting
    // ==================

    fn sort(&self, documents: &mut [&RawRecord], sort: &[SortField]) {
        documents.sort_by(|a, b| {
            for key in sort {
                let ordering = compare_for_sort(
                    self.resolve(a, &key.field),
                    self.resolve(b, &key.field),
                    key,
                );
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

fn any_element(actual: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(&predicate),
        other => predicate(other),
    }
}

/// Equality without type coercion; numbers compare by value
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match compare_scalars(actual, expected) {
        Some(ordering) => ordering == Ordering::Equal,
        None => actual == expected,
    }
}

fn within(actual: &Value, bounds: &RangeBounds) -> bool {
    let check = |bound: &Option<Value>, accept: fn(Ordering) -> bool| match bound {
        None => true,
        Some(b) => compare_scalars(actual, b).map_or(false, accept),
    };

    check(&bounds.gt, |o| o == Ordering::Greater)
        && check(&bounds.gte, |o| o != Ordering::Less)
        && check(&bounds.lt, |o| o == Ordering::Less)
        && check(&bounds.lte, |o| o != Ordering::Greater)
}

/// Ordering rules:
/// - missing values last, whatever the direction
/// - bool < number < string, then natural order within a type
/// - `ignore_case` compares strings lowercased
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>, key: &SortField) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let type_order = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    let ordering = match (a, b) {
        (Value::String(x), Value::String(y)) if key.ignore_case => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => compare_scalars(a, b).unwrap_or_else(|| type_order(a).cmp(&type_order(b))),
    };

    match key.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

impl SearchBackend for MemoryBackend {
    fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse, BackendError> {
        let indices = self.read();
        let collection = indices
            .get(index)
            .ok_or_else(|| BackendError::IndexNotFound(index.to_string()))?;

        let mut hits: Vec<&RawRecord> = collection
            .values()
            .filter(|doc| request.query.clauses.iter().all(|c| self.matches(doc, c)))
            .collect();

        if !request.sort.is_empty() {
            self.sort(&mut hits, &request.sort);
        }

        let total = hits.len() as u64;
        let from = usize::try_from(request.from.unwrap_or(0)).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size).unwrap_or(usize::MAX);

        let documents = hits.into_iter().skip(from).take(size).cloned().collect();
        Ok(SearchResponse::new(documents, total))
    }

    fn get(&self, index: &str, id: &str) -> Result<Option<RawRecord>, BackendError> {
        let indices = self.read();
        let collection = indices
            .get(index)
            .ok_or_else(|| BackendError::IndexNotFound(index.to_string()))?;
        Ok(collection.get(id).cloned())
    }

    fn create(&self, index: &str, id: &str, document: RawRecord) -> Result<WriteOutcome, BackendError> {
        let mut indices = self.write();
        let collection = indices.entry(index.to_string()).or_default();
        if collection.contains_key(id) {
            return Ok(WriteOutcome::AlreadyExists);
        }
        collection.insert(id.to_string(), document);
        Ok(WriteOutcome::Created)
    }

    fn update(&self, index: &str, id: &str, partial: RawRecord) -> Result<WriteOutcome, BackendError> {
        let mut indices = self.write();
        let collection = indices
            .get_mut(index)
            .ok_or_else(|| BackendError::IndexNotFound(index.to_string()))?;

        match collection.get_mut(id) {
            Some(document) => {
                document.extend(partial);
                Ok(WriteOutcome::Updated)
            }
            None => Ok(WriteOutcome::NotFound),
        }
    }

    fn delete(&self, index: &str, id: &str) -> Result<WriteOutcome, BackendError> {
        let mut indices = self.write();
        let collection = indices
            .get_mut(index)
            .ok_or_else(|| BackendError::IndexNotFound(index.to_string()))?;

        Ok(match collection.remove(id) {
            Some(_) => WriteOutcome::Deleted,
            None => WriteOutcome::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Conjunction, FilterCompiler};
    use crate::query::FilterMap;
    use serde_json::json;

    fn doc(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.load(
            "users",
            "id",
            vec![
                doc(json!({"id": "1", "name": "Zhao", "age": 22, "tags": ["admin"]})),
                doc(json!({"id": "2", "name": "lu", "age": 30, "bio": "Quick brown fox"})),
                doc(json!({"id": "3", "name": "Qian", "age": 41, "address": {"city": "Hangzhou"}})),
                doc(json!({"id": "4", "name": "Sun"})),
            ],
        );
        backend
    }

    fn search(backend: &MemoryBackend, filters: Value, sort: Vec<SortField>) -> Vec<String> {
        let filters: FilterMap = serde_json::from_value(filters).unwrap();
        let query = FilterCompiler::new().compile(&filters);
        let response = backend
            .search("users", &SearchRequest::keyset(query, 100, sort))
            .unwrap();
        response
            .documents
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_exact_match_strips_suffix() {
        assert_eq!(search(&backend(), json!({"name": "Zhao"}), vec![]), vec!["1"]);
        assert_eq!(search(&backend(), json!({"age": 30}), vec![]), vec!["2"]);
    }

    #[test]
    fn test_range_and_missing_field() {
        let ids = search(&backend(), json!({"age": {"GT": 22, "LTE": 41}}), vec![]);
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_not_matches_missing_field() {
        let ids = search(&backend(), json!({"age": {"NE": 30}}), vec![]);
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_in_and_array_fields() {
        assert_eq!(search(&backend(), json!({"tags": {"IN": ["admin", "ops"]}}), vec![]), vec!["1"]);
        assert_eq!(search(&backend(), json!({"name": {"IN": ["Sun", "Qian"]}}), vec![]), vec!["3", "4"]);
    }

    #[test]
    fn test_phrase_match_case_insensitive() {
        assert_eq!(search(&backend(), json!({"bio": {"LIKE": "brown FOX"}}), vec![]), vec!["2"]);
    }

    #[test]
    fn test_nested_path() {
        assert_eq!(search(&backend(), json!({"address.city": "Hangzhou"}), vec![]), vec!["3"]);
    }

    #[test]
    fn test_sort_missing_last() {
        let ids = search(&backend(), json!({}), vec![SortField::new("age", SortDirection::Desc)]);
        assert_eq!(ids, vec!["3", "2", "1", "4"]);

        let ids = search(&backend(), json!({}), vec![SortField::new("age", SortDirection::Asc)]);
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_sort_ignore_case() {
        let mut key = SortField::new("name", SortDirection::Asc);
        assert_eq!(search(&backend(), json!({}), vec![key.clone()]), vec!["3", "4", "1", "2"]);

        key.ignore_case = true;
        assert_eq!(search(&backend(), json!({}), vec![key]), vec!["2", "3", "4", "1"]);
    }

    #[test]
    fn test_offset_and_total() {
        let backend = backend();
        let request = SearchRequest::offset(
            Conjunction::default(),
            1,
            2,
            vec![SortField::new("id", SortDirection::Asc)],
        );
        let response = backend.search("users", &request).unwrap();

        assert_eq!(response.total, 4);
        assert_eq!(response.documents.len(), 2);
        assert_eq!(response.documents[0]["id"], json!("2"));
    }

    #[test]
    fn test_missing_index() {
        let err = MemoryBackend::new()
            .search("nope", &SearchRequest::keyset(Conjunction::default(), 1, vec![]))
            .unwrap_err();
        assert_eq!(err, BackendError::IndexNotFound("nope".into()));
    }

    #[test]
    fn test_single_document_operations() {
        let backend = backend();

        assert!(backend.exists("users", "1").unwrap());
        assert_eq!(
            backend.create("users", "1", doc(json!({"id": "1"}))).unwrap(),
            WriteOutcome::AlreadyExists
        );
        assert_eq!(
            backend.create("users", "9", doc(json!({"id": "9", "name": "Li"}))).unwrap(),
            WriteOutcome::Created
        );
        assert_eq!(
            backend.update("users", "9", doc(json!({"age": 50}))).unwrap(),
            WriteOutcome::Updated
        );
        assert_eq!(backend.get("users", "9").unwrap().unwrap()["age"], json!(50));
        assert_eq!(backend.delete("users", "9").unwrap(), WriteOutcome::Deleted);
        assert_eq!(backend.delete("users", "9").unwrap(), WriteOutcome::NotFound);
        assert_eq!(
            backend.update("users", "9", doc(json!({}))).unwrap(),
            WriteOutcome::NotFound
        );
        assert_eq!(backend.count("users"), Some(4));
    }
}
