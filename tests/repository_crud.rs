//! Repository Tests
//!
//! Single-document glue and offset paging through the in-memory backend.
//! Failures must surface to the caller; nothing is retried or turned into
//! an empty result.

use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::json;

use docrepo::compiler::FilterCompiler;
use docrepo::query::{FilterOperator, PageQuery, SortSpec};
use docrepo::repository::{MemoryBackend, Repository, WriteOutcome};
use docrepo::schema::{Entity, EntitySchema, NameCache};
use docrepo::RepoError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserAccount {
    #[serde(default)]
    id: String,
    name: String,
    age: u32,
    #[serde(default)]
    ctime: i64,
}

impl Entity for UserAccount {
    fn type_name() -> &'static str {
        "UserAccount"
    }

    fn attributes() -> &'static [&'static str] {
        &["id", "name", "age", "ctime"]
    }

    fn id(&self) -> Option<&str> {
        Some(self.id.as_str()).filter(|id| !id.is_empty())
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

fn user(id: &str, name: &str, age: u32) -> UserAccount {
    UserAccount {
        id: id.into(),
        name: name.into(),
        age,
        ctime: 0,
    }
}

fn seeded_repo() -> Repository<MemoryBackend> {
    let repo = Repository::new(MemoryBackend::new());
    for (i, (name, age)) in [("Zhao", 20), ("Qian", 25), ("Sun", 31), ("Li", 40), ("Lu", 35)]
        .into_iter()
        .enumerate()
    {
        repo.create(&mut user(&format!("u{}", i + 1), name, age)).unwrap();
    }
    repo
}

// =============================================================================
// SINGLE DOCUMENTS
// =============================================================================

#[test]
fn test_collection_derived_from_type_name() {
    let repo = Repository::new(MemoryBackend::new());
    let schema = repo.schema::<UserAccount>().unwrap();

    assert_eq!(schema.collection_name(), "user_accounts");
    assert_eq!(schema.identifier_field(), "id");
}

#[test]
fn test_create_find_update_delete() {
    let repo = Repository::new(MemoryBackend::new());
    let mut u = user("", "Zhao", 20);

    let id = repo.create(&mut u).unwrap();
    assert!(repo.exists::<UserAccount>(&id).unwrap());

    repo.update::<UserAccount, _>(&id, &json!({"age": 21})).unwrap();
    assert_eq!(repo.find_one::<UserAccount>(&id).unwrap().age, 21);

    repo.delete::<UserAccount>(&id).unwrap();
    assert!(matches!(
        repo.find_one::<UserAccount>(&id),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn test_upsert_round() {
    let repo = Repository::new(MemoryBackend::new());

    let first = repo.upsert(&mut user("u1", "Zhao", 20)).unwrap();
    let second = repo.upsert(&mut user("u1", "Zhao", 22)).unwrap();

    assert_eq!(first.outcome, WriteOutcome::Created);
    assert_eq!(second.outcome, WriteOutcome::Updated);
    assert_eq!(repo.find_one::<UserAccount>("u1").unwrap().age, 22);
}

#[test]
fn test_concurrent_upserts_create_once() {
    let repo = Arc::new(Repository::new(MemoryBackend::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            thread::spawn(move || repo.upsert(&mut user("shared", "Racer", i)).unwrap().outcome)
        })
        .collect();

    let outcomes: Vec<WriteOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let created = outcomes.iter().filter(|o| **o == WriteOutcome::Created).count();
    assert_eq!(created, 1);
    assert_eq!(repo.backend().count("user_accounts"), Some(1));
}

// =============================================================================
// OFFSET PAGING
// =============================================================================

#[test]
fn test_page_with_filters_and_sort() {
    let repo = seeded_repo();
    let query = PageQuery::new(1, 2)
        .filter_op("age", FilterOperator::Gt, 22)
        .with_sort(SortSpec::desc("age"));

    let page = repo.page::<UserAccount>(&query).unwrap();

    assert_eq!(page.total, 4);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.items[0].name, "Li");
    assert_eq!(page.items[1].name, "Lu");
}

#[test]
fn test_page_past_end() {
    let repo = seeded_repo();

    let page = repo.page::<UserAccount>(&PageQuery::new(9, 10)).unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.page_count, 0);
    assert!(page.items.is_empty());
}

#[test]
fn test_page_exact_text_and_phrase() {
    let repo = seeded_repo();

    let exact = repo.page::<UserAccount>(&PageQuery::new(1, 10).filter_eq("name", "Lu")).unwrap();
    assert_eq!(exact.total, 1);

    let phrase = repo
        .page::<UserAccount>(&PageQuery::new(1, 10).filter_op("name", FilterOperator::Like, "l"))
        .unwrap();
    assert_eq!(phrase.total, 2);
}

#[test]
fn test_page_validation() {
    let repo = seeded_repo();
    assert_eq!(
        repo.page::<UserAccount>(&PageQuery::new(0, 10)).unwrap_err().code(),
        "REPO_VALIDATION"
    );
    assert_eq!(
        repo.page::<UserAccount>(&PageQuery::new(1, 0)).unwrap_err().code(),
        "REPO_VALIDATION"
    );
}

#[test]
fn test_shared_name_cache_and_custom_suffix() {
    let names = Arc::new(NameCache::new());
    let repo = Repository::with_parts(
        MemoryBackend::with_exact_suffix("exact"),
        Arc::clone(&names),
        FilterCompiler::with_exact_suffix("exact"),
    );
    repo.create(&mut user("u1", "Lu", 35)).unwrap();

    let page = repo.page::<UserAccount>(&PageQuery::new(1, 10).filter_eq("name", "Lu")).unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(names.collection_name("UserAccount"), "user_accounts");
    assert_eq!(names.len(), 1);
}
