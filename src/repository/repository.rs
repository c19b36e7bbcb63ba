//! Generic repository
//!
//! One `Repository` serves every entity type. Typed calls resolve the
//! entity's schema through the shared [`NameCache`]; the `*_in` variants
//! take an explicit schema for callers working with runtime descriptors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::backend::{SearchBackend, WriteOutcome};
use crate::compiler::{CursorQueryPlanner, FilterCompiler, PageQueryPlanner};
use crate::errors::{BackendError, RepoError, RepoResult};
use crate::mapper::ResultMapper;
use crate::query::{CursorList, CursorQuery, Page, PageQuery};
use crate::schema::{Entity, EntityDescriptor, EntitySchema, NameCache};

/// Outcome of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Identifier of the written document
    pub upserted_id: String,
    /// `Created` or `Updated`
    pub outcome: WriteOutcome,
}

/// Repository over a [`SearchBackend`]
pub struct Repository<B> {
    backend: B,
    names: Arc<NameCache>,
    filter_compiler: FilterCompiler,
}

impl<B: SearchBackend> Repository<B> {
    /// Repository with its own name cache and the default exact suffix
    pub fn new(backend: B) -> Self {
        Self::with_parts(backend, Arc::new(NameCache::new()), FilterCompiler::new())
    }

    pub fn with_parts(backend: B, names: Arc<NameCache>, filter_compiler: FilterCompiler) -> Self {
        Self {
            backend,
            names,
            filter_compiler,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn names(&self) -> &Arc<NameCache> {
        &self.names
    }

    pub fn filter_compiler(&self) -> &FilterCompiler {
        &self.filter_compiler
    }

    /// Schema of entity type `T`
    pub fn schema<T: Entity>(&self) -> RepoResult<EntityDescriptor> {
        EntityDescriptor::of::<T>(&self.names)
    }

    // ==================
    // Single documents
    // ==================

    /// Stores a new document, assigning an identifier when it has none.
    ///
    /// Fails with a 409 backend status if the identifier is taken.
    pub fn create<T: Entity>(&self, entity: &mut T) -> RepoResult<String> {
        let schema = self.schema::<T>()?;
        let id = ensure_id(entity);

        match self.write_new(&schema, &id, entity)? {
            WriteOutcome::Created => Ok(id),
            _ => Err(BackendError::Status {
                status: 409,
                reason: format!("document {}/{} already exists", schema.collection_name(), id),
            }
            .into()),
        }
    }

    pub fn exists<T: Entity>(&self, id: &str) -> RepoResult<bool> {
        let schema = self.schema::<T>()?;
        require_id(id)?;
        Ok(self.backend.exists(schema.collection_name(), id)?)
    }

    /// Creates the document, or updates it if the identifier is taken.
    ///
    /// Create-if-absent is tried first, so two concurrent upserts of the
    /// same new id cannot both create.
    pub fn upsert<T: Entity>(&self, entity: &mut T) -> RepoResult<ChangeInfo> {
        let schema = self.schema::<T>()?;
        let id = ensure_id(entity);

        let outcome = match self.write_new(&schema, &id, entity)? {
            WriteOutcome::AlreadyExists => {
                let record = ResultMapper::to_record(entity)?;
                match self.backend.update(schema.collection_name(), &id, record)? {
                    WriteOutcome::NotFound => {
                        return Err(RepoError::not_found(schema.collection_name(), id));
                    }
                    _ => WriteOutcome::Updated,
                }
            }
            other => other,
        };

        info!(
            collection = schema.collection_name(),
            id = id.as_str(),
            outcome = outcome.as_str(),
            "upserted document"
        );
        Ok(ChangeInfo {
            upserted_id: id,
            outcome,
        })
    }

    /// Merges `data` into the document with identifier `id`
    pub fn update<T: Entity, D: Serialize>(&self, id: &str, data: &D) -> RepoResult<()> {
        let schema = self.schema::<T>()?;
        require_id(id)?;
        let partial = ResultMapper::to_record(data)?;

        match self.backend.update(schema.collection_name(), id, partial)? {
            WriteOutcome::NotFound => Err(RepoError::not_found(schema.collection_name(), id)),
            _ => {
                info!(collection = schema.collection_name(), id, "updated document");
                Ok(())
            }
        }
    }

    pub fn find_one<T: Entity>(&self, id: &str) -> RepoResult<T> {
        let schema = self.schema::<T>()?;
        require_id(id)?;

        let record = self
            .backend
            .get(schema.collection_name(), id)?
            .ok_or_else(|| RepoError::not_found(schema.collection_name(), id))?;
        ResultMapper::map_one(record)
    }

    pub fn delete<T: Entity>(&self, id: &str) -> RepoResult<()> {
        let schema = self.schema::<T>()?;
        require_id(id)?;

        match self.backend.delete(schema.collection_name(), id)? {
            WriteOutcome::NotFound => Err(RepoError::not_found(schema.collection_name(), id)),
            _ => {
                info!(collection = schema.collection_name(), id, "deleted document");
                Ok(())
            }
        }
    }

    fn write_new<T: Entity>(&self, schema: &EntityDescriptor, id: &str, entity: &T) -> RepoResult<WriteOutcome> {
        let record = ResultMapper::to_record(entity)?;
        let outcome = self.backend.create(schema.collection_name(), id, record)?;
        if outcome == WriteOutcome::Created {
            info!(collection = schema.collection_name(), id, "created document");
        }
        Ok(outcome)
    }

    // ==================
    // Paging
    // ==================

    pub fn page<T: Entity>(&self, query: &PageQuery) -> RepoResult<Page<T>> {
        let schema = self.schema::<T>()?;
        self.page_in(&schema, query)
    }

    /// Offset page against an explicit schema
    pub fn page_in<T: DeserializeOwned>(&self, schema: &dyn EntitySchema, query: &PageQuery) -> RepoResult<Page<T>> {
        let request = PageQueryPlanner::new(&self.filter_compiler).plan(query)?;
        let response = self.backend.search(schema.collection_name(), &request)?;
        let total = response.total;

        let items: Vec<T> = ResultMapper::map(response.documents)?;
        debug!(
            collection = schema.collection_name(),
            total,
            returned = items.len(),
            "page read"
        );

        Ok(Page {
            total,
            page_count: items.len(),
            items,
        })
    }

    pub fn cursor<T: Entity>(&self, query: &CursorQuery) -> RepoResult<CursorList<T>> {
        let schema = self.schema::<T>()?;
        self.cursor_in(&schema, query)
    }

    /// Keyset read against an explicit schema
    pub fn cursor_in<T: DeserializeOwned>(
        &self,
        schema: &dyn EntitySchema,
        query: &CursorQuery,
    ) -> RepoResult<CursorList<T>> {
        let (request, pending) = CursorQueryPlanner::new(&self.filter_compiler).plan(query, schema)?;
        let response = self.backend.search(schema.collection_name(), &request)?;

        let list = pending.assemble::<T>(response)?;
        debug!(
            collection = schema.collection_name(),
            returned = list.extra.size,
            has_more = list.extra.has_more,
            "cursor read"
        );
        Ok(list)
    }
}

/// Returns the entity id, generating one first if it has none
fn ensure_id<T: Entity>(entity: &mut T) -> String {
    match entity.id() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let id = Uuid::new_v4().simple().to_string();
            entity.set_id(id.clone());
            id
        }
    }
}

fn require_id(id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::validation("document id is required"));
    }
    Ok(())
}
