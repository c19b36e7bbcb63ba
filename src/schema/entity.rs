//! Entity descriptors
//!
//! Every repository call is scoped to one entity type. The type describes
//! itself through [`Entity`]; planners only see the object-safe
//! [`EntitySchema`] view.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::naming::NameCache;
use crate::errors::{RepoError, RepoResult};

/// What the planners need to know about a collection
pub trait EntitySchema {
    /// Backend index holding the documents
    fn collection_name(&self) -> &str;

    /// Name of the identifier attribute
    fn identifier_field(&self) -> &str;

    /// Attribute names a cursor may be keyed on
    fn known_attributes(&self) -> &[String];

    fn has_attribute(&self, name: &str) -> bool {
        self.known_attributes().iter().any(|attr| attr == name)
    }
}

/// A typed document stored in one collection
pub trait Entity: Serialize + DeserializeOwned {
    /// Type name the collection name is derived from (e.g. `UserProfile`)
    fn type_name() -> &'static str;

    /// Known attribute names, identifier included
    fn attributes() -> &'static [&'static str];

    fn identifier_field() -> &'static str {
        "id"
    }

    /// Identifier, `None` when not assigned yet
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);
}

/// Runtime descriptor of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    collection: String,
    identifier: String,
    attributes: Vec<String>,
}

impl EntityDescriptor {
    /// Creates a descriptor.
    ///
    /// The collection and identifier must be non-empty, there must be at
    /// least one attribute and the identifier must be one of them.
    pub fn new<I, S>(collection: impl Into<String>, identifier: impl Into<String>, attributes: I) -> RepoResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptor = Self {
            collection: collection.into(),
            identifier: identifier.into(),
            attributes: attributes.into_iter().map(Into::into).collect(),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Descriptor for an [`Entity`] type, naming its collection through `names`
    pub fn of<T: Entity>(names: &NameCache) -> RepoResult<Self> {
        Self::new(
            names.collection_name(T::type_name()),
            T::identifier_field(),
            T::attributes().iter().copied(),
        )
    }

    fn validate(&self) -> RepoResult<()> {
        if self.collection.trim().is_empty() {
            return Err(RepoError::validation("collection name must not be empty"));
        }
        if self.identifier.trim().is_empty() {
            return Err(RepoError::validation(format!(
                "collection '{}' has an empty identifier field",
                self.collection
            )));
        }
        if self.attributes.is_empty() {
            return Err(RepoError::validation(format!(
                "collection '{}' declares no attributes",
                self.collection
            )));
        }
        if !self.attributes.contains(&self.identifier) {
            return Err(RepoError::validation(format!(
                "identifier '{}' is not an attribute of '{}'",
                self.identifier, self.collection
            )));
        }
        Ok(())
    }
}

impl EntitySchema for EntityDescriptor {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn identifier_field(&self) -> &str {
        &self.identifier
    }

    fn known_attributes(&self) -> &[String] {
        &self.attributes
    }
}
