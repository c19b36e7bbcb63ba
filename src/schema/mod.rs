//! Entity schema subsystem for docrepo
//!
//! Entities describe themselves explicitly; nothing is discovered by
//! runtime inspection.
//!
//! # Components
//!
//! - [`EntitySchema`]: collection, identifier and attribute names as seen by planners
//! - [`Entity`]: typed documents that know their identifier
//! - [`EntityDescriptor`]: validated runtime schema, built from an entity or from config
//! - [`NameCache`]: memoized type name → collection name

mod entity;
mod naming;

pub use entity::{Entity, EntityDescriptor, EntitySchema};
pub use naming::{collection_name_for, NameCache};
