//! Configuration file
//!
//! ```json
//! {
//!   "backend": {"addresses": ["http://127.0.0.1:9200"], "username": "elastic", "password": "..."},
//!   "exact_suffix": "keyword",
//!   "log_level": "info",
//!   "entities": {"user": {"identifier": "id", "attributes": ["id", "name", "age"]}}
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::compiler::{FilterCompiler, DEFAULT_EXACT_SUFFIX};
use crate::schema::{EntityDescriptor, NameCache};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search cluster connection (required)
    pub backend: BackendConfig,

    /// Exact sub-field suffix (optional, default "keyword")
    #[serde(default = "default_exact_suffix")]
    pub exact_suffix: String,

    /// Fallback log filter when RUST_LOG is unset (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Entity name → schema
    #[serde(default)]
    pub entities: BTreeMap<String, EntityConfig>,
}

/// Cluster connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub addresses: Vec<String>,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("addresses", &self.addresses)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One entity's schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Collection name; derived from the entity name when absent
    #[serde(default)]
    pub collection: Option<String>,

    #[serde(default = "default_identifier")]
    pub identifier: String,

    pub attributes: Vec<String>,
}

fn default_exact_suffix() -> String {
    DEFAULT_EXACT_SUFFIX.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_identifier() -> String {
    "id".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.backend.addresses.iter().all(|a| a.trim().is_empty()) {
            return Err(CliError::config_error("backend.addresses is empty"));
        }
        if self.backend.username.is_empty() {
            return Err(CliError::config_error("backend.username is empty"));
        }
        if self.backend.password.is_empty() {
            return Err(CliError::config_error("backend.password is empty"));
        }

        if self.exact_suffix.trim().is_empty() || self.exact_suffix.contains('.') {
            return Err(CliError::config_error(format!(
                "Invalid exact_suffix: '{}'",
                self.exact_suffix
            )));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Must be one of trace, debug, info, warn, error.",
                self.log_level
            )));
        }

        // Entity schemas validate on construction
        let names = NameCache::new();
        for name in self.entities.keys() {
            self.entity(name, &names)?;
        }

        Ok(())
    }

    /// Filter compiler using the configured suffix
    pub fn filter_compiler(&self) -> FilterCompiler {
        FilterCompiler::with_exact_suffix(self.exact_suffix.clone())
    }

    /// Schema of entity `name`
    pub fn entity(&self, name: &str, names: &NameCache) -> CliResult<EntityDescriptor> {
        let entity = self
            .entities
            .get(name)
            .ok_or_else(|| CliError::config_error(format!("Unknown entity: '{}'", name)))?;

        let collection = entity
            .collection
            .clone()
            .unwrap_or_else(|| names.collection_name(name));

        EntityDescriptor::new(collection, entity.identifier.clone(), entity.attributes.iter().cloned())
            .map_err(|e| CliError::config_error(format!("Entity '{}': {}", name, e)))
    }
}
