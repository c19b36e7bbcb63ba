//! Collection naming
//!
//! Entity type names become collection names by snake-casing and
//! pluralizing the last word: `UserProfile` → `user_profiles`,
//! `Category` → `categories`. Results are memoized in a [`NameCache`].

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use convert_case::{Case, Casing};

/// Thread-safe memo of type name → collection name.
///
/// Get-or-compute is idempotent: concurrent misses for the same key compute
/// the same value, so the last write is as good as the first.
#[derive(Debug, Default)]
pub struct NameCache {
    names: RwLock<HashMap<String, String>>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collection name for `type_name`, computing it on a miss
    pub fn collection_name(&self, type_name: &str) -> String {
        if let Some(name) = self
            .names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
        {
            return name.clone();
        }

        let name = collection_name_for(type_name);
        self.names
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), name.clone());
        name
    }

    /// Number of memoized names
    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uncached naming rule
pub fn collection_name_for(type_name: &str) -> String {
    let snake = type_name.trim().to_case(Case::Snake);
    if snake.is_empty() {
        return snake;
    }

    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize(last)),
        None => pluralize(&snake),
    }
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("datum", "data"),
    ("index", "indices"),
];

const UNCOUNTABLE: &[&str] = &["data", "info", "metadata", "news", "series", "species", "equipment"];

/// English plural of one lowercase word
fn pluralize(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }

    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(|c: char| "aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}
