//! Sort specifications

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification. Order within a list is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Property to sort by
    pub property: String,
    /// Sort direction
    #[serde(default, alias = "type")]
    pub direction: SortDirection,
    /// Compare text case-insensitively
    #[serde(default)]
    pub ignore_case: bool,
}

impl SortSpec {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Asc,
            ignore_case: false,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Desc,
            ignore_case: false,
        }
    }

    /// Sets case-insensitive comparison
    pub fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_spec() {
        let asc = SortSpec::asc("created_at");
        assert_eq!(asc.direction, SortDirection::Asc);
        assert_eq!(asc.property, "created_at");
        assert!(!asc.ignore_case);
    }

    #[test]
    fn test_deserialize_legacy_type_field() {
        let spec: SortSpec =
            serde_json::from_value(json!({"property": "name", "type": "desc"})).unwrap();
        assert_eq!(spec, SortSpec::desc("name"));

        let spec: SortSpec = serde_json::from_value(json!({"property": "age"})).unwrap();
        assert_eq!(spec.direction, SortDirection::Asc);
    }
}
