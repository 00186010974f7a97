use crate::catalog::CatalogKind;

/// Addon manifest served at `/manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub catalogs: Vec<CatalogDefinition>,
    pub resources: Vec<ManifestResource>,
    pub types: Vec<CatalogKind>,
    pub behavior_hints: BehaviorHints,
    pub config: Vec<ConfigField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ManifestResource {
    pub name: String,
    pub types: Vec<CatalogKind>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

/// A field of the install-time configuration form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigField {
    pub key: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub field_type: String,
    pub title: String,
    pub required: bool,
}

impl ConfigField {
    pub fn text(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            field_type: "text".to_string(),
            title: title.to_string(),
            required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CatalogDefinition {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: CatalogKind,
    pub id: String,
    pub name: String,
    pub extra: Vec<CatalogExtra>,
    pub extra_supported: Vec<String>,
}

impl CatalogDefinition {
    pub fn new(kind: CatalogKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        let extra = CatalogExtra::standard();
        let extra_supported = extra.iter().map(|e| e.name.clone()).collect();
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            extra,
            extra_supported,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CatalogExtra {
    pub name: String,
    pub is_required: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Vec::is_empty")
    )]
    pub options: Vec<String>,
}

impl CatalogExtra {
    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_required: false,
            options: Vec::new(),
        }
    }

    /// `search`, `skip`, `limit` and `sort`, the extras every library
    /// catalog accepts.
    pub fn standard() -> Vec<Self> {
        let mut sort = Self::optional("sort");
        sort.options = vec!["name".to_string(), "lastAdded".to_string()];
        vec![
            Self::optional("search"),
            Self::optional("skip"),
            Self::optional("limit"),
            sort,
        ]
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_definition_serializes_extras() {
        let def = CatalogDefinition::new(CatalogKind::Series, "lib1::lastAdded", "TV (Last Added)");
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["type"], "series");
        assert_eq!(value["extraSupported"], json!(["search", "skip", "limit", "sort"]));
        assert_eq!(value["extra"][3]["options"], json!(["name", "lastAdded"]));
        assert!(value["extra"][0].get("options").is_none());
    }
}
