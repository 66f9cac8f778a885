//! Part catalog: the category tree and per-subcategory metadata fields
//!
//! A default catalog ships inside the binary. A project can replace it by
//! placing its own `catalog.yaml` in the `.plm/` directory.

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::project::Project;

#[derive(Embed)]
#[folder = "data/"]
struct EmbeddedData;

const CATALOG_FILE: &str = "catalog.yaml";

/// Subcategory id used for categories that have no subcategories
pub const NO_SUBCATEGORY: &str = "00";

/// A category or subcategory node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Two-digit id
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcategories: Vec<Category>,
}

impl Category {
    pub fn subcategory(&self, id: &str) -> Option<&Category> {
        self.subcategories.iter().find(|s| s.id == id)
    }
}

/// Kind of value a metadata field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Select,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
            FieldType::Select => write!(f, "select"),
        }
    }
}

/// A metadata field expected on parts of one subcategory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub key: String,

    pub label: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Allowed values for select fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Default unit for number fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_options: Vec<String>,
}

/// Category tree plus metadata field definitions keyed by category code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub fields: BTreeMap<String, Vec<MetadataField>>,
}

impl Catalog {
    /// The catalog embedded in the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        let file = EmbeddedData::get(CATALOG_FILE).ok_or(CatalogError::MissingBuiltin)?;
        let contents =
            std::str::from_utf8(&file.data).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_yaml(contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        serde_yml::from_str(contents).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// The project's catalog override if it has one, the builtin otherwise
    pub fn load(project: Option<&Project>) -> Result<Self, CatalogError> {
        if let Some(project) = project {
            let path = project.catalog_path();
            if path.is_file() {
                tracing::debug!(path = %path.display(), "using project catalog");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| CatalogError::IoError(e.to_string()))?;
                return Self::from_yaml(&contents);
            }
        }
        Self::builtin()
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Display name: `"Category - Subcategory"`, the bare category name when
    /// the subcategory is unknown, `None` when the category is unknown
    pub fn category_name(&self, category_id: &str, subcategory_id: &str) -> Option<String> {
        let category = self.category(category_id)?;
        Some(match category.subcategory(subcategory_id) {
            Some(sub) => format!("{} - {}", category.name, sub.name),
            None => category.name.clone(),
        })
    }

    /// [`category_name`](Self::category_name) for a four-digit category code
    pub fn name_for_code(&self, code: &str) -> Option<String> {
        let (category_id, subcategory_id) = split_code(code)?;
        self.category_name(category_id, subcategory_id)
    }

    /// Every selectable category code with its display name, in catalog order
    pub fn codes(&self) -> Vec<(String, String)> {
        let mut codes = Vec::new();
        for category in &self.categories {
            if category.subcategories.is_empty() {
                codes.push((format!("{}{}", category.id, NO_SUBCATEGORY), category.name.clone()));
            }
            for sub in &category.subcategories {
                codes.push((
                    format!("{}{}", category.id, sub.id),
                    format!("{} - {}", category.name, sub.name),
                ));
            }
        }
        codes
    }

    /// Whether the first four characters of `code` name a selectable category
    pub fn is_known_code(&self, code: &str) -> bool {
        let Some((category_id, subcategory_id)) = split_code(code) else {
            return false;
        };
        self.category(category_id).is_some_and(|category| {
            if category.subcategories.is_empty() {
                subcategory_id == NO_SUBCATEGORY
            } else {
                category.subcategory(subcategory_id).is_some()
            }
        })
    }

    /// Metadata fields defined for a category code (empty when none)
    pub fn fields_for(&self, code: &str) -> &[MetadataField] {
        self.fields.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Required fields that are absent or blank in `metadata`
    pub fn missing_required_fields(
        &self,
        code: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Vec<&MetadataField> {
        self.fields_for(code)
            .iter()
            .filter(|f| f.required)
            .filter(|f| metadata.get(&f.key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }
}

fn split_code(code: &str) -> Option<(&str, &str)> {
    if code.len() < 4 || !code.is_char_boundary(2) || !code.is_char_boundary(4) {
        return None;
    }
    Some((&code[..2], &code[2..4]))
}

/// Errors from loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("builtin catalog is missing from the binary")]
    MissingBuiltin,

    #[error("invalid catalog: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.categories.len(), 9);
        assert_eq!(catalog.category("03").unwrap().name, "VCU");
        assert_eq!(catalog.fields_for("0401").len(), 3);
    }

    #[test]
    fn test_category_name() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.category_name("04", "01").as_deref(),
            Some("ENERGY STORAGE (ESS) - BATTERY MODULES")
        );
        assert_eq!(catalog.category_name("04", "99").as_deref(), Some("ENERGY STORAGE (ESS)"));
        assert_eq!(catalog.category_name("99", "01"), None);
        assert_eq!(catalog.name_for_code("0602").as_deref(), Some("HIGH VOLTAGE (HV) - HVJB"));
        assert_eq!(catalog.name_for_code("06"), None);
    }

    #[test]
    fn test_codes_include_leaf_categories() {
        let codes = Catalog::builtin().unwrap().codes();
        assert_eq!(codes[0], ("0201".to_string(), "SYSTEMS - Vehicle On-Road Kits".to_string()));
        assert!(codes.iter().any(|(code, name)| code == "0300" && name == "VCU"));
        assert!(codes.iter().any(|(code, _)| code == "1003"));
    }

    #[test]
    fn test_known_codes() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.is_known_code("0401"));
        assert!(catalog.is_known_code("0300"));
        assert!(!catalog.is_known_code("0301"));
        assert!(!catalog.is_known_code("0499"));
        assert!(!catalog.is_known_code("9901"));
        assert!(!catalog.is_known_code("ab-cd"));
        assert!(!catalog.is_known_code("04"));
    }

    #[test]
    fn test_field_definitions() {
        let catalog = Catalog::builtin().unwrap();
        let fields = catalog.fields_for("0501");
        assert_eq!(fields[1].key, "torque");
        assert_eq!(fields[1].unit.as_deref(), Some("Nm"));
        assert_eq!(fields[2].field_type, FieldType::Select);
        assert_eq!(fields[2].options, vec!["Air", "Liquid"]);
        assert!(catalog.fields_for("0802").is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let catalog = Catalog::builtin().unwrap();
        let mut metadata = BTreeMap::new();
        metadata.insert("voltage".to_string(), "400".to_string());
        metadata.insert("capacity".to_string(), " ".to_string());

        let missing: Vec<&str> = catalog
            .missing_required_fields("0401", &metadata)
            .iter()
            .map(|f| f.key.as_str())
            .collect();
        assert_eq!(missing, vec!["capacity", "chemistry"]);
        assert!(catalog.missing_required_fields("0701", &metadata).is_empty());
    }

    #[test]
    fn test_project_override() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        assert_eq!(Catalog::load(Some(&project)).unwrap(), Catalog::builtin().unwrap());

        std::fs::write(
            project.catalog_path(),
            "categories:\n  - id: \"11\"\n    name: CHASSIS\n",
        )
        .unwrap();
        let catalog = Catalog::load(Some(&project)).unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert_eq!(catalog.name_for_code("1100").as_deref(), Some("CHASSIS"));
        assert!(catalog.fields.is_empty());
    }

    #[test]
    fn test_invalid_catalog() {
        assert!(matches!(
            Catalog::from_yaml("categories: 12"),
            Err(CatalogError::Parse(_))
        ));
    }
}
