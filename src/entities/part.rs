//! Part entity type - Engineering parts keyed by their part number

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use ulid::Ulid;

use crate::core::identity::{parse_part_number, PartIdentifier};

/// Part lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PartStatus {
    #[default]
    Active,
    Obsolete,
    Pending,
}

impl PartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartStatus::Active => "active",
            PartStatus::Obsolete => "obsolete",
            PartStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PartStatus::Active),
            "obsolete" => Ok(PartStatus::Obsolete),
            "pending" => Ok(PartStatus::Pending),
            _ => Err(format!(
                "Invalid status: {}. Use active, obsolete, or pending",
                s
            )),
        }
    }
}

/// A Part entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Internal unique identifier
    pub id: Ulid,

    /// Canonical part number (primary key, immutable)
    pub part_number: String,

    /// Short name
    pub name: String,

    /// Description
    pub description: String,

    /// Four-digit category code (category id + subcategory id)
    pub category: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: PartStatus,

    /// Revision letter
    pub revision: String,

    /// Name of this variant within its family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,

    /// Manufacturer directory id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,

    /// Manufacturer's own part number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_part_number: Option<String>,

    /// Legacy Fellten part number, if this part replaces one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fellten_part_number: Option<String>,

    /// Specification fields (voltage, capacity, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Build an active part from a draft and an already allocated identifier
    pub fn from_draft(draft: &PartDraft, identifier: &PartIdentifier) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            part_number: identifier.to_string(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            status: PartStatus::Active,
            revision: identifier.revision.to_string(),
            variant_name: draft.variant_name.clone(),
            manufacturer_id: draft.manufacturer_id.clone(),
            manufacturer_part_number: draft.manufacturer_part_number.clone(),
            fellten_part_number: draft.fellten_part_number.clone(),
            metadata: draft.metadata.clone(),
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode this part's number
    pub fn identifier(&self) -> Option<PartIdentifier> {
        parse_part_number(&self.part_number)
    }

    /// Is this part obsolete?
    pub fn is_obsolete(&self) -> bool {
        self.status == PartStatus::Obsolete
    }
}

/// Input for creating a new part
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDraft {
    pub name: String,

    pub description: String,

    /// Four-digit category code
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_part_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fellten_part_number: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PartDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    /// Check the fields required to create a part
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingName);
        }
        if self.description.trim().is_empty() {
            return Err(DraftError::MissingDescription);
        }
        let digits = self.category.chars().take(4).filter(char::is_ascii_digit).count();
        if digits < 4 {
            return Err(DraftError::InvalidCategory(self.category.clone()));
        }
        Ok(())
    }

    /// Category id and subcategory id, taken from the first four characters
    /// of the category code
    pub fn category_ids(&self) -> (String, String) {
        let chars: Vec<char> = self.category.chars().collect();
        let category_id: String = chars.iter().take(2).collect();
        let subcategory_id: String = chars.iter().skip(2).take(2).collect();
        (category_id, subcategory_id)
    }
}

/// Errors from draft validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("name is required")]
    MissingName,

    #[error("description is required")]
    MissingDescription,

    #[error("category is required (expected a four-digit code such as 0401, got '{0}')")]
    InvalidCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PartDraft {
        PartDraft::new("Brake Kit", "Front Caliper Assembly", "0401")
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut d = draft();
        d.name = "  ".to_string();
        assert_eq!(d.validate(), Err(DraftError::MissingName));

        let mut d = draft();
        d.description.clear();
        assert_eq!(d.validate(), Err(DraftError::MissingDescription));

        let mut d = draft();
        d.category = "04".to_string();
        assert!(matches!(d.validate(), Err(DraftError::InvalidCategory(_))));
    }

    #[test]
    fn test_draft_rejects_non_numeric_category() {
        for code in ["ab-cd", "04a1", "０４０１"] {
            let mut d = draft();
            d.category = code.to_string();
            assert_eq!(d.validate(), Err(DraftError::InvalidCategory(code.to_string())));
        }

        let mut d = draft();
        d.category = "0401-extra".to_string();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_category_ids() {
        assert_eq!(
            draft().category_ids(),
            ("04".to_string(), "01".to_string())
        );
    }

    #[test]
    fn test_part_from_draft() {
        let id = PartIdentifier::new("04", "01", 3);
        let part = Part::from_draft(&draft(), &id);
        assert_eq!(part.part_number, "0401-000003-00-A");
        assert_eq!(part.revision, "A");
        assert_eq!(part.status, PartStatus::Active);
        assert_eq!(part.identifier(), Some(id));
    }

    #[test]
    fn test_part_roundtrip_yaml() {
        let mut d = draft();
        d.metadata.insert("voltage".to_string(), "12V".to_string());
        let part = Part::from_draft(&d, &PartIdentifier::new("04", "01", 1));

        let yaml = serde_yml::to_string(&part).unwrap();
        assert!(yaml.contains("0401-000001-00-A"));
        assert!(yaml.contains("status: active"));
        assert!(!yaml.contains("variant_name"));

        let parsed: Part = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, part);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Obsolete".parse::<PartStatus>(), Ok(PartStatus::Obsolete));
        assert!("retired".parse::<PartStatus>().is_err());
        assert_eq!(PartStatus::Pending.to_string(), "pending");
    }
}
