//! Change log entries - append-only audit trail per part number

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Kind of change recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Status,
    Revision,
    Variant,
    Note,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Status => write!(f, "status"),
            ChangeType::Revision => write!(f, "revision"),
            ChangeType::Variant => write!(f, "variant"),
            ChangeType::Note => write!(f, "note"),
        }
    }
}

/// Who made a change and why
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub user_initials: String,
    pub comment: String,
}

impl Actor {
    pub fn new(user_initials: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            user_initials: user_initials.into(),
            comment: comment.into(),
        }
    }
}

/// One change log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub id: Ulid,

    /// Part number the entry belongs to
    pub part_number: String,

    #[serde(rename = "type")]
    pub change_type: ChangeType,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,

    #[serde(default)]
    pub comment: String,

    pub user_initials: String,

    pub timestamp: DateTime<Utc>,
}

impl ChangeLogEntry {
    pub fn new(
        part_number: impl Into<String>,
        change_type: ChangeType,
        description: impl Into<String>,
        actor: &Actor,
    ) -> Self {
        Self {
            id: Ulid::new(),
            part_number: part_number.into(),
            change_type,
            description: description.into(),
            old_value: None,
            new_value: None,
            comment: actor.comment.clone(),
            user_initials: actor.user_initials.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Record the value before and after the change
    pub fn with_values(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.old_value = Some(old.into());
        self.new_value = Some(new.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_type_field() {
        let actor = Actor::new("JD", "customer request");
        let entry = ChangeLogEntry::new("0401-000001-00-B", ChangeType::Revision, "New revision created", &actor)
            .with_values("A", "B");

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"revision\""));
        assert!(json.contains("\"old_value\":\"A\""));

        let back: ChangeLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_without_values_omits_them() {
        let entry = ChangeLogEntry::new("0401-000001-01-A", ChangeType::Variant, "New variant created: Long", &Actor::default());
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("old_value"));
        assert!(!json.contains("new_value"));
    }
}
