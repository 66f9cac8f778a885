//! Manufacturer entity type and directory

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// A manufacturer referenced by parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: String,

    /// Display name (stored upper case)
    pub name: String,

    /// Short manufacturer code (stored upper case)
    pub code: String,
}

impl Manufacturer {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into().trim().to_uppercase(),
            code: code.into().trim().to_uppercase(),
        }
    }

    /// Manufacturer whose code is derived from its name
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let code = code_from_name(&name);
        Self::new(name, code)
    }
}

/// First letter of each word, upper-cased, at most four characters
/// ("Robert Bosch GmbH" -> "RBG")
pub fn code_from_name(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(4)
        .collect()
}

/// In-memory manufacturer directory with name/code lookup and search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManufacturerDirectory {
    #[serde(default)]
    pub manufacturers: Vec<Manufacturer>,
}

impl ManufacturerDirectory {
    pub fn new(manufacturers: Vec<Manufacturer>) -> Self {
        Self { manufacturers }
    }

    pub fn get(&self, id: &str) -> Option<&Manufacturer> {
        self.manufacturers.iter().find(|m| m.id == id)
    }

    /// Look up by code, case-insensitive
    pub fn by_code(&self, code: &str) -> Option<&Manufacturer> {
        self.manufacturers
            .iter()
            .find(|m| m.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Resolve either an id or a code
    pub fn resolve(&self, id_or_code: &str) -> Option<&Manufacturer> {
        self.get(id_or_code).or_else(|| self.by_code(id_or_code))
    }

    /// Substring search over name and code. Both are stored upper case, so
    /// the upper-cased query matches regardless of how it was typed.
    pub fn search(&self, query: &str) -> Vec<&Manufacturer> {
        let query = query.to_uppercase();
        self.manufacturers
            .iter()
            .filter(|m| m.name.contains(&query) || m.code.contains(&query))
            .collect()
    }

    /// Add a manufacturer; codes must be unique
    pub fn add(&mut self, manufacturer: Manufacturer) -> Result<&Manufacturer, ManufacturerError> {
        if manufacturer.code.is_empty() {
            return Err(ManufacturerError::MissingCode);
        }
        if self.by_code(&manufacturer.code).is_some() {
            return Err(ManufacturerError::DuplicateCode(manufacturer.code));
        }
        self.manufacturers.push(manufacturer);
        Ok(&self.manufacturers[self.manufacturers.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.manufacturers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manufacturers.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ManufacturerError {
    #[error("manufacturer code is required")]
    MissingCode,

    #[error("manufacturer code '{0}' is already in use")]
    DuplicateCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> ManufacturerDirectory {
        let mut dir = ManufacturerDirectory::default();
        dir.add(Manufacturer::new("BOSCH", "bos")).unwrap();
        dir.add(Manufacturer::new("Brembo", "BRE")).unwrap();
        dir
    }

    #[test]
    fn test_code_is_normalized() {
        let dir = directory();
        assert_eq!(dir.by_code("BOS").unwrap().name, "BOSCH");
        assert_eq!(dir.by_code("bre").unwrap().name, "BREMBO");
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut dir = directory();
        let err = dir.add(Manufacturer::new("Bosch GmbH", "BOS")).unwrap_err();
        assert!(matches!(err, ManufacturerError::DuplicateCode(_)));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_search_uppercases_query() {
        let dir = directory();
        let hits = dir.search("bos");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "BOSCH");

        assert_eq!(dir.search("bre").len(), 1);
        let hits = dir.search("rembo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "BRE");
    }

    #[test]
    fn test_code_derived_from_name() {
        assert_eq!(code_from_name("Robert Bosch GmbH"), "RBG");
        assert_eq!(code_from_name("alpha beta gamma delta epsilon"), "ABGD");
        assert_eq!(code_from_name("  "), "");

        let m = Manufacturer::named("Continental automotive");
        assert_eq!(m.name, "CONTINENTAL AUTOMOTIVE");
        assert_eq!(m.code, "CA");
    }

    #[test]
    fn test_resolve_by_id_or_code() {
        let dir = directory();
        let id = dir.by_code("BRE").unwrap().id.clone();
        assert_eq!(dir.resolve(&id).unwrap().code, "BRE");
        assert_eq!(dir.resolve("bos").unwrap().code, "BOS");
        assert!(dir.resolve("nope").is_none());
    }
}
