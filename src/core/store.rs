//! Part persistence
//!
//! [`PartStore`] is the storage contract the lifecycle planner relies on:
//! parts keyed by part number with conditional create/update, plus an
//! append-only change log per part number. [`MemoryStore`] keeps everything
//! in process; [`ProjectStore`] keeps one YAML file per part and one JSON
//! lines file per change log inside a project directory.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::lifecycle::ChangeSet;
use crate::core::project::Project;
use crate::entities::changelog::ChangeLogEntry;
use crate::entities::manufacturer::ManufacturerDirectory;
use crate::entities::part::Part;

/// Storage for parts and their change logs
pub trait PartStore {
    fn get_part(&self, part_number: &str) -> Result<Option<Part>, StoreError>;

    /// Every stored part, ordered by part number
    fn all_parts(&self) -> Result<Vec<Part>, StoreError>;

    /// Insert a part; fails if the part number is already taken
    fn create_part(&mut self, part: Part) -> Result<(), StoreError>;

    /// Overwrite a part; fails if no part has this part number
    fn update_part(&mut self, part: Part) -> Result<(), StoreError>;

    /// Remove a part and return it. Its change log is kept.
    fn delete_part(&mut self, part_number: &str) -> Result<Part, StoreError>;

    fn append_change(&mut self, entry: ChangeLogEntry) -> Result<(), StoreError>;

    /// Change log for a part number, newest first
    fn changes_for(&self, part_number: &str) -> Result<Vec<ChangeLogEntry>, StoreError>;

    fn contains(&self, part_number: &str) -> Result<bool, StoreError> {
        Ok(self.get_part(part_number)?.is_some())
    }

    /// Apply a change set: updates, then creates, then log appends.
    ///
    /// Every precondition is checked before the first write, so a stale
    /// change set (a part that vanished, a part number taken in the
    /// meantime) is rejected without partial effects.
    fn apply(&mut self, changes: ChangeSet) -> Result<(), StoreError> {
        for part in &changes.updates {
            if !self.contains(&part.part_number)? {
                return Err(StoreError::NotFound(part.part_number.clone()));
            }
        }
        {
            let mut seen = BTreeSet::new();
            for part in &changes.creates {
                if !seen.insert(part.part_number.as_str()) || self.contains(&part.part_number)? {
                    return Err(StoreError::AlreadyExists(part.part_number.clone()));
                }
            }
        }

        let (updates, creates, entries) = (changes.updates.len(), changes.creates.len(), changes.log.len());
        for part in changes.updates {
            self.update_part(part)?;
        }
        for part in changes.creates {
            self.create_part(part)?;
        }
        for entry in changes.log {
            self.append_change(entry)?;
        }

        tracing::info!(updates, creates, entries, "applied change set");
        Ok(())
    }
}

/// Errors from part storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("part not found: {0}")]
    NotFound(String),

    #[error("part number already exists: {0}")]
    AlreadyExists(String),

    #[error("part number {0:?} cannot name a file in the project")]
    InvalidPartNumber(String),

    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    parts: BTreeMap<String, Part>,
    changes: BTreeMap<String, Vec<ChangeLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with parts, bypassing the existence checks
    pub fn with_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            parts: parts.into_iter().map(|p| (p.part_number.clone(), p)).collect(),
            changes: BTreeMap::new(),
        }
    }
}

impl PartStore for MemoryStore {
    fn get_part(&self, part_number: &str) -> Result<Option<Part>, StoreError> {
        Ok(self.parts.get(part_number).cloned())
    }

    fn all_parts(&self) -> Result<Vec<Part>, StoreError> {
        Ok(self.parts.values().cloned().collect())
    }

    fn create_part(&mut self, part: Part) -> Result<(), StoreError> {
        if self.parts.contains_key(&part.part_number) {
            return Err(StoreError::AlreadyExists(part.part_number));
        }
        self.parts.insert(part.part_number.clone(), part);
        Ok(())
    }

    fn update_part(&mut self, part: Part) -> Result<(), StoreError> {
        match self.parts.get_mut(&part.part_number) {
            Some(slot) => {
                *slot = part;
                Ok(())
            }
            None => Err(StoreError::NotFound(part.part_number)),
        }
    }

    fn delete_part(&mut self, part_number: &str) -> Result<Part, StoreError> {
        self.parts
            .remove(part_number)
            .ok_or_else(|| StoreError::NotFound(part_number.to_string()))
    }

    fn append_change(&mut self, entry: ChangeLogEntry) -> Result<(), StoreError> {
        self.changes.entry(entry.part_number.clone()).or_default().push(entry);
        Ok(())
    }

    fn changes_for(&self, part_number: &str) -> Result<Vec<ChangeLogEntry>, StoreError> {
        Ok(self
            .changes
            .get(part_number)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default())
    }
}

/// File-backed store rooted in a project
#[derive(Debug)]
pub struct ProjectStore {
    project: Project,
}

impl ProjectStore {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// File holding a part, refusing part numbers that would leave `parts/`
    pub fn part_file(&self, part_number: &str) -> Result<PathBuf, StoreError> {
        check_file_stem(part_number)?;
        Ok(self.project.part_path(part_number))
    }

    fn log_file(&self, part_number: &str) -> Result<PathBuf, StoreError> {
        check_file_stem(part_number)?;
        Ok(self.project.changelog_path(part_number))
    }

    fn read_part(path: &Path) -> Result<Part, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::IoError(e.to_string()))?;
        serde_yml::from_str(&contents).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write_part(path: &Path, part: &Part) -> Result<(), StoreError> {
        let yaml = serde_yml::to_string(part).map_err(|e| StoreError::IoError(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| StoreError::IoError(e.to_string()))
    }

    /// Load the manufacturer directory; a missing file is an empty directory
    pub fn manufacturers(&self) -> Result<ManufacturerDirectory, StoreError> {
        let path = self.project.manufacturers_path();
        if !path.exists() {
            return Ok(ManufacturerDirectory::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::IoError(e.to_string()))?;
        serde_yml::from_str(&contents).map_err(|e| StoreError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save_manufacturers(&self, directory: &ManufacturerDirectory) -> Result<(), StoreError> {
        let yaml = serde_yml::to_string(directory).map_err(|e| StoreError::IoError(e.to_string()))?;
        std::fs::write(self.project.manufacturers_path(), yaml).map_err(|e| StoreError::IoError(e.to_string()))
    }
}

fn check_file_stem(part_number: &str) -> Result<(), StoreError> {
    if part_number.is_empty() || part_number.contains(['/', '\\']) || part_number.contains("..") {
        return Err(StoreError::InvalidPartNumber(part_number.to_string()));
    }
    Ok(())
}

impl PartStore for ProjectStore {
    fn get_part(&self, part_number: &str) -> Result<Option<Part>, StoreError> {
        let path = self.part_file(part_number)?;
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_part(&path).map(Some)
    }

    fn all_parts(&self) -> Result<Vec<Part>, StoreError> {
        let mut parts = self
            .project
            .iter_part_files()
            .map(|path| Self::read_part(&path))
            .collect::<Result<Vec<_>, _>>()?;
        parts.sort_by(|a, b| a.part_number.cmp(&b.part_number));
        Ok(parts)
    }

    fn create_part(&mut self, part: Part) -> Result<(), StoreError> {
        let path = self.part_file(&part.part_number)?;
        if path.exists() {
            return Err(StoreError::AlreadyExists(part.part_number));
        }
        Self::write_part(&path, &part)
    }

    fn update_part(&mut self, part: Part) -> Result<(), StoreError> {
        let path = self.part_file(&part.part_number)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(part.part_number));
        }
        Self::write_part(&path, &part)
    }

    fn delete_part(&mut self, part_number: &str) -> Result<Part, StoreError> {
        let path = self.part_file(part_number)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(part_number.to_string()));
        }
        let part = Self::read_part(&path)?;
        std::fs::remove_file(&path).map_err(|e| StoreError::IoError(e.to_string()))?;
        Ok(part)
    }

    fn append_change(&mut self, entry: ChangeLogEntry) -> Result<(), StoreError> {
        let path = self.log_file(&entry.part_number)?;
        let line = serde_json::to_string(&entry).map_err(|e| StoreError::IoError(e.to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::IoError(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| StoreError::IoError(e.to_string()))
    }

    fn changes_for(&self, part_number: &str) -> Result<Vec<ChangeLogEntry>, StoreError> {
        let path = self.log_file(part_number)?;
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| StoreError::IoError(e.to_string()))?;

        let mut entries = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<ChangeLogEntry>(line).map_err(|e| StoreError::Parse {
                    path: path.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.reverse();
        Ok(entries)
    }
}
