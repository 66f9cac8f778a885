//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".plm";

/// File suffix of stored parts
pub const PART_FILE_SUFFIX: &str = ".plm.yaml";

/// Represents a PLM project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .plm/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::create_structure(root)
    }

    /// Initialize even if .plm/ exists; existing parts and config are kept
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create_structure(root)
    }

    fn create_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };

        for dir in [project.plm_dir(), project.parts_dir(), project.changelog_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        let config_path = project.plm_dir().join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# PLM Project Configuration

# Author recorded on changes (can be overridden by global config)
# author: ""

# Initials recorded in the change log (default: derived from author)
# initials: ""

# Editor to use for `plm part edit` (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, md, id)
# default_format: auto

# Number of suggestions returned by `plm suggest`
# suggestion_limit: 5

# Minimum similarity reported as a potential duplicate
# duplicate_threshold: 0.8
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .plm configuration directory
    pub fn plm_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn parts_dir(&self) -> PathBuf {
        self.root.join("parts")
    }

    pub fn changelog_dir(&self) -> PathBuf {
        self.root.join("changelog")
    }

    /// Path of the file holding a part
    pub fn part_path(&self, part_number: &str) -> PathBuf {
        self.parts_dir().join(format!("{}{}", part_number, PART_FILE_SUFFIX))
    }

    /// Path of the JSON lines change log for a part number
    pub fn changelog_path(&self, part_number: &str) -> PathBuf {
        self.changelog_dir().join(format!("{}.jsonl", part_number))
    }

    pub fn manufacturers_path(&self) -> PathBuf {
        self.root.join("manufacturers.yaml")
    }

    /// Project catalog override, if one is used
    pub fn catalog_path(&self) -> PathBuf {
        self.plm_dir().join("catalog.yaml")
    }

    /// Iterate all stored part files
    pub fn iter_part_files(&self) -> impl Iterator<Item = PathBuf> {
        walkdir::WalkDir::new(self.parts_dir())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(PART_FILE_SUFFIX))
            .map(|e| e.path().to_path_buf())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a PLM project (searched from {searched_from:?}). Run 'plm init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("PLM project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.plm_dir().exists());
        assert!(project.plm_dir().join("config.yaml").exists());
        assert!(project.parts_dir().is_dir());
        assert!(project.changelog_dir().is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_keeps_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let config = project.plm_dir().join("config.yaml");
        std::fs::write(&config, "author: Jane\n").unwrap();

        Project::init_force(tmp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&config).unwrap(), "author: Jane\n");
    }

    #[test]
    fn test_project_discover_finds_plm_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_plm_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_part_paths() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let path = project.part_path("0401-000001-00-A");
        assert!(path.ends_with("parts/0401-000001-00-A.plm.yaml"));

        std::fs::write(&path, "x").unwrap();
        std::fs::write(project.parts_dir().join("notes.txt"), "x").unwrap();
        assert_eq!(project.iter_part_files().count(), 1);
    }
}
