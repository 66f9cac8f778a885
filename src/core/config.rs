//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::duplicates::SIMILARITY_THRESHOLD;
use crate::core::search::DEFAULT_SUGGESTION_LIMIT;
use crate::core::Project;

/// Keys accepted by `plm config set`, with a short description
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("author", "Name recorded as the author of changes"),
    ("initials", "Initials recorded in the change log"),
    ("editor", "Editor command for `plm part edit`"),
    ("default_format", "Default output format (auto, yaml, tsv, json, md, id)"),
    ("suggestion_limit", "Maximum number of search suggestions"),
    ("duplicate_threshold", "Minimum similarity (0-1) flagged as a duplicate"),
];

/// PLM configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Initials for change log entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,

    /// Editor command for `plm part edit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion_limit: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_threshold: Option<f64>,
}

impl Config {
    /// Load configuration for the project found from the current directory
    pub fn load() -> Self {
        Self::load_for(Project::discover().ok().as_ref())
    }

    /// Load configuration from all sources, merging in priority order, with
    /// `project` supplying the project layer
    pub fn load_for(project: Option<&Project>) -> Self {
        Self::from_layers(Self::global_config_path().as_deref(), project, Self::from_env())
    }

    fn from_layers(global_path: Option<&Path>, project: Option<&Project>, env: Config) -> Self {
        // 1. Built-in defaults (already in Default impl)
        let mut config = Config::default();

        // 2. Global user config (~/.config/plm/config.yaml)
        if let Some(global) = global_path.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Project config (.plm/config.yaml)
        if let Some(project_config) = project.and_then(|p| Self::read_file(&Self::project_config_path(p))) {
            config.merge(project_config);
        }

        // 4. Environment variables
        config.merge(env);

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    fn from_env() -> Config {
        Config {
            author: std::env::var("PLM_AUTHOR").ok(),
            initials: std::env::var("PLM_INITIALS").ok(),
            editor: std::env::var("PLM_EDITOR").ok(),
            ..Default::default()
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "plm")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    pub fn project_config_path(project: &Project) -> PathBuf {
        project.plm_dir().join("config.yaml")
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.initials.is_some() {
            self.initials = other.initials;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.suggestion_limit.is_some() {
            self.suggestion_limit = other.suggestion_limit;
        }
        if other.duplicate_threshold.is_some() {
            self.duplicate_threshold = other.duplicate_threshold;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Initials for change log entries, derived from the author if unset
    pub fn initials(&self) -> String {
        match &self.initials {
            Some(initials) if !initials.trim().is_empty() => initials.trim().to_uppercase(),
            _ => initials_of(&self.author()),
        }
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn suggestion_limit(&self) -> usize {
        self.suggestion_limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT)
    }

    pub fn duplicate_threshold(&self) -> f64 {
        self.duplicate_threshold.unwrap_or(SIMILARITY_THRESHOLD)
    }

    /// Run the editor on a file, properly handling commands with arguments
    /// (e.g., "emacsclient -nw" or "code --wait")
    pub fn run_editor(&self, file_path: &std::path::Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let parts: Vec<&str> = editor.split_whitespace().collect();

        let Some((cmd, args)) = parts.split_first() else {
            return std::process::Command::new("vi").arg(file_path).status();
        };

        std::process::Command::new(cmd)
            .args(args)
            .arg(file_path)
            .status()
    }
}

/// Upper-cased first letter of each word ("Jane van Doe" -> "JVD")
pub fn initials_of(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            author: Some("Base".to_string()),
            suggestion_limit: Some(3),
            ..Default::default()
        };
        base.merge(Config {
            author: Some("Other".to_string()),
            duplicate_threshold: Some(0.9),
            ..Default::default()
        });

        assert_eq!(base.author.as_deref(), Some("Other"));
        assert_eq!(base.suggestion_limit(), 3);
        assert_eq!(base.duplicate_threshold(), 0.9);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.suggestion_limit(), 5);
        assert_eq!(config.duplicate_threshold(), 0.8);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials_of("Jane van Doe"), "JVD");
        assert_eq!(initials_of("  "), "");

        let config = Config {
            author: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        assert_eq!(config.initials(), "AL");

        let config = Config {
            author: Some("Ada Lovelace".to_string()),
            initials: Some("adl".to_string()),
            ..Default::default()
        };
        assert_eq!(config.initials(), "ADL");
    }

    #[test]
    fn test_config_yaml_skips_unset() {
        let config = Config {
            editor: Some("nano".to_string()),
            ..Default::default()
        };
        let yaml = serde_yml::to_string(&config).unwrap();
        assert!(yaml.contains("editor: nano"));
        assert!(!yaml.contains("author"));

        let parsed: Config = serde_yml::from_str("suggestion_limit: 8\n").unwrap();
        assert_eq!(parsed.suggestion_limit(), 8);
    }

    #[test]
    fn test_layers_use_given_project() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(Config::project_config_path(&project), "initials: ZZ\nsuggestion_limit: 2\n").unwrap();

        let global = tmp.path().join("global.yaml");
        std::fs::write(&global, "initials: GG\nauthor: Grace Hopper\n").unwrap();

        let config = Config::from_layers(Some(&global), Some(&project), Config::default());
        assert_eq!(config.initials(), "ZZ");
        assert_eq!(config.author.as_deref(), Some("Grace Hopper"));
        assert_eq!(config.suggestion_limit(), 2);

        let without_project = Config::from_layers(Some(&global), None, Config::default());
        assert_eq!(without_project.initials(), "GG");

        let env = Config {
            initials: Some("EE".to_string()),
            ..Default::default()
        };
        assert_eq!(Config::from_layers(Some(&global), Some(&project), env).initials(), "EE");
    }
}
