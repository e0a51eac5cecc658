//! Configuration module for treesync.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, FilterConfiguration, HistoryName};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for treesync.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub sync: SyncConfig,
    pub groups: Vec<SyncGroup>,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

/// Snapshot store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the directory-backed store's state.
    pub directory: PathBuf,
}

/// Synchronization settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Filter applied to folders that do not configure their own.
    pub default_filter: FilterConfiguration,
}

/// A named group of folders that are synchronized together.
///
/// Each folder is tracked by its own history, named after the folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGroup {
    pub name: String,
    #[serde(default)]
    pub folders: Vec<SyncFolder>,
}

/// One folder of a sync group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFolder {
    /// Folder name; also the name of the folder's history.
    pub name: String,
    /// Location of the folder on disk.
    pub path: PathBuf,
    /// Paths of the folder that take part in synchronization.
    #[serde(default)]
    pub filter: FilterConfiguration,
}

impl SyncGroup {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folders: Vec::new(),
        }
    }

    /// Builder: adds a folder.
    #[must_use]
    pub fn with_folder(mut self, folder: SyncFolder) -> Self {
        self.folders.push(folder);
        self
    }

    /// Looks up a folder by name, ignoring case.
    pub fn folder(&self, name: &str) -> Option<&SyncFolder> {
        self.folders
            .iter()
            .find(|f| f.name.to_lowercase() == name.to_lowercase())
    }

    /// Maps every folder's history name to its filter.
    ///
    /// Folders without a filter of their own get `default`.
    pub fn filter_configurations(
        &self,
        default: &FilterConfiguration,
    ) -> Result<BTreeMap<HistoryName, FilterConfiguration>, DomainError> {
        self.folders
            .iter()
            .map(|folder| {
                let filter = if folder.filter.is_empty() {
                    default.clone()
                } else {
                    folder.filter.clone()
                };
                Ok((folder.history_name()?, filter))
            })
            .collect()
    }
}

impl SyncFolder {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            filter: FilterConfiguration::default(),
        }
    }

    /// Builder: sets the filter.
    #[must_use]
    pub fn with_filter(mut self, filter: FilterConfiguration) -> Self {
        self.filter = filter;
        self
    }

    /// Name of the history tracking this folder.
    pub fn history_name(&self) -> Result<HistoryName, DomainError> {
        HistoryName::new(self.name.clone())
    }
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the configuration as YAML to `path`, creating parent directories.
    ///
    /// The file is written to a sibling temporary file first and renamed
    /// into place.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let mut tmp_path = path.as_os_str().to_owned();
        tmp_path.push(".tmp");
        std::fs::write(&tmp_path, yaml)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/treesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("treesync")
            .join("config.yaml")
    }

    /// Looks up a group by name, ignoring case.
    pub fn group(&self, name: &str) -> Option<&SyncGroup> {
        self.groups
            .iter()
            .find(|g| g.name.to_lowercase() == name.to_lowercase())
    }

    /// Filters of `group`'s folders, falling back to `sync.default_filter`.
    pub fn filter_configurations(
        &self,
        group: &SyncGroup,
    ) -> Result<BTreeMap<HistoryName, FilterConfiguration>, DomainError> {
        group.filter_configurations(&self.sync.default_filter)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("treesync")
                .join("store"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"groups[0].name"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // --- store ---
        if self.store.directory.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "store.directory".into(),
                message: "must not be empty".into(),
            });
        }

        // --- sync ---
        if let Err(e) = self.sync.default_filter.validate() {
            errors.push(ValidationError {
                field: "sync.default_filter".into(),
                message: e.to_string(),
            });
        }

        // --- groups ---
        let mut group_names = HashSet::new();
        for (i, group) in self.groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                errors.push(ValidationError {
                    field: format!("groups[{i}].name"),
                    message: "must not be empty".into(),
                });
            } else if !group_names.insert(group.name.to_lowercase()) {
                errors.push(ValidationError {
                    field: format!("groups[{i}].name"),
                    message: format!("duplicate group '{}'", group.name),
                });
            }

            let mut folder_names = HashSet::new();
            for (j, folder) in group.folders.iter().enumerate() {
                let field = format!("groups[{i}].folders[{j}]");
                if let Err(e) = folder.history_name() {
                    errors.push(ValidationError {
                        field: format!("{field}.name"),
                        message: e.to_string(),
                    });
                } else if !folder_names.insert(folder.name.to_lowercase()) {
                    errors.push(ValidationError {
                        field: format!("{field}.name"),
                        message: format!("duplicate folder '{}'", folder.name),
                    });
                }
                if folder.path.as_os_str().is_empty() {
                    errors.push(ValidationError {
                        field: format!("{field}.path"),
                        message: "must not be empty".into(),
                    });
                }
                if let Err(e) = folder.filter.validate() {
                    errors.push(ValidationError {
                        field: format!("{field}.filter"),
                        message: e.to_string(),
                    });
                }
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and lets callers override individual fields.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with default values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- store ---

    pub fn store_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.store.directory = directory.into();
        self
    }

    // --- sync ---

    pub fn default_filter(mut self, filter: FilterConfiguration) -> Self {
        self.config.sync.default_filter = filter;
        self
    }

    // --- groups ---

    pub fn group(mut self, group: SyncGroup) -> Self {
        self.config.groups.push(group);
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
