//! YAML-backed group manager
//!
//! Keeps sync groups in the `groups` section of the configuration file and
//! rewrites the file after every change.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::info;

use treesync_core::config::{Config, SyncFolder, SyncGroup};
use treesync_core::ports::{GroupError, IGroupManager};

/// [`IGroupManager`] storing groups in a configuration file
#[derive(Debug)]
pub struct ConfigGroupManager {
    path: PathBuf,
    config: RwLock<Config>,
}

impl ConfigGroupManager {
    /// Loads groups from the configuration file at `path`
    ///
    /// A missing file starts from the default configuration; a file that
    /// exists but cannot be parsed is an error.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let config = if path.exists() {
            Config::load(&path)?
        } else {
            Config::default()
        };
        Ok(Self {
            path,
            config: RwLock::new(config),
        })
    }

    /// Path of the backing configuration file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Config, GroupError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| GroupError::Storage(anyhow::anyhow!("config lock poisoned")))
    }

    /// Applies `change` to a copy of the config, saves it, then publishes it
    fn update<T>(
        &self,
        change: impl FnOnce(&mut Config) -> Result<T, GroupError>,
    ) -> Result<T, GroupError> {
        let mut guard = self
            .config
            .write()
            .map_err(|_| GroupError::Storage(anyhow::anyhow!("config lock poisoned")))?;
        let mut next = guard.clone();
        let result = change(&mut next)?;
        next.save(&self.path)?;
        *guard = next;
        Ok(result)
    }
}

fn position(config: &Config, name: &str) -> Option<usize> {
    let key = name.to_lowercase();
    config.groups.iter().position(|g| g.name.to_lowercase() == key)
}

impl IGroupManager for ConfigGroupManager {
    fn groups(&self) -> Result<Vec<String>, GroupError> {
        Ok(self.read()?.groups.into_iter().map(|g| g.name).collect())
    }

    fn get_group(&self, name: &str) -> Result<SyncGroup, GroupError> {
        self.read()?
            .group(name)
            .cloned()
            .ok_or_else(|| GroupError::NotFound(name.to_string()))
    }

    fn add_group(&self, name: &str) -> Result<SyncGroup, GroupError> {
        if name.trim().is_empty() {
            return Err(GroupError::Domain(
                treesync_core::domain::DomainError::InvalidName(
                    "group name must not be empty".to_string(),
                ),
            ));
        }
        let group = self.update(|config| {
            if position(config, name).is_some() {
                return Err(GroupError::Duplicate(name.to_string()));
            }
            let group = SyncGroup::new(name);
            config.groups.push(group.clone());
            Ok(group)
        })?;
        info!(group = %name, "Sync group created");
        Ok(group)
    }

    fn remove_group(&self, name: &str) -> Result<(), GroupError> {
        self.update(|config| {
            let idx = position(config, name).ok_or_else(|| GroupError::NotFound(name.to_string()))?;
            config.groups.remove(idx);
            Ok(())
        })?;
        info!(group = %name, "Sync group removed");
        Ok(())
    }

    fn add_folder(&self, group: &str, folder: SyncFolder) -> Result<SyncGroup, GroupError> {
        folder.history_name()?;
        folder.filter.validate()?;
        let folder_name = folder.name.clone();

        let updated = self.update(|config| {
            let idx = position(config, group).ok_or_else(|| GroupError::NotFound(group.to_string()))?;
            let entry = &mut config.groups[idx];
            if entry.folder(&folder.name).is_some() {
                return Err(GroupError::DuplicateFolder {
                    group: entry.name.clone(),
                    folder: folder.name.clone(),
                });
            }
            entry.folders.push(folder);
            Ok(entry.clone())
        })?;
        info!(group = %group, folder = %folder_name, "Folder added to sync group");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use treesync_core::domain::FilterConfiguration;

    fn manager(tmp: &TempDir) -> ConfigGroupManager {
        ConfigGroupManager::open(tmp.path().join("config.yaml")).unwrap()
    }

    #[test]
    fn test_add_and_get_group() {
        let tmp = TempDir::new().unwrap();
        let groups = manager(&tmp);
        groups.add_group("Work").unwrap();

        assert_eq!(groups.groups().unwrap(), vec!["Work".to_string()]);
        assert_eq!(groups.get_group("work").unwrap().name, "Work");
        assert!(matches!(
            groups.get_group("home"),
            Err(GroupError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_group_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let groups = manager(&tmp);
        groups.add_group("work").unwrap();
        assert!(matches!(
            groups.add_group("WORK"),
            Err(GroupError::Duplicate(_))
        ));
        assert!(groups.add_group("  ").is_err());
        assert_eq!(groups.groups().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_group() {
        let tmp = TempDir::new().unwrap();
        let groups = manager(&tmp);
        groups.add_group("work").unwrap();
        groups.remove_group("Work").unwrap();
        assert!(groups.groups().unwrap().is_empty());
        assert!(matches!(
            groups.remove_group("work"),
            Err(GroupError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_folder_checks_group_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let groups = manager(&tmp);
        groups.add_group("work").unwrap();

        let updated = groups
            .add_folder(
                "work",
                SyncFolder::new("Docs", "/home/user/docs")
                    .with_filter(FilterConfiguration::empty().excluding("*.tmp")),
            )
            .unwrap();
        assert_eq!(updated.folders.len(), 1);

        assert!(matches!(
            groups.add_folder("work", SyncFolder::new("docs", "/elsewhere")),
            Err(GroupError::DuplicateFolder { .. })
        ));
        assert!(matches!(
            groups.add_folder("home", SyncFolder::new("x", "/x")),
            Err(GroupError::NotFound(_))
        ));
        assert!(matches!(
            groups.add_folder("work", SyncFolder::new("a/b", "/x")),
            Err(GroupError::Domain(_))
        ));
    }

    #[test]
    fn test_changes_are_persisted() {
        let tmp = TempDir::new().unwrap();
        {
            let groups = manager(&tmp);
            groups.add_group("work").unwrap();
            groups
                .add_folder("work", SyncFolder::new("docs", "/home/user/docs"))
                .unwrap();
        }

        let reopened = manager(&tmp);
        let group = reopened.get_group("work").unwrap();
        assert_eq!(group.folders[0].path, PathBuf::from("/home/user/docs"));

        let config = Config::load(reopened.path()).unwrap();
        assert!(config.validate().is_empty());
    }
}
