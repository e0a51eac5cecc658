//! Conflict bookkeeping shared by the store adapters

use std::collections::{BTreeMap, BTreeSet};

use treesync_core::domain::{path, ConflictInfo};
use treesync_core::ports::ConflictError;

/// Conflicts keyed by case-folded path
pub(crate) type ConflictMap = BTreeMap<String, ConflictInfo>;

/// Validates `file_path` and returns its lookup key
pub(crate) fn key_for(file_path: &str) -> Result<String, ConflictError> {
    path::validate_path(file_path)?;
    Ok(path::key(file_path))
}

pub(crate) fn get(map: &ConflictMap, file_path: &str) -> Result<ConflictInfo, ConflictError> {
    map.get(&key_for(file_path)?)
        .cloned()
        .ok_or_else(|| ConflictError::NotFound(file_path.to_string()))
}

/// Inserts the whole batch, or nothing if any path is taken
pub(crate) fn add_all(map: &mut ConflictMap, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
    let mut seen = BTreeSet::new();
    for info in batch {
        let key = info.key();
        if map.contains_key(&key) || !seen.insert(key) {
            return Err(ConflictError::Duplicate(info.file_path().to_string()));
        }
    }
    for info in batch {
        map.insert(info.key(), info.clone());
    }
    Ok(())
}

/// Removes the whole batch, or nothing if any path is missing
pub(crate) fn remove_all(map: &mut ConflictMap, batch: &[ConflictInfo]) -> Result<(), ConflictError> {
    if let Some(missing) = batch.iter().find(|info| !map.contains_key(&info.key())) {
        return Err(ConflictError::NotFound(missing.file_path().to_string()));
    }
    for info in batch {
        map.remove(&info.key());
    }
    Ok(())
}
