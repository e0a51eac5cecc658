//! JSON codec for sync actions
//!
//! An action is stored as `{"name": <variant>, "value": {...}}` where the
//! value carries the action id as a string, the target participant as an
//! integer and the variant's file references.
//!
//! ```json
//! {
//!   "name": "AddFileSyncAction",
//!   "value": {
//!     "id": "a7226a4d-4be8-4b10-b378-bef72a29fd24",
//!     "Target": 1,
//!     "NewFile": { "Path": "dir1/file1", "LastWriteTime": "2015-12-27T16:02:17.866699800Z", "Length": 23 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use treesync_core::domain::{FileReference, SyncActionId};

use crate::action::{SyncAction, SyncActionKind, SyncParticipant};
use crate::error::SyncError;

#[derive(Serialize, Deserialize)]
#[serde(tag = "name", content = "value")]
enum ActionRecord {
    AddFileSyncAction(AddFileRecord),
    RemoveFileSyncAction(RemoveFileRecord),
    ReplaceFileSyncAction(ReplaceFileRecord),
}

#[derive(Serialize, Deserialize)]
struct AddFileRecord {
    id: String,
    #[serde(rename = "Target")]
    target: SyncParticipant,
    #[serde(rename = "NewFile")]
    new_file: FileReference,
}

#[derive(Serialize, Deserialize)]
struct RemoveFileRecord {
    id: String,
    #[serde(rename = "Target")]
    target: SyncParticipant,
    #[serde(rename = "RemovedFile")]
    removed_file: FileReference,
}

#[derive(Serialize, Deserialize)]
struct ReplaceFileRecord {
    id: String,
    #[serde(rename = "Target")]
    target: SyncParticipant,
    #[serde(rename = "OldVersion")]
    old_version: FileReference,
    #[serde(rename = "NewVersion")]
    new_version: FileReference,
}

impl From<&SyncAction> for ActionRecord {
    fn from(action: &SyncAction) -> Self {
        let id = action.id().to_string();
        let target = action.target();
        match action.kind().clone() {
            SyncActionKind::AddFile { new_file } => Self::AddFileSyncAction(AddFileRecord {
                id,
                target,
                new_file,
            }),
            SyncActionKind::RemoveFile { removed_file } => {
                Self::RemoveFileSyncAction(RemoveFileRecord {
                    id,
                    target,
                    removed_file,
                })
            }
            SyncActionKind::ReplaceFile {
                old_version,
                new_version,
            } => Self::ReplaceFileSyncAction(ReplaceFileRecord {
                id,
                target,
                old_version,
                new_version,
            }),
        }
    }
}

impl TryFrom<ActionRecord> for SyncAction {
    type Error = SyncError;

    fn try_from(record: ActionRecord) -> Result<Self, Self::Error> {
        let (id, action) = match record {
            ActionRecord::AddFileSyncAction(r) => (r.id, SyncAction::add_file(r.target, r.new_file)),
            ActionRecord::RemoveFileSyncAction(r) => {
                (r.id, SyncAction::remove_file(r.target, r.removed_file))
            }
            ActionRecord::ReplaceFileSyncAction(r) => (
                r.id,
                SyncAction::replace_file(r.target, r.old_version, r.new_version)
                    .map_err(|e| SyncError::Serialization(e.to_string()))?,
            ),
        };
        let id: SyncActionId = id
            .parse()
            .map_err(|e| SyncError::Serialization(format!("invalid action id: {e}")))?;
        Ok(action.with_id(id))
    }
}

/// Encodes an action as a JSON value
pub fn to_value(action: &SyncAction) -> Result<serde_json::Value, SyncError> {
    Ok(serde_json::to_value(ActionRecord::from(action))?)
}

/// Decodes an action from a JSON value
///
/// # Errors
/// [`SyncError::Serialization`] if `name` or `value` is missing, the name is
/// unknown, or `id` is missing or not a UUID
pub fn from_value(value: serde_json::Value) -> Result<SyncAction, SyncError> {
    let record: ActionRecord = serde_json::from_value(value)?;
    SyncAction::try_from(record)
}

/// Encodes an action as a JSON string
pub fn serialize(action: &SyncAction) -> Result<String, SyncError> {
    Ok(serde_json::to_string(&ActionRecord::from(action))?)
}

/// Decodes an action from a JSON string
pub fn deserialize(json: &str) -> Result<SyncAction, SyncError> {
    let record: ActionRecord = serde_json::from_str(json)?;
    SyncAction::try_from(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn valid_json() -> serde_json::Value {
        json!({
            "name": "AddFileSyncAction",
            "value": {
                "id": "A7226A4D-4BE8-4B10-B378-BEF72A29FD24",
                "Target": 1,
                "NewFile": {
                    "Path": "dir1/file1",
                    "LastWriteTime": "2015-12-27T17:02:17.8666998+01:00",
                    "Length": 23
                }
            }
        })
    }

    fn precise_reference(p: &str, length: u64) -> FileReference {
        let time: DateTime<Utc> = "2015-12-27T16:02:17.866699834Z".parse().unwrap();
        FileReference::new(p)
            .unwrap()
            .with_last_write_time(time)
            .with_length(length)
    }

    #[test]
    fn test_valid_json_is_read() {
        let action = from_value(valid_json()).unwrap();
        assert_eq!(
            action.id().to_string(),
            "a7226a4d-4be8-4b10-b378-bef72a29fd24"
        );
        assert_eq!(action.target(), SyncParticipant::Right);
        let SyncActionKind::AddFile { new_file } = action.kind() else {
            panic!("expected an AddFile action");
        };
        assert_eq!(new_file.path(), "dir1/file1");
        assert_eq!(new_file.length(), Some(23));
        assert_eq!(
            new_file.last_write_time().unwrap().to_rfc3339(),
            "2015-12-27T16:02:17.866699800+00:00"
        );
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let mut value = valid_json();
        value["value"].as_object_mut().unwrap().remove("id");
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let mut value = valid_json();
        value["value"]["id"] = json!("This is not a Guid");
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("name");
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove("value");
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let value = json!({ "name": "SomeNonsenseValue" });
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_unknown_target_is_rejected() {
        let mut value = valid_json();
        value["value"]["Target"] = json!(7);
        assert!(matches!(from_value(value), Err(SyncError::Serialization(_))));
    }

    #[test]
    fn test_add_file_round_trip() {
        let action = SyncAction::add_file(SyncParticipant::Left, precise_reference("a/b.txt", 1234));
        let restored = deserialize(&serialize(&action).unwrap()).unwrap();
        assert_eq!(restored, action);
    }

    #[test]
    fn test_remove_file_round_trip() {
        let action = SyncAction::remove_file(SyncParticipant::Right, precise_reference("gone", 0));
        let restored = deserialize(&serialize(&action).unwrap()).unwrap();
        assert_eq!(restored.id(), action.id());
        assert_eq!(restored.kind(), action.kind());
    }

    #[test]
    fn test_replace_file_round_trip() {
        let action = SyncAction::replace_file(
            SyncParticipant::Left,
            precise_reference("r.bin", 1),
            precise_reference("r.bin", u64::MAX),
        )
        .unwrap();
        let value = to_value(&action).unwrap();
        assert_eq!(value["name"], "ReplaceFileSyncAction");
        assert_eq!(value["value"]["Target"], 0);

        let restored = from_value(value).unwrap();
        assert_eq!(restored, action);
    }
}
