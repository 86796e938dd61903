//! JSON file persistence for a record store.
//!
//! The file holds the status section of a managed notification:
//!
//! ```json
//! { "notifications": [ { "name": "...", "serviceLogSentCount": 1, "conditions": [...] } ] }
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the target, so readers never observe a partial file.

use crate::config::ManagedNotificationStatus;
use crate::error::StatusFileError;
use crate::record::NotificationRecordStore;
use std::io::Write;
use std::path::Path;

/// Load a store from `path`. A missing file is an empty store.
///
/// # Errors
/// Returns [`StatusFileError::Read`] on I/O failure and
/// [`StatusFileError::Parse`] if the content is not a valid status document.
pub fn load(path: &Path) -> Result<NotificationRecordStore, StatusFileError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Status file not found, starting empty");
            return Ok(NotificationRecordStore::new());
        }
        Err(e) => {
            return Err(StatusFileError::Read(format!("{}: {}", path.display(), e)));
        }
    };

    let status: ManagedNotificationStatus = serde_json::from_str(&content)
        .map_err(|e| StatusFileError::Parse(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(
        path = %path.display(),
        records = status.notifications.len(),
        "Status file loaded"
    );

    Ok(status.notifications)
}

/// Atomically replace `path` with the serialized `store`.
///
/// # Errors
/// Returns [`StatusFileError::Write`] if the temporary file cannot be
/// created, written, or renamed into place.
pub fn save(path: &Path, store: &NotificationRecordStore) -> Result<(), StatusFileError> {
    let status = ManagedNotificationStatus {
        notifications: store.clone(),
    };
    let json = serde_json::to_string_pretty(&status)
        .map_err(|e| StatusFileError::Write(e.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |e: std::io::Error| StatusFileError::Write(format!("{}: {}", path.display(), e));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    tracing::debug!(path = %path.display(), records = store.len(), "Status file saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;
    use chrono::{TimeZone, Utc};

    #[test]
    fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("status.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let mut store = NotificationRecordStore::new();
        store.init("ClusterHasGoneAway");
        store.insert("ClusterHasGoneAway").record_send("initial alert", now);
        store.init("LoggingVolumeFillingUp");

        save(&path, &store).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, store);
        let record = loaded.find("ClusterHasGoneAway").unwrap();
        assert_eq!(record.sent_count, 1);
        assert_eq!(
            record.conditions.get(ConditionKind::ServiceLogSent).unwrap().reason,
            "initial alert"
        );
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");

        let mut store = NotificationRecordStore::new();
        store.insert("a");
        save(&path, &store).unwrap();

        store.insert("b");
        save(&path, &store).unwrap();

        assert_eq!(load(&path).unwrap().len(), 2);
    }

    #[test]
    fn saved_file_uses_status_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");

        let mut store = NotificationRecordStore::new();
        store.insert("a");
        save(&path, &store).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"notifications": [{"name": "a"}]}));
    }

    #[test]
    fn empty_object_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(load(&path), Err(StatusFileError::Parse(_))));
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("status.json");

        assert!(matches!(
            save(&path, &NotificationRecordStore::new()),
            Err(StatusFileError::Write(_))
        ));
    }
}
