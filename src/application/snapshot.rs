//! Whole-state backup and restore.
//!
//! A snapshot is one versioned JSON document carrying every record and user
//! account. Restore is replace-or-reject: the payload is fully parsed and
//! version-checked before a single byte is written, and a write failure
//! midway triggers a compensating rewrite so a half-applied import is never
//! observable.

use crate::application::persistence::{load_collection, persist_collection};
use crate::application::store::RECORDS_KEY;
use crate::application::users::USERS_KEY;
use crate::domain::errors::{ImportError, PersistenceError};
use crate::domain::ports::KeyValueStorage;
use crate::domain::types::{EvaluationRecord, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// The only snapshot layout this build reads or writes.
pub const SNAPSHOT_VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: i64,
    #[serde(rename = "exportedAt", alias = "timestamp")]
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(alias = "history")]
    pub records: Vec<EvaluationRecord>,
}

// Checked before the full parse so an unknown version is reported as such
// rather than as a shape mismatch.
#[derive(Deserialize)]
struct VersionProbe {
    version: i64,
}

pub struct SnapshotService {
    storage: Arc<dyn KeyValueStorage>,
}

impl SnapshotService {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Serialize the entire durable state into one versioned snapshot.
    pub async fn export(&self) -> Result<Snapshot, PersistenceError> {
        let records = load_collection(self.storage.as_ref(), RECORDS_KEY).await?;
        let users = load_collection(self.storage.as_ref(), USERS_KEY).await?;

        Ok(Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            users,
            records,
        })
    }

    /// Replace the entire durable state with the snapshot's contents.
    ///
    /// Full overwrite, never a merge. Any parse or version failure rejects
    /// the import with storage untouched.
    pub async fn import(&self, json: &str) -> Result<Snapshot, ImportError> {
        let probe: VersionProbe = serde_json::from_str(json).map_err(ImportError::Malformed)?;
        if probe.version != SNAPSHOT_VERSION {
            warn!("Rejected snapshot with unsupported version {}", probe.version);
            return Err(ImportError::UnsupportedVersion {
                found: probe.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: Snapshot = serde_json::from_str(json).map_err(ImportError::Malformed)?;

        let previous_records =
            self.storage
                .get(RECORDS_KEY)
                .await
                .map_err(|source| PersistenceError::Read {
                    key: RECORDS_KEY.to_string(),
                    source,
                })?;

        persist_collection(self.storage.as_ref(), RECORDS_KEY, &snapshot.records).await?;

        if let Err(err) = persist_collection(self.storage.as_ref(), USERS_KEY, &snapshot.users).await
        {
            // Put the record payload back so the two keys never disagree.
            let rollback = previous_records.unwrap_or_else(|| "[]".to_string());
            if let Err(restore_err) = self.storage.set(RECORDS_KEY, &rollback).await {
                warn!(
                    "Rollback of '{}' after failed import also failed: {:#}",
                    RECORDS_KEY, restore_err
                );
            }
            return Err(err.into());
        }

        info!(
            "Imported snapshot with {} record(s) and {} user(s)",
            snapshot.records.len(),
            snapshot.users.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::EvaluationStore;
    use crate::application::users::UserDirectory;
    use crate::domain::metrics::CounterMode;
    use crate::domain::types::RecordDraft;
    use crate::infrastructure::storage::InMemoryStorage;

    fn draft(model: &str) -> RecordDraft {
        RecordDraft {
            owner_id: "local".to_string(),
            model_name: model.to_string(),
            confidence: 0.9,
            scenario: "night-rain".to_string(),
            gt_total: 10,
            tp: 7,
            secondary: 10,
        }
    }

    async fn populated_storage() -> Arc<InMemoryStorage> {
        let storage = Arc::new(InMemoryStorage::new());
        let store = EvaluationStore::new(storage.clone(), CounterMode::PredictedTotal);
        store.insert(draft("yolo-v8")).await.unwrap();
        store.insert(draft("detr")).await.unwrap();
        UserDirectory::new(storage.clone())
            .register("ada", None)
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn test_export_then_import_reproduces_state() {
        let source = populated_storage().await;
        let snapshot = SnapshotService::new(source.clone()).export().await.unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();

        let target = Arc::new(InMemoryStorage::new());
        SnapshotService::new(target.clone()).import(&json).await.unwrap();

        let store = EvaluationStore::new(target.clone(), CounterMode::PredictedTotal);
        let restored = store.get_all(None).await.unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored, snapshot.records);

        let users = UserDirectory::new(target).list().await.unwrap();
        assert_eq!(users, snapshot.users);
    }

    #[tokio::test]
    async fn test_import_is_an_overwrite_not_a_merge() {
        let storage = populated_storage().await;
        let empty = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            users: Vec::new(),
            records: Vec::new(),
        };
        let json = serde_json::to_string(&empty).unwrap();

        SnapshotService::new(storage.clone()).import(&json).await.unwrap();

        let store = EvaluationStore::new(storage.clone(), CounterMode::PredictedTotal);
        assert!(store.get_all(None).await.unwrap().is_empty());
        assert!(UserDirectory::new(storage).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_version_rejected_with_state_intact() {
        let storage = populated_storage().await;
        let before = storage.raw(RECORDS_KEY).await;

        let err = SnapshotService::new(storage.clone())
            .import(r#"{"records": []}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
        assert_eq!(storage.raw(RECORDS_KEY).await, before);
    }

    #[tokio::test]
    async fn test_unknown_version_rejected_with_state_intact() {
        let storage = populated_storage().await;
        let before = storage.raw(RECORDS_KEY).await;

        let err = SnapshotService::new(storage.clone())
            .import(r#"{"version": 7, "exportedAt": "2026-08-01T00:00:00Z", "records": []}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedVersion { found: 7, .. }));
        assert_eq!(storage.raw(RECORDS_KEY).await, before);
    }

    #[tokio::test]
    async fn test_malformed_records_shape_rejected() {
        let storage = populated_storage().await;
        let before = storage.raw(RECORDS_KEY).await;

        let err = SnapshotService::new(storage.clone())
            .import(r#"{"version": 1, "exportedAt": "2026-08-01T00:00:00Z", "records": 42}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Malformed(_)));
        assert_eq!(storage.raw(RECORDS_KEY).await, before);
    }

    #[tokio::test]
    async fn test_failed_user_write_rolls_records_back() {
        let storage = populated_storage().await;
        let before = storage.raw(RECORDS_KEY).await;

        let empty = Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            users: Vec::new(),
            records: Vec::new(),
        };
        let json = serde_json::to_string(&empty).unwrap();

        storage.fail_writes_on(USERS_KEY);
        let err = SnapshotService::new(storage.clone()).import(&json).await;
        assert!(matches!(err, Err(ImportError::Persistence(_))));

        // The records key went through before the users write failed; the
        // compensating rewrite must have restored it.
        assert_eq!(storage.raw(RECORDS_KEY).await, before);
    }

    #[tokio::test]
    async fn test_legacy_history_alias_is_accepted() {
        let storage = populated_storage().await;
        let snapshot = SnapshotService::new(storage).export().await.unwrap();
        let mut value = serde_json::to_value(&snapshot).unwrap();
        let records = value.as_object_mut().unwrap().remove("records").unwrap();
        value.as_object_mut().unwrap().insert("history".to_string(), records);

        let target = Arc::new(InMemoryStorage::new());
        let imported = SnapshotService::new(target)
            .import(&value.to_string())
            .await
            .unwrap();
        assert_eq!(imported.records.len(), 2);
    }
}
