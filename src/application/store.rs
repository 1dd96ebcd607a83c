//! Durable collection of evaluation records.
//!
//! The store owns no in-process state beyond its injected storage handle:
//! every operation re-reads the collection, applies the change, and writes
//! the whole payload back. A failed write therefore always leaves the
//! previous state intact, with nothing half-applied to roll back.

use crate::application::persistence::{load_collection, persist_collection};
use crate::domain::errors::PersistenceError;
use crate::domain::metrics::{self, CounterMode};
use crate::domain::ports::KeyValueStorage;
use crate::domain::types::{EvaluationRecord, RecordDraft};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Storage key holding the serialized record collection.
pub const RECORDS_KEY: &str = "evallog_records";

pub struct EvaluationStore {
    storage: Arc<dyn KeyValueStorage>,
    mode: CounterMode,
}

impl EvaluationStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, mode: CounterMode) -> Self {
        Self { storage, mode }
    }

    /// Persist a new record, assigning its id and timestamp and recomputing
    /// the derived metrics from the draft's raw counters.
    ///
    /// Counters are expected to have passed the validation gate upstream;
    /// the store does not re-check business rules.
    pub async fn insert(&self, draft: RecordDraft) -> Result<EvaluationRecord, PersistenceError> {
        let mut records = self.load().await?;

        let now = Utc::now();
        let max_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        // Epoch milliseconds double as the id; bump past the current maximum
        // so ids stay unique when inserts land on the same millisecond.
        let id = now.timestamp_millis().max(max_id + 1);

        let m = metrics::compute_metrics(self.mode, draft.gt_total, draft.tp, draft.secondary);

        let record = EvaluationRecord {
            id,
            owner_id: draft.owner_id,
            timestamp: now,
            model_name: draft.model_name,
            confidence: draft.confidence,
            scenario: draft.scenario,
            gt_total: draft.gt_total,
            tp: draft.tp,
            pred_total: m.pred_total,
            false_positives: m.false_positives,
            false_negatives: m.false_negatives,
            precision: m.precision,
            recall: m.recall,
            f1_score: m.f1_score,
            far: m.far,
        };

        records.insert(0, record.clone());
        self.persist(&records).await?;

        info!(
            "Persisted evaluation record {} for model '{}'",
            record.id, record.model_name
        );
        Ok(record)
    }

    /// All records, most recently created first, scoped to `owner` when
    /// given. Equal timestamps tie-break on the higher id.
    pub async fn get_all(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<EvaluationRecord>, PersistenceError> {
        let mut records = self.load().await?;
        if let Some(owner) = owner {
            records.retain(|r| r.owner_id == owner);
        }
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Remove one record by id, regardless of owner. Returns whether a
    /// record was actually removed; a missing id writes nothing.
    pub async fn delete(&self, id: i64) -> Result<bool, PersistenceError> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }

        self.persist(&records).await?;
        info!("Deleted evaluation record {}", id);
        Ok(true)
    }

    /// Remove every record belonging to `owner`, leaving other owners'
    /// records untouched. Returns how many were removed.
    pub async fn clear_all(&self, owner: &str) -> Result<usize, PersistenceError> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.owner_id != owner);
        let removed = before - records.len();

        if removed > 0 {
            self.persist(&records).await?;
            info!("Cleared {} record(s) for owner '{}'", removed, owner);
        }
        Ok(removed)
    }

    async fn load(&self) -> Result<Vec<EvaluationRecord>, PersistenceError> {
        load_collection(self.storage.as_ref(), RECORDS_KEY).await
    }

    async fn persist(&self, records: &[EvaluationRecord]) -> Result<(), PersistenceError> {
        persist_collection(self.storage.as_ref(), RECORDS_KEY, records).await
    }
}
