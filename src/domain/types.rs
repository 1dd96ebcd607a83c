use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner tag used when no user accounts are configured.
pub const DEFAULT_OWNER: &str = "local";

fn default_owner_id() -> String {
    DEFAULT_OWNER.to_string()
}

/// A single manual evaluation of a perception-model run.
///
/// Raw counters and the metrics derived from them are stored side by side,
/// so historical rows stay interpretable even if the formulas change later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Unique, store-assigned, non-decreasing in insertion order.
    pub id: i64,
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    /// Assigned at insert time, immutable afterwards.
    pub timestamp: DateTime<Utc>,
    pub model_name: String,
    #[serde(default)]
    pub confidence: f64,
    pub scenario: String,

    // Raw counters
    pub gt_total: i64,
    pub tp: i64,
    pub pred_total: i64,
    #[serde(rename = "fp")]
    pub false_positives: i64,
    #[serde(rename = "fn")]
    pub false_negatives: i64,

    // Derived metrics, recomputed at write time
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub far: f64,
}

/// Caller-supplied fields for a new record.
///
/// The id, timestamp, and every derived field are assigned by the store at
/// insert time; counters must already have passed the validation gate.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub owner_id: String,
    pub model_name: String,
    pub confidence: f64,
    pub scenario: String,
    pub gt_total: i64,
    pub tp: i64,
    /// Total predictions or false positives, depending on the counter mode.
    pub secondary: i64,
}

/// Output of the metrics engine for one set of raw counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculatedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub far: f64,
    pub false_positives: i64,
    pub false_negatives: i64,
    /// Normalized total-prediction count, whichever counter was supplied.
    pub pred_total: i64,
}

/// A registered account that owns evaluation records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
