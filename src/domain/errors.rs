use thiserror::Error;

/// Gate failures for raw evaluation counters
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("counters must be non-negative (gt={gt}, tp={tp}, secondary={secondary})")]
    NonNegative { gt: i64, tp: i64, secondary: i64 },

    #[error("true positives ({tp}) cannot exceed ground truth ({gt})")]
    TruePositiveExceedsGroundTruth { tp: i64, gt: i64 },

    #[error("true positives ({tp}) cannot exceed predicted total ({pred_total})")]
    TruePositiveExceedsPredicted { tp: i64, pred_total: i64 },
}

/// Errors touching the durable collection
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read '{key}' from storage")]
    Read {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write '{key}' to storage")]
    Write {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("stored payload under '{key}' is not valid JSON")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while restoring a snapshot
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("snapshot is not a valid versioned JSON document")]
    Malformed(#[source] serde_json::Error),

    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: i64, expected: i64 },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors raised by the user directory
#[derive(Debug, Error)]
pub enum UserError {
    #[error("username '{0}' is already registered")]
    DuplicateUsername(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
