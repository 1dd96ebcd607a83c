//! Shared read/write helpers over the storage port.
//!
//! Collections live under one named key each, as a single JSON array. An
//! absent key reads as an empty collection; a corrupt payload is a
//! deterministic decode error, never silently treated as empty.

use crate::domain::errors::PersistenceError;
use crate::domain::ports::KeyValueStorage;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub(crate) async fn load_collection<T: DeserializeOwned>(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> Result<Vec<T>, PersistenceError> {
    let payload = storage
        .get(key)
        .await
        .map_err(|source| PersistenceError::Read {
            key: key.to_string(),
            source,
        })?;

    match payload {
        Some(json) => serde_json::from_str(&json).map_err(|source| PersistenceError::Decode {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

pub(crate) async fn persist_collection<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    items: &[T],
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(items).map_err(|source| PersistenceError::Write {
        key: key.to_string(),
        source: anyhow::Error::new(source),
    })?;

    storage
        .set(key, &json)
        .await
        .map_err(|source| PersistenceError::Write {
            key: key.to_string(),
            source,
        })
}
