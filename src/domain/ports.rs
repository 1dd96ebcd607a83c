use anyhow::Result;
use async_trait::async_trait;

/// Durable key-value storage addressed by a small fixed set of named keys.
///
/// The record store and user directory only ever read and replace whole
/// string payloads; the adapter decides the technology behind them.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Fetch the payload stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the payload stored under `key`. Must be all-or-nothing: a
    /// failed write leaves the previous payload readable.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
