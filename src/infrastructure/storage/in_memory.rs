//! In-memory storage adapter.
//!
//! Suitable for tests and throwaway sessions; data is lost on exit. The
//! write-failure switches exist so persistence-failure and import-rollback
//! paths can be exercised without a real storage fault.

use crate::domain::ports::KeyValueStorage;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

pub struct InMemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_all_writes: AtomicBool,
    fail_key: Mutex<Option<String>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            fail_all_writes: AtomicBool::new(false),
            fail_key: Mutex::new(None),
        }
    }

    /// Make every subsequent `set` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `set` fail for one specific key only.
    pub fn fail_writes_on(&self, key: &str) {
        *self
            .fail_key
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(key.to_string());
    }

    /// Raw payload under `key`, bypassing the port, for test inspection.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_all_writes.load(Ordering::SeqCst) {
            bail!("write rejected: storage quota exhausted");
        }
        let failing_key = self
            .fail_key
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        if failing_key.as_deref() == Some(key) {
            bail!("write rejected for '{}': storage quota exhausted", key);
        }

        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
