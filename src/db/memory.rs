use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{KvStore, StoreError};

/// In-process store used when no Redis is configured and in tests.
///
/// Keys registered with [`MemoryStore::fail_key`] make every operation on
/// them return an error, which lets tests drive the store-failure paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store failure for `key`.
    pub fn fail_key(&self, key: &str) {
        lock(&self.failing).insert(key.to_string());
    }

    /// Stop failing `key`.
    pub fn heal_key(&self, key: &str) {
        lock(&self.failing).remove(key);
    }

    pub fn len(&self) -> usize {
        lock(&self.data).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, key: &str) -> Result<(), StoreError> {
        if lock(&self.failing).contains(key) {
            return Err(StoreError::Operation(format!(
                "Simulated failure for key: {key}"
            )));
        }
        Ok(())
    }
}

// Poisoning is ignored: the maps only hold owned strings.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check(key)?;
        Ok(lock(&self.data).get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.check(key)?;
        lock(&self.data).insert(key.to_string(), value);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
