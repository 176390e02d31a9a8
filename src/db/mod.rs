pub mod error;
pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Single-key access to the namespace holding clock records.
///
/// Implementations give atomic get/put per key and nothing more: no
/// listing, no transactions, no compare-and-swap. Concurrent puts to the
/// same key resolve as last write wins.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Read the raw value under `key`, `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace whatever is under `key` with `value`.
    async fn put(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).put(key, value).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}

/// Open the configured store: Redis when a URL is set, memory otherwise.
pub async fn connect(redis_url: Option<&str>) -> anyhow::Result<Arc<dyn KvStore>> {
    match redis_url {
        Some(url) => {
            let store = RedisStore::connect(url).await?;
            tracing::info!("Redis connected");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("REDIS_URL not set, clock records are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
