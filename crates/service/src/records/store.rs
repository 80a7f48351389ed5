use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failures talking to the external store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("store connection error: {0}")]
    Connection(String),
    #[error("store command error: {0}")]
    Command(String),
}

/// Capability the record service needs from the external key-value store.
///
/// Every method is a single round trip; implementations bound it with their own timeout.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write unconditionally; `false` means the store refused the write.
    async fn set(&self, key: &str, value: &str) -> Result<bool, StoreError>;
    /// Number of records removed.
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;
}

/// In-process store for tests and for running without Redis.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryStore {
        inner: RwLock<HashMap<String, String>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl MemoryStore {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Seed a record without counting it as a store call.
        pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
            self.inner.write().await.insert(key.into(), value.into());
        }

        /// While offline every call fails as if the store were unreachable.
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        /// Calls received through `RecordStore`, including failed ones.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub async fn len(&self) -> usize {
            self.inner.read().await.len()
        }

        fn enter(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(StoreError::Connection("memory store offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.enter()?;
            Ok(self.inner.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<bool, StoreError> {
            self.enter()?;
            self.inner.write().await.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn delete(&self, key: &str) -> Result<u64, StoreError> {
            self.enter()?;
            Ok(u64::from(self.inner.write().await.remove(key).is_some()))
        }
    }

}
