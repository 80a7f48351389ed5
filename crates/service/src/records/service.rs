use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{Command, OperationResult, RecordInput};
use super::errors::RecordError;
use super::store::RecordStore;

/// Record CRUD rules on top of an external store, independent of the web framework.
///
/// Holds no record state of its own. Existence is checked and the write issued as two
/// separate store calls, so two concurrent creates of one key can both see it absent.
pub struct RecordService<S: RecordStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RecordStore + ?Sized> RecordService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a record; the key must not exist yet.
    ///
    /// # Examples
    /// ```
    /// use service::records::{service::RecordService, store::memory::MemoryStore, domain::RecordInput};
    /// let svc = RecordService::new(MemoryStore::new());
    /// let created = tokio_test::block_on(svc.create(RecordInput::new("foo", "bar"))).unwrap();
    /// assert_eq!(created.value.as_deref(), Some("bar"));
    /// assert!(tokio_test::block_on(svc.create(RecordInput::new("foo", "baz"))).is_err());
    /// ```
    #[instrument(skip(self, input), fields(key = %input.key))]
    pub async fn create(&self, input: RecordInput) -> Result<OperationResult, RecordError> {
        let (key, value) = validate_write(input)?;
        if self.store.get(&key).await?.is_some() {
            debug!("create rejected, key exists");
            return Err(RecordError::Conflict);
        }
        self.write(Command::Create, key, value).await
    }

    /// Overwrite an existing record.
    ///
    /// # Examples
    /// ```
    /// use service::records::{service::RecordService, store::memory::MemoryStore, domain::RecordInput};
    /// let svc = RecordService::new(MemoryStore::new());
    /// assert!(tokio_test::block_on(svc.update(RecordInput::new("foo", "bar"))).is_err());
    /// tokio_test::block_on(svc.create(RecordInput::new("foo", "bar"))).unwrap();
    /// let updated = tokio_test::block_on(svc.update(RecordInput::new("foo", "qux"))).unwrap();
    /// assert_eq!(updated.value.as_deref(), Some("qux"));
    /// ```
    #[instrument(skip(self, input), fields(key = %input.key))]
    pub async fn update(&self, input: RecordInput) -> Result<OperationResult, RecordError> {
        let (key, value) = validate_write(input)?;
        if self.store.get(&key).await?.is_none() {
            debug!("update rejected, key missing");
            return Err(RecordError::NotFound(Command::Update));
        }
        self.write(Command::Update, key, value).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, key: &str) -> Result<OperationResult, RecordError> {
        validate_key(key)?;
        let value = self
            .store
            .get(key)
            .await?
            .ok_or(RecordError::NotFound(Command::Retrieve))?;
        Ok(OperationResult::success(Command::Retrieve, key, Some(value)))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<OperationResult, RecordError> {
        validate_key(key)?;
        if self.store.get(key).await?.is_none() {
            return Err(RecordError::NotFound(Command::Delete));
        }
        let removed = self.store.delete(key).await?;
        if removed < 1 {
            warn!(removed, "store removed nothing for an existing key");
            return Err(RecordError::DeleteIncomplete { removed });
        }
        info!(event = "record_deleted", "record deleted");
        Ok(OperationResult::success(Command::Delete, key, None))
    }

    async fn write(&self, command: Command, key: String, value: String) -> Result<OperationResult, RecordError> {
        if !self.store.set(&key, &value).await? {
            return Err(RecordError::StoreUnavailable(format!("store refused {}", command.as_str())));
        }
        info!(event = "record_written", command = command.as_str(), "record written");
        Ok(OperationResult::success(command, key, Some(value)))
    }
}

fn validate_key(key: &str) -> Result<(), RecordError> {
    if key.trim().is_empty() {
        return Err(RecordError::MalformedRequest("key must not be empty".into()));
    }
    Ok(())
}

fn validate_write(input: RecordInput) -> Result<(String, String), RecordError> {
    validate_key(&input.key)?;
    let value = input
        .value
        .ok_or_else(|| RecordError::MalformedRequest("missing field `value`".into()))?;
    Ok((input.key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::store::memory::MemoryStore;
    use crate::records::store::StoreError;
    use async_trait::async_trait;

    fn svc() -> (Arc<MemoryStore>, RecordService<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), RecordService::new(store))
    }

    #[tokio::test]
    async fn create_then_retrieve_returns_value() -> Result<(), anyhow::Error> {
        let (_, svc) = svc();
        let created = svc.create(RecordInput::new("foo", "bar")).await?;
        assert!(created.succeeded);
        assert_eq!(created.command, Command::Create);
        assert_eq!(created.value.as_deref(), Some("bar"));

        let got = svc.retrieve("foo").await?;
        assert_eq!(got.value.as_deref(), Some("bar"));
        assert_eq!(got.command, Command::Retrieve);
        Ok(())
    }

    #[tokio::test]
    async fn create_over_existing_conflicts_and_keeps_value() -> Result<(), anyhow::Error> {
        let (store, svc) = svc();
        store.insert("foo", "original").await;
        let err = svc.create(RecordInput::new("foo", "bar")).await.unwrap_err();
        assert!(matches!(err, RecordError::Conflict));
        assert_eq!(svc.retrieve("foo").await?.value.as_deref(), Some("original"));
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let (store, svc) = svc();
        let err = svc.update(RecordInput::new("nope", "v")).await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound(Command::Update)));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn update_existing_overwrites() -> Result<(), anyhow::Error> {
        let (store, svc) = svc();
        store.insert("k", "v0").await;
        let out = svc.update(RecordInput::new("k", "v1")).await?;
        assert_eq!(out.command, Command::Update);
        assert_eq!(svc.retrieve("k").await?.value.as_deref(), Some("v1"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_lifecycle() -> Result<(), anyhow::Error> {
        let (store, svc) = svc();
        assert!(matches!(svc.delete("k").await, Err(RecordError::NotFound(Command::Delete))));

        store.insert("k", "v").await;
        let out = svc.delete("k").await?;
        assert!(out.succeeded);
        assert_eq!(out.value, None);
        assert!(matches!(svc.retrieve("k").await, Err(RecordError::NotFound(Command::Retrieve))));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_store() {
        let (store, svc) = svc();
        let missing_value = RecordInput { key: "k".into(), value: None };
        assert!(matches!(svc.create(missing_value.clone()).await, Err(RecordError::MalformedRequest(_))));
        assert!(matches!(svc.update(missing_value).await, Err(RecordError::MalformedRequest(_))));
        assert!(matches!(svc.retrieve(" ").await, Err(RecordError::MalformedRequest(_))));
        assert!(matches!(svc.delete("").await, Err(RecordError::MalformedRequest(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn offline_store_is_unavailable_for_every_command() {
        let (store, svc) = svc();
        store.set_offline(true);
        assert!(matches!(svc.create(RecordInput::new("k", "v")).await, Err(RecordError::StoreUnavailable(_))));
        assert!(matches!(svc.update(RecordInput::new("k", "v")).await, Err(RecordError::StoreUnavailable(_))));
        assert!(matches!(svc.retrieve("k").await, Err(RecordError::StoreUnavailable(_))));
        assert!(matches!(svc.delete("k").await, Err(RecordError::StoreUnavailable(_))));
    }

    /// Reports the key as present but never removes anything.
    struct StubbornStore;

    #[async_trait]
    impl RecordStore for StubbornStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(Some("v".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn delete(&self, _key: &str) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn delete_count_below_one_is_a_store_failure() {
        let svc = RecordService::new(Arc::new(StubbornStore));
        let err = svc.delete("k").await.unwrap_err();
        assert!(matches!(err, RecordError::DeleteIncomplete { removed: 0 }));
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn refused_write_is_a_store_failure() {
        let svc = RecordService::new(Arc::new(StubbornStore));
        let err = svc.update(RecordInput::new("k", "v")).await.unwrap_err();
        assert!(matches!(err, RecordError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn works_through_a_trait_object() -> Result<(), anyhow::Error> {
        let store: Arc<dyn RecordStore> = MemoryStore::new();
        let svc = RecordService::new(store);
        svc.create(RecordInput::new("a", "1")).await?;
        assert_eq!(svc.retrieve("a").await?.value.as_deref(), Some("1"));
        Ok(())
    }
}
