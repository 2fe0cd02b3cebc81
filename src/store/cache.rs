use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

use super::{Repository, StoreError};
use crate::core::shared::models::{Document, RecordId, Stored};

/// Keeps one snapshot of a collection and drops it on every mutation.
pub struct CachedRepository<T: Document> {
    inner: Arc<dyn Repository<T>>,
    snapshot: RwLock<Option<Vec<Stored<T>>>>,
}

impl<T: Document> CachedRepository<T> {
    pub fn new(inner: Arc<dyn Repository<T>>) -> Self {
        Self {
            inner,
            snapshot: RwLock::new(None),
        }
    }

    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
        trace!("Invalidated {} snapshot", T::COLLECTION);
    }

    pub async fn is_warm(&self) -> bool {
        self.snapshot.read().await.is_some()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for CachedRepository<T> {
    async fn create(&self, fields: T) -> Result<RecordId, StoreError> {
        let result = self.inner.create(fields).await;
        self.invalidate().await;
        result
    }

    async fn update(&self, id: &RecordId, fields: T) -> Result<(), StoreError> {
        let result = self.inner.update(id, fields).await;
        self.invalidate().await;
        result
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let result = self.inner.delete(id).await;
        self.invalidate().await;
        result
    }

    async fn list(&self) -> Result<Vec<Stored<T>>, StoreError> {
        if let Some(records) = self.snapshot.read().await.as_ref() {
            return Ok(records.clone());
        }

        let mut snapshot = self.snapshot.write().await;
        if let Some(records) = snapshot.as_ref() {
            return Ok(records.clone());
        }
        let records = self.inner.list().await?;
        *snapshot = Some(records.clone());
        Ok(records)
    }
}
