use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Repository, StoreError, TicketFilter, TicketQuery};
use crate::core::shared::models::{Document, RecordId, Stored, Ticket};

/// In-process collection kept in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryRepository<T> {
    records: Arc<RwLock<Vec<Stored<T>>>>,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_records(records: Vec<Stored<T>>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<T: Document> Repository<T> for MemoryRepository<T> {
    async fn create(&self, fields: T) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        let mut records = self.records.write().await;
        records.push(Stored::new(id.clone(), fields));
        debug!("Created {} record {id}", T::COLLECTION);
        Ok(id)
    }

    async fn update(&self, id: &RecordId, fields: T) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::not_found::<T>(id))?;
        record.fields = fields;
        debug!("Updated {} record {id}", T::COLLECTION);
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.retain(|record| &record.id != id);
        debug!("Deleted {} record {id}", T::COLLECTION);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Stored<T>>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

#[async_trait]
impl TicketQuery for MemoryRepository<Ticket> {
    async fn list_filtered(&self, filter: &TicketFilter) -> Result<Vec<Stored<Ticket>>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| filter.matches(&record.fields))
            .cloned()
            .collect())
    }
}
