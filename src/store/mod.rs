//! Data access layer: one repository per collection plus the ticket filter query.

pub mod cache;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::shared::models::{Document, RecordId, Stored, Ticket};

pub use cache::CachedRepository;
pub use memory::MemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{collection} record {id} not found")]
    NotFound {
        collection: &'static str,
        id: RecordId,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found<T: Document>(id: &RecordId) -> Self {
        Self::NotFound {
            collection: T::COLLECTION,
            id: id.clone(),
        }
    }
}

/// CRUD over one collection. `update` overwrites every field it is given.
#[async_trait]
pub trait Repository<T: Document>: Send + Sync {
    async fn create(&self, fields: T) -> Result<RecordId, StoreError>;

    async fn update(&self, id: &RecordId, fields: T) -> Result<(), StoreError>;

    /// Deleting an id that does not exist succeeds.
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Stored<T>>, StoreError>;
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Conjunctive ticket filter; `None` constraints are not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub date_range: Option<DateRange>,
    pub analyst_id: Option<RecordId>,
    pub support_id: Option<RecordId>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// Applies the range only when both bounds are present; a lone bound is ignored.
    pub fn with_bounds(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        self
    }

    pub fn with_analyst(mut self, analyst_id: impl Into<RecordId>) -> Self {
        self.analyst_id = Some(analyst_id.into());
        self
    }

    pub fn with_support(mut self, support_id: impl Into<RecordId>) -> Self {
        self.support_id = Some(support_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none() && self.analyst_id.is_none() && self.support_id.is_none()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(ticket.date) {
                return false;
            }
        }
        if let Some(analyst_id) = &self.analyst_id {
            if &ticket.analyst_id != analyst_id {
                return false;
            }
        }
        if let Some(support_id) = &self.support_id {
            if &ticket.support_id != support_id {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait TicketQuery: Send + Sync {
    async fn list_filtered(&self, filter: &TicketFilter) -> Result<Vec<Stored<Ticket>>, StoreError>;
}
