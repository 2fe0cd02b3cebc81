//! Record management: one controller shape shared by every collection.

pub mod analysts;
pub mod api;
pub mod reasons;
pub mod supports;
pub mod ui;

use axum::Router;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::shared::models::{
    resolve, Analyst, Document, Entry, Reason, RecordId, Stored, Support, ValidationError,
};
use crate::core::shared::state::AppState;
use crate::directory::Identity;
use crate::store::{Repository, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(RecordId),
    Updated(RecordId),
}

impl SubmitOutcome {
    pub fn id(&self) -> &RecordId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Answer to "Tem certeza que deseja excluir...?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("yes" | "true" | "1" | "sim") => Self::Confirmed,
            _ => Self::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// Collection, single-record form buffer and busy flag for one record type.
///
/// The collection is reloaded after every successful mutation; nothing is updated optimistically.
pub struct RecordView<T: Document> {
    repo: Arc<dyn Repository<T>>,
    defaults: T,
    records: Vec<Stored<T>>,
    form: Entry<T>,
    busy: bool,
}

impl<T: Document> RecordView<T> {
    pub fn new(repo: Arc<dyn Repository<T>>, defaults: T) -> Self {
        Self {
            repo,
            form: Entry::Draft(defaults.clone()),
            defaults,
            records: Vec::new(),
            busy: false,
        }
    }

    /// On failure the previous collection is kept.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        match self.repo.list().await {
            Ok(records) => {
                self.records = records;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load {}: {e}", T::COLLECTION);
                Err(e)
            }
        }
    }

    pub fn records(&self) -> &[Stored<T>] {
        &self.records
    }

    pub fn form(&self) -> &Entry<T> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut T {
        self.form.fields_mut()
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        self.form.editing_id()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn begin_create(&mut self) {
        self.form = Entry::Draft(self.defaults.clone());
    }

    pub fn begin_edit(&mut self, record: &Stored<T>) {
        self.form = Entry::Persisted(record.clone());
    }

    /// Returns `false` when `id` is not in the loaded collection.
    pub fn begin_edit_by_id(&mut self, id: &RecordId) -> bool {
        match self.records.iter().find(|record| &record.id == id).cloned() {
            Some(record) => {
                self.begin_edit(&record);
                true
            }
            None => false,
        }
    }

    /// Puts a posted buffer back in place, in edit mode when `editing_id` is present.
    pub fn restore(&mut self, editing_id: Option<RecordId>, fields: T) {
        self.form = match editing_id {
            Some(id) => Entry::Persisted(Stored::new(id, fields)),
            None => Entry::Draft(fields),
        };
    }

    /// Creates or updates from the buffer. The buffer survives any failure.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        self.form.fields().validate()?;

        self.busy = true;
        let fields = self.form.fields().clone();
        let result = match self.form.editing_id().cloned() {
            Some(id) => self
                .repo
                .update(&id, fields)
                .await
                .map(|()| SubmitOutcome::Updated(id)),
            None => self.repo.create(fields).await.map(SubmitOutcome::Created),
        };
        self.busy = false;

        match result {
            Ok(outcome) => {
                info!("Saved {} record {}", T::COLLECTION, outcome.id());
                self.begin_create();
                let _ = self.load().await;
                Ok(outcome)
            }
            Err(e) => {
                error!("Failed to save {} record: {e}", T::COLLECTION);
                Err(e.into())
            }
        }
    }

    pub async fn delete(
        &mut self,
        id: &RecordId,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, StoreError> {
        if confirmation == Confirmation::Declined {
            return Ok(DeleteOutcome::Cancelled);
        }

        self.busy = true;
        let result = self.repo.delete(id).await;
        self.busy = false;

        if let Err(e) = result {
            error!("Failed to delete {} record {id}: {e}", T::COLLECTION);
            return Err(e);
        }

        info!("Deleted {} record {id}", T::COLLECTION);
        let _ = self.load().await;
        Ok(DeleteOutcome::Deleted)
    }
}

/// Read-only collections a view needs for selects and id resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Analysts,
    Supports,
    Reasons,
}

#[derive(Debug, Clone, Default)]
pub struct References {
    pub analysts: Vec<Stored<Analyst>>,
    pub supports: Vec<Stored<Support>>,
    pub reasons: Vec<Stored<Reason>>,
}

impl References {
    /// Loads only the `wanted` collections. A failed fetch leaves that collection empty.
    pub async fn load(state: &AppState, wanted: &[Collection]) -> Self {
        let mut refs = Self::default();
        for collection in wanted {
            match collection {
                Collection::Analysts => refs.analysts = fetch(state.analysts.as_ref()).await,
                Collection::Supports => refs.supports = fetch(state.supports.as_ref()).await,
                Collection::Reasons => refs.reasons = fetch(state.reasons.as_ref()).await,
            }
        }
        refs
    }

    pub fn analyst_name(&self, id: &RecordId) -> &str {
        resolve(&self.analysts, id, |a| a.name.as_str())
    }

    pub fn analyst_team(&self, id: &RecordId) -> &str {
        resolve(&self.analysts, id, |a| a.team.as_str())
    }

    pub fn support_name(&self, id: &RecordId) -> &str {
        resolve(&self.supports, id, |s| s.name.as_str())
    }

    pub fn reason_description(&self, id: &RecordId) -> &str {
        resolve(&self.reasons, id, |r| r.description.as_str())
    }

    pub fn analyst_options(&self) -> Vec<(String, String)> {
        options(&self.analysts, |a| &a.name)
    }

    pub fn support_options(&self) -> Vec<(String, String)> {
        options(&self.supports, |s| &s.name)
    }

    pub fn reason_options(&self) -> Vec<(String, String)> {
        options(&self.reasons, |r| &r.description)
    }
}

async fn fetch<T: Document>(repo: &dyn Repository<T>) -> Vec<Stored<T>> {
    repo.list().await.unwrap_or_else(|e| {
        warn!("Failed to load {} references: {e}", T::COLLECTION);
        Vec::new()
    })
}

fn options<T>(items: &[Stored<T>], label: impl Fn(&T) -> &String) -> Vec<(String, String)> {
    items
        .iter()
        .map(|item| (item.id.to_string(), label(&item.fields).clone()))
        .collect()
}

/// A record type with its own section, form and JSON endpoints.
pub trait Resource: Document {
    const SLUG: &'static str;
    const TITLE: &'static str;
    /// Noun used in the delete prompt.
    const SINGULAR: &'static str;
    const REFERENCES: &'static [Collection];

    fn repository(state: &AppState) -> Arc<dyn Repository<Self>>;

    fn defaults(identity: &Identity) -> Self;

    fn headers() -> &'static [&'static str];

    /// Plain-text cells for one table row; the renderer escapes them.
    fn cells(record: &Self, refs: &References, date_format: &str) -> Vec<String>;

    fn form_fields(fields: &Self, refs: &References) -> String;
}

pub fn view_for<T: Resource>(state: &AppState, identity: &Identity) -> RecordView<T> {
    RecordView::new(T::repository(state), T::defaults(identity))
}

pub fn configure_records_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(ui::routes::<Analyst>())
        .merge(ui::routes::<Support>())
        .merge(ui::routes::<Reason>())
        .merge(api::routes::<Analyst>())
        .merge(api::routes::<Support>())
        .merge(api::routes::<Reason>())
}
