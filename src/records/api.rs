//! JSON endpoints per collection, driven through the same [`RecordView`] as the HTML forms.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{view_for, Confirmation, DeleteOutcome, RecordView, Resource};
use crate::core::shared::error::ApiError;
use crate::core::shared::models::{RecordId, Stored};
use crate::core::shared::state::AppState;
use crate::security::auth_api::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub confirm: Option<String>,
}

pub fn routes<T: Resource>() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("/api/{}", T::SLUG), get(list::<T>).post(create::<T>))
        .route(&format!("/api/{}/:id", T::SLUG), put(update::<T>).delete(remove::<T>))
}

pub async fn list<T: Resource>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Stored<T>>>, ApiError> {
    Ok(Json(T::repository(&state).list().await?))
}

pub async fn create<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(fields): Json<T>,
) -> Result<impl IntoResponse, ApiError> {
    let mut view: RecordView<T> = view_for(&state, &identity);
    view.restore(None, fields);
    let outcome = view.submit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": outcome.id() }))))
}

pub async fn update<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<RecordId>,
    Json(fields): Json<T>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut view: RecordView<T> = view_for(&state, &identity);
    view.restore(Some(id), fields);
    let outcome = view.submit().await?;

    Ok(Json(json!({ "id": outcome.id() })))
}

/// Requires `?confirm=true`; anything else answers 428 and deletes nothing.
pub async fn remove<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<RecordId>,
    Query(query): Query<ConfirmQuery>,
) -> Result<StatusCode, ApiError> {
    let mut view: RecordView<T> = view_for(&state, &identity);

    match view
        .delete(&id, Confirmation::from_flag(query.confirm.as_deref()))
        .await?
    {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Cancelled => Err(ApiError::ConfirmationRequired),
    }
}
