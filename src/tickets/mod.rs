//! Ticket log: the record view with support and reason references.

pub mod ui;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::security::auth_api::CurrentUser;
use crate::core::shared::models::{format_date, RecordId, Stored, Ticket};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::today;
use crate::directory::Identity;
use crate::records::{api, view_for, Collection, RecordView, References, Resource};
use crate::report::ReportFilter;
use crate::store::Repository;
use crate::web::html::{hidden_field, input_field, select_field, textarea_field};

impl Resource for Ticket {
    const SLUG: &'static str = "tickets";
    const TITLE: &'static str = "Tickets";
    const SINGULAR: &'static str = "ticket";
    const REFERENCES: &'static [Collection] = &[Collection::Supports, Collection::Reasons];

    fn repository(state: &AppState) -> Arc<dyn Repository<Self>> {
        state.tickets.clone()
    }

    /// Owned by the signed-in user, dated today.
    fn defaults(identity: &Identity) -> Self {
        Ticket::blank(RecordId::new(identity.uid.clone()), today())
    }

    fn headers() -> &'static [&'static str] {
        &["Data", "Suporte", "Motivo", "Observação"]
    }

    fn cells(record: &Self, refs: &References, date_format: &str) -> Vec<String> {
        vec![
            format_date(record.date, date_format),
            refs.support_name(&record.support_id).to_string(),
            refs.reason_description(&record.reason_id).to_string(),
            record.observation.clone(),
        ]
    }

    fn form_fields(fields: &Self, refs: &References) -> String {
        [
            hidden_field("analystId", fields.analyst_id.as_str()),
            input_field("Data", "date", "date", &fields.date.to_string(), true),
            select_field(
                "Suporte",
                "supportId",
                &refs.support_options(),
                fields.support_id.as_str(),
                "Selecione um suporte",
                true,
            ),
            select_field(
                "Motivo",
                "reasonId",
                &refs.reason_options(),
                fields.reason_id.as_str(),
                "Selecione um motivo",
                true,
            ),
            textarea_field("Observação", "observation", &fields.observation, true),
        ]
        .concat()
    }
}

pub fn configure_tickets_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets", get(ui::tickets_page))
        .merge(crate::records::ui::routes::<Ticket>())
        .route(
            "/api/tickets",
            get(list_tickets).post(create_ticket),
        )
        .route(
            "/api/tickets/:id",
            put(api::update::<Ticket>).delete(api::remove::<Ticket>),
        )
}

/// JSON ticket payload. `analystId` and `date` fall back to the session analyst and today.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    #[serde(default)]
    pub support_id: RecordId,
    #[serde(default)]
    pub reason_id: RecordId,
    #[serde(default)]
    pub analyst_id: Option<RecordId>,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl NewTicket {
    pub fn into_ticket(self, identity: &Identity) -> Ticket {
        let defaults = Ticket::defaults(identity);
        Ticket {
            support_id: self.support_id,
            reason_id: self.reason_id,
            analyst_id: self
                .analyst_id
                .filter(|id| !id.as_str().is_empty())
                .unwrap_or(defaults.analyst_id),
            observation: self.observation,
            date: self.date.unwrap_or(defaults.date),
        }
    }
}

/// `POST /api/tickets`: like the other collections, with the form's defaults applied.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<NewTicket>,
) -> Result<impl IntoResponse, ApiError> {
    let mut view: RecordView<Ticket> = view_for(&state, &identity);
    view.restore(None, payload.into_ticket(&identity));
    let outcome = view.submit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": outcome.id() }))))
}

/// `GET /api/tickets` with the report filter query; no filter lists everything.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<Stored<Ticket>>>, ApiError> {
    let tickets = state.ticket_query.list_filtered(&filter.to_filter()).await?;
    Ok(Json(tickets))
}
