//! Filtered ticket report joined against the reference collections, with spreadsheet export.

pub mod ui;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::shared::error::ApiError;
use crate::core::shared::models::{format_date, RecordId, Stored, Ticket};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::empty_as_none;
use crate::records::{Collection, References};
use crate::sheet::SheetRow;
use crate::store::{StoreError, TicketFilter, TicketQuery};

/// Report filter buffer. Blank query values count as not supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub analyst_id: Option<RecordId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub support_id: Option<RecordId>,
}

impl ReportFilter {
    /// The date range applies only when both dates are set.
    pub fn to_filter(&self) -> TicketFilter {
        let mut filter = TicketFilter::new().with_bounds(self.start_date, self.end_date);
        if let Some(analyst_id) = &self.analyst_id {
            filter = filter.with_analyst(analyst_id.clone());
        }
        if let Some(support_id) = &self.support_id {
            filter = filter.with_support(support_id.clone());
        }
        filter
    }

    /// Query string carrying the supplied values, for the export link.
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(date) = self.start_date {
            pairs.push(format!("startDate={date}"));
        }
        if let Some(date) = self.end_date {
            pairs.push(format!("endDate={date}"));
        }
        if let Some(id) = &self.analyst_id {
            pairs.push(format!("analystId={}", urlencoding::encode(id.as_str())));
        }
        if let Some(id) = &self.support_id {
            pairs.push(format!("supportId={}", urlencoding::encode(id.as_str())));
        }
        pairs.join("&")
    }
}

/// How the export fills the "Motivo" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonColumn {
    RawId,
    Description,
}

pub struct ReportView {
    query: Arc<dyn TicketQuery>,
    refs: References,
    filter: ReportFilter,
    results: Vec<Stored<Ticket>>,
    busy: bool,
}

impl ReportView {
    pub const REFERENCES: &'static [Collection] =
        &[Collection::Analysts, Collection::Supports, Collection::Reasons];

    pub fn new(query: Arc<dyn TicketQuery>, filter: ReportFilter) -> Self {
        Self {
            query,
            refs: References::default(),
            filter,
            results: Vec::new(),
            busy: false,
        }
    }

    pub async fn load_references(&mut self, state: &AppState) {
        self.refs = References::load(state, Self::REFERENCES).await;
    }

    pub fn set_references(&mut self, refs: References) {
        self.refs = refs;
    }

    pub fn references(&self) -> &References {
        &self.refs
    }

    pub fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    pub fn results(&self) -> &[Stored<Ticket>] {
        &self.results
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Replaces the results. A failed query keeps the previous ones.
    pub async fn search(&mut self) -> Result<(), StoreError> {
        self.busy = true;
        let result = self.query.list_filtered(&self.filter.to_filter()).await;
        self.busy = false;

        match result {
            Ok(tickets) => {
                info!("Report search returned {} tickets", tickets.len());
                self.results = tickets;
                Ok(())
            }
            Err(e) => {
                warn!("Report search failed: {e}");
                Err(e)
            }
        }
    }

    pub fn can_export(&self) -> bool {
        !self.results.is_empty()
    }

    /// Rows in key order Data, Suporte, Analista, Equipe, Motivo, Observação.
    pub fn export_rows(&self, date_format: &str, reason: ReasonColumn) -> Vec<SheetRow> {
        self.results
            .iter()
            .map(|stored| {
                let ticket = &stored.fields;
                let motivo = match reason {
                    ReasonColumn::RawId => ticket.reason_id.to_string(),
                    ReasonColumn::Description => {
                        self.refs.reason_description(&ticket.reason_id).to_string()
                    }
                };

                SheetRow::new()
                    .with("Data", format_date(ticket.date, date_format))
                    .with("Suporte", self.refs.support_name(&ticket.support_id))
                    .with("Analista", self.refs.analyst_name(&ticket.analyst_id))
                    .with("Equipe", self.refs.analyst_team(&ticket.analyst_id))
                    .with("Motivo", motivo)
                    .with("Observação", ticket.observation.clone())
            })
            .collect()
    }
}

pub fn reason_column(state: &AppState) -> ReasonColumn {
    if state.config.report.resolve_reason_in_export {
        ReasonColumn::Description
    } else {
        ReasonColumn::RawId
    }
}

pub fn configure_report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/relatorio", get(ui::report_page))
        .route("/relatorio/export", get(ui::report_export))
        .route("/ui/report", get(ui::report_results))
        .route("/api/report", get(report_rows))
}

/// `GET /api/report`: the export rows for a filter, as JSON objects.
pub async fn report_rows(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Vec<SheetRow>>, ApiError> {
    let mut view = ReportView::new(state.ticket_query.clone(), filter);
    view.load_references(&state).await;
    view.search().await?;

    Ok(Json(view.export_rows(
        &state.config.report.date_format,
        reason_column(&state),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::models::{Analyst, Reason, Support};
    use crate::store::MemoryRepository;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    fn ticket(id: &str, day: &str, analyst: &str, support: &str) -> Stored<Ticket> {
        Stored::new(
            RecordId::new(id),
            Ticket {
                support_id: support.into(),
                reason_id: "r1".into(),
                analyst_id: analyst.into(),
                observation: format!("obs {id}"),
                date: date(day),
            },
        )
    }

    fn query() -> Arc<dyn TicketQuery> {
        Arc::new(MemoryRepository::with_records(vec![
            ticket("t1", "2023-12-31", "a1", "s1"),
            ticket("t2", "2024-01-01", "a1", "s1"),
            ticket("t3", "2024-01-31", "a2", "s2"),
            ticket("t4", "2024-02-01", "a1", "s2"),
        ]))
    }

    fn refs() -> References {
        References {
            analysts: vec![Stored::new(
                RecordId::new("a1"),
                Analyst {
                    name: "Maria Silva".into(),
                    email: "maria@x.com".into(),
                    team: "N2".into(),
                },
            )],
            supports: vec![Stored::new(
                RecordId::new("s1"),
                Support {
                    name: "Chat".into(),
                    analyst_id: "a1".into(),
                },
            )],
            reasons: vec![Stored::new(
                RecordId::new("r1"),
                Reason {
                    description: "Senha".into(),
                },
            )],
        }
    }

    fn ids(view: &ReportView) -> Vec<&str> {
        view.results().iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let filter = ReportFilter {
            start_date: Some(date("2024-01-01")),
            end_date: Some(date("2024-01-31")),
            ..ReportFilter::default()
        };
        let mut view = ReportView::new(query(), filter);
        view.search().await.expect("search");

        assert_eq!(ids(&view), vec!["t2", "t3"]);
    }

    #[tokio::test]
    async fn test_single_bound_is_ignored() {
        let filter = ReportFilter {
            start_date: Some(date("2024-01-15")),
            ..ReportFilter::default()
        };
        let mut view = ReportView::new(query(), filter);
        view.search().await.expect("search");

        assert_eq!(ids(&view).len(), 4);
    }

    #[tokio::test]
    async fn test_analyst_and_support_are_conjunctive() {
        let filter = ReportFilter {
            analyst_id: Some("a1".into()),
            support_id: Some("s2".into()),
            ..ReportFilter::default()
        };
        let mut view = ReportView::new(query(), filter);
        view.search().await.expect("search");

        assert_eq!(ids(&view), vec!["t4"]);
    }

    #[tokio::test]
    async fn test_export_only_after_results() {
        let filter = ReportFilter {
            analyst_id: Some("nobody".into()),
            ..ReportFilter::default()
        };
        let mut view = ReportView::new(query(), filter);
        assert!(!view.can_export());

        view.search().await.expect("search");
        assert!(!view.can_export());
        assert!(!view.is_busy());
    }

    #[tokio::test]
    async fn test_export_rows_keep_raw_reason_id() {
        let filter = ReportFilter {
            start_date: Some(date("2024-01-01")),
            end_date: Some(date("2024-01-31")),
            ..ReportFilter::default()
        };
        let mut view = ReportView::new(query(), filter);
        view.set_references(refs());
        view.search().await.expect("search");

        let rows = view.export_rows("%d/%m/%Y", ReasonColumn::RawId);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].keys().collect::<Vec<_>>(),
            vec!["Data", "Suporte", "Analista", "Equipe", "Motivo", "Observação"]
        );
        assert_eq!(rows[0].get("Data"), Some("01/01/2024"));
        assert_eq!(rows[0].get("Suporte"), Some("Chat"));
        assert_eq!(rows[0].get("Analista"), Some("Maria Silva"));
        assert_eq!(rows[0].get("Equipe"), Some("N2"));
        assert_eq!(rows[0].get("Motivo"), Some("r1"));
        assert_eq!(rows[1].get("Analista"), Some("N/A"));
        assert_eq!(rows[1].get("Suporte"), Some("N/A"));

        let rows = view.export_rows("%d/%m/%Y", ReasonColumn::Description);
        assert_eq!(rows[0].get("Motivo"), Some("Senha"));
    }

    #[test]
    fn test_query_string_skips_missing_values() {
        let filter = ReportFilter {
            start_date: Some(date("2024-01-01")),
            end_date: Some(date("2024-01-31")),
            support_id: Some("s 1".into()),
            ..ReportFilter::default()
        };
        assert_eq!(
            filter.query_string(),
            "startDate=2024-01-01&endDate=2024-01-31&supportId=s%201"
        );
        assert_eq!(ReportFilter::default().query_string(), "");
    }
}
