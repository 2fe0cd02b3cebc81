use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{reason_column, ReportFilter, ReportView};
use crate::core::shared::error::ApiError;
use crate::core::shared::models::format_date;
use crate::core::shared::state::AppState;
use crate::records::References;
use crate::security::auth_api::CurrentUser;
use crate::sheet::{ExportFile, ExportFormat};
use crate::web::html::{html_escape, input_field, render_empty_state, select_field};
use crate::web::shell::{render_page, Page};

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

pub async fn report_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Html<String> {
    let refs = References::load(&state, ReportView::REFERENCES).await;
    let content = format!(
        "<h2>Relatório</h2>{}<div id=\"report-results\"></div>",
        render_filters(&ReportFilter::default(), &refs)
    );
    Html(render_page(Page::Relatorio, &identity, &content))
}

pub async fn report_results(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Html<String> {
    let mut view = ReportView::new(state.ticket_query.clone(), filter);
    view.load_references(&state).await;
    let _ = view.search().await;

    Html(render_results(&view, &state.config.report.date_format))
}

/// Runs the search again and downloads the rows; 409 when nothing matches.
pub async fn report_export(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
    Query(format): Query<FormatQuery>,
) -> Result<ExportFile, ApiError> {
    let mut view = ReportView::new(state.ticket_query.clone(), filter);
    view.load_references(&state).await;
    view.search().await?;

    let report = &state.config.report;
    let rows = view.export_rows(&report.date_format, reason_column(&state));
    Ok(ExportFile::build(
        &rows,
        &report.export_name,
        &report.sheet_name,
        format.format,
    )?)
}

pub fn render_filters(filter: &ReportFilter, refs: &References) -> String {
    let hash = "#";
    let date_value = |date: Option<chrono::NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();

    format!(
        "<form class=\"filter-form\" hx-get=\"/ui/report\" hx-target=\"{hash}report-results\" hx-swap=\"innerHTML\" hx-indicator=\"{hash}report-busy\" hx-disabled-elt=\"find button[type='submit']\">\
            {start}\
            {end}\
            {analyst}\
            {support}\
            <div class=\"form-actions\">\
                <button type=\"submit\" class=\"btn btn-primary\">Buscar</button>\
                <span id=\"report-busy\" class=\"htmx-indicator\">Buscando...</span>\
            </div>\
        </form>",
        hash = hash,
        start = input_field("Data Inicial", "startDate", "date", &date_value(filter.start_date), false),
        end = input_field("Data Final", "endDate", "date", &date_value(filter.end_date), false),
        analyst = select_field(
            "Analista",
            "analystId",
            &refs.analyst_options(),
            filter.analyst_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
            "Todos",
            false,
        ),
        support = select_field(
            "Suporte",
            "supportId",
            &refs.support_options(),
            filter.support_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
            "Todos",
            false,
        ),
    )
}

pub fn render_results(view: &ReportView, date_format: &str) -> String {
    if !view.can_export() {
        return render_empty_state(
            "🔍",
            "Nenhum ticket encontrado",
            "Ajuste os filtros e busque novamente.",
        );
    }

    let refs = view.references();
    let rows: String = view
        .results()
        .iter()
        .map(|stored| {
            let ticket = &stored.fields;
            format!(
                "<tr data-id=\"{}\">\
                    <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                </tr>",
                html_escape(stored.id.as_str()),
                html_escape(&format_date(ticket.date, date_format)),
                html_escape(refs.support_name(&ticket.support_id)),
                html_escape(refs.analyst_name(&ticket.analyst_id)),
                html_escape(refs.analyst_team(&ticket.analyst_id)),
                html_escape(refs.reason_description(&ticket.reason_id)),
                html_escape(&ticket.observation),
            )
        })
        .collect();

    let query = view.filter().query_string();
    let separator = if query.is_empty() { "" } else { "&" };

    format!(
        "<div class=\"report-actions\">\
            <a class=\"btn btn-primary\" href=\"/relatorio/export?{query}{sep}format=xlsx\">Exportar Excel</a>\
            <a class=\"btn\" href=\"/relatorio/export?{query}{sep}format=csv\">Exportar CSV</a>\
        </div>\
        <table class=\"record-table\">\
            <thead><tr>\
                <th>Data</th><th>Suporte</th><th>Analista</th><th>Equipe</th><th>Motivo</th><th>Observação</th>\
            </tr></thead>\
            <tbody>{rows}</tbody>\
        </table>",
        query = html_escape(&query),
        sep = separator,
        rows = rows,
    )
}
