use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{view_for, Confirmation, DeleteOutcome, RecordView, References, Resource};
use crate::core::shared::models::{RecordId, Stored};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::empty_as_none;
use crate::directory::Identity;
use crate::security::auth_api::CurrentUser;
use crate::web::html::{hidden_field, html_escape, render_empty_state};

/// Posted form: the record fields plus the hidden `editingId`.
#[derive(Debug, Deserialize)]
pub struct RecordForm<T> {
    #[serde(rename = "editingId", default, deserialize_with = "empty_as_none")]
    pub editing_id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: T,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub confirm: Option<String>,
}

pub fn routes<T: Resource>() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("/ui/{}", T::SLUG), get(section::<T>).post(submit::<T>))
        .route(&format!("/ui/{}/:id/edit", T::SLUG), get(edit::<T>))
        .route(&format!("/ui/{}/:id", T::SLUG), delete(remove::<T>))
}

/// Loads the collection and its references and renders the whole section.
pub async fn load_section<T: Resource>(state: &AppState, identity: &Identity) -> String {
    let mut view = view_for::<T>(state, identity);
    let _ = view.load().await;
    render_view(state, &view).await
}

async fn render_view<T: Resource>(state: &AppState, view: &RecordView<T>) -> String {
    let refs = References::load(state, T::REFERENCES).await;
    render_section(view, &refs, &state.config.report.date_format)
}

pub async fn section<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Html<String> {
    Html(load_section::<T>(&state, &identity).await)
}

pub async fn edit<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<RecordId>,
) -> Response {
    let mut view = view_for::<T>(&state, &identity);
    let _ = view.load().await;

    let status = if view.begin_edit_by_id(&id) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    (status, Html(render_view(&state, &view).await)).into_response()
}

/// Failures keep the posted buffer on screen so the same submit can be repeated.
pub async fn submit<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Form(form): Form<RecordForm<T>>,
) -> Html<String> {
    let mut view = view_for::<T>(&state, &identity);
    view.restore(form.editing_id, form.fields);

    if view.submit().await.is_err() {
        let _ = view.load().await;
    }

    Html(render_view(&state, &view).await)
}

pub async fn remove<T: Resource>(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Path(id): Path<RecordId>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let mut view = view_for::<T>(&state, &identity);
    let _ = view.load().await;

    let confirmation = Confirmation::from_flag(query.confirm.as_deref());
    match view.delete(&id, confirmation).await {
        Ok(DeleteOutcome::Cancelled) => (
            StatusCode::PRECONDITION_REQUIRED,
            Html(render_confirm_prompt::<T>(&id)),
        )
            .into_response(),
        Ok(DeleteOutcome::Deleted) | Err(_) => Html(render_view(&state, &view).await).into_response(),
    }
}

pub fn section_id<T: Resource>() -> String {
    format!("{}-section", T::SLUG)
}

pub fn render_section<T: Resource>(view: &RecordView<T>, refs: &References, date_format: &str) -> String {
    let hash = "#";
    let target = section_id::<T>();
    let editing = view.editing_id();

    let (editing_input, submit_label, cancel) = match editing {
        Some(id) => (
            hidden_field("editingId", id.as_str()),
            "Atualizar",
            format!(
                "<button type=\"button\" class=\"btn\" hx-get=\"/ui/{slug}\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\">Cancelar</button>",
                slug = T::SLUG,
                hash = hash,
                target = target,
            ),
        ),
        None => (String::new(), "Cadastrar", String::new()),
    };

    let table = if view.records().is_empty() {
        render_empty_state(
            "📋",
            "Nenhum registro",
            &format!("Nenhum {} cadastrado ainda.", T::SINGULAR),
        )
    } else {
        render_table(view.records(), refs, date_format)
    };

    format!(
        "<section id=\"{target}\" class=\"record-section\">\
            <h2>{title}</h2>\
            <form class=\"record-form\" hx-post=\"/ui/{slug}\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\" hx-disabled-elt=\"find button[type='submit']\">\
                {editing_input}\
                {fields}\
                <div class=\"form-actions\">\
                    <button type=\"submit\" class=\"btn btn-primary\">{submit_label}</button>\
                    {cancel}\
                </div>\
            </form>\
            {table}\
        </section>",
        target = target,
        title = html_escape(T::TITLE),
        slug = T::SLUG,
        hash = hash,
        editing_input = editing_input,
        fields = T::form_fields(view.form().fields(), refs),
        submit_label = submit_label,
        cancel = cancel,
        table = table,
    )
}

fn render_table<T: Resource>(records: &[Stored<T>], refs: &References, date_format: &str) -> String {
    let headers: String = T::headers()
        .iter()
        .map(|h| format!("<th>{}</th>", html_escape(h)))
        .collect();

    let rows: String = records
        .iter()
        .map(|record| render_row(record, refs, date_format))
        .collect();

    format!(
        "<table class=\"record-table\">\
            <thead><tr>{headers}<th>Ações</th></tr></thead>\
            <tbody>{rows}</tbody>\
        </table>"
    )
}

fn render_row<T: Resource>(record: &Stored<T>, refs: &References, date_format: &str) -> String {
    let hash = "#";
    let cells: String = T::cells(&record.fields, refs, date_format)
        .iter()
        .map(|cell| format!("<td>{}</td>", html_escape(cell)))
        .collect();

    format!(
        "<tr data-id=\"{id}\">\
            {cells}\
            <td class=\"actions\">\
                <button class=\"btn-sm\" hx-get=\"/ui/{slug}/{path_id}/edit\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\">Editar</button>\
                <button class=\"btn-sm btn-danger\" hx-delete=\"/ui/{slug}/{path_id}?confirm=yes\" hx-confirm=\"Tem certeza que deseja excluir este {singular}?\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\">Excluir</button>\
            </td>\
        </tr>",
        id = html_escape(record.id.as_str()),
        cells = cells,
        slug = T::SLUG,
        path_id = urlencoding::encode(record.id.as_str()),
        hash = hash,
        target = section_id::<T>(),
        singular = T::SINGULAR,
    )
}

fn render_confirm_prompt<T: Resource>(id: &RecordId) -> String {
    let hash = "#";
    format!(
        "<div class=\"confirm-prompt\">\
            <p>Tem certeza que deseja excluir este {singular}?</p>\
            <button class=\"btn btn-danger\" hx-delete=\"/ui/{slug}/{path_id}?confirm=yes\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\">Sim</button>\
            <button class=\"btn\" hx-get=\"/ui/{slug}\" hx-target=\"{hash}{target}\" hx-swap=\"outerHTML\">Não</button>\
        </div>",
        singular = T::SINGULAR,
        slug = T::SLUG,
        path_id = urlencoding::encode(id.as_str()),
        hash = hash,
        target = section_id::<T>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::models::{Analyst, Support};
    use crate::store::MemoryRepository;
    use axum::extract::FromRequest;

    fn maria() -> Stored<Analyst> {
        Stored::new(
            RecordId::new("a1"),
            Analyst {
                name: "Maria Silva".into(),
                email: "maria@x.com".into(),
                team: "N2".into(),
            },
        )
    }

    async fn parse_form(body: &'static str) -> RecordForm<Analyst> {
        let request = axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(axum::body::Body::from(body))
            .expect("request");
        let Form(form) = Form::<RecordForm<Analyst>>::from_request(request, &())
            .await
            .expect("form");
        form
    }

    #[tokio::test]
    async fn test_form_parses_blank_editing_id_as_create() {
        let form = parse_form("editingId=&name=Maria+Silva&email=maria%40x.com&team=N2").await;
        assert!(form.editing_id.is_none());
        assert_eq!(form.fields.email, "maria@x.com");

        let form = parse_form("editingId=a1&name=Maria&email=m%40x.com&team=N2").await;
        assert_eq!(form.editing_id, Some(RecordId::new("a1")));
    }

    #[tokio::test]
    async fn test_section_renders_rows_and_confirmation() {
        let repo = Arc::new(MemoryRepository::with_records(vec![maria()]));
        let mut view = RecordView::new(repo, Analyst::default());
        view.load().await.expect("load");

        let html = render_section(&view, &References::default(), "%d/%m/%Y");

        assert!(html.contains("id=\"analysts-section\""));
        assert!(html.contains("<td>Maria Silva</td><td>maria@x.com</td><td>N2</td>"));
        assert!(html.contains("hx-confirm=\"Tem certeza que deseja excluir este analista?\""));
        assert!(html.contains("hx-delete=\"/ui/analysts/a1?confirm=yes\""));
        assert!(html.contains(">Cadastrar</button>"));
        assert!(!html.contains("editingId"));
    }

    #[tokio::test]
    async fn test_section_in_edit_mode() {
        let repo = Arc::new(MemoryRepository::with_records(vec![maria()]));
        let mut view = RecordView::new(repo, Analyst::default());
        view.load().await.expect("load");
        assert!(view.begin_edit_by_id(&RecordId::new("a1")));

        let html = render_section(&view, &References::default(), "%d/%m/%Y");

        assert!(html.contains("name=\"editingId\" value=\"a1\""));
        assert!(html.contains(">Atualizar</button>"));
        assert!(html.contains(">Cancelar</button>"));
        assert!(html.contains("value=\"Maria Silva\""));
    }

    #[tokio::test]
    async fn test_support_table_resolves_analyst_or_na() {
        let supports = vec![
            Stored::new(
                RecordId::new("s1"),
                Support {
                    name: "Chat".into(),
                    analyst_id: "a1".into(),
                },
            ),
            Stored::new(
                RecordId::new("s2"),
                Support {
                    name: "Voz".into(),
                    analyst_id: "gone".into(),
                },
            ),
        ];
        let repo = Arc::new(MemoryRepository::with_records(supports));
        let mut view = RecordView::new(repo, Support::default());
        view.load().await.expect("load");
        let refs = References {
            analysts: vec![maria()],
            ..References::default()
        };

        let html = render_section(&view, &refs, "%d/%m/%Y");

        assert!(html.contains("<td>Chat</td><td>Maria Silva</td>"));
        assert!(html.contains("<td>Voz</td><td>N/A</td>"));
    }

    #[test]
    fn test_empty_collection_shows_empty_state() {
        let view = RecordView::new(Arc::new(MemoryRepository::<Analyst>::new()), Analyst::default());
        let html = render_section(&view, &References::default(), "%d/%m/%Y");
        assert!(html.contains("Nenhum analista cadastrado ainda."));
    }
}
