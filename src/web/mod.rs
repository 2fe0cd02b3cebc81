//! HTML pages: login, layout shell, dashboard and the cadastros tabs.

pub mod assets;
pub mod auth_handlers;
pub mod html;
pub mod shell;

use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::core::shared::models::{Analyst, Reason, Support};
use crate::core::shared::state::AppState;
use crate::records::ui::load_section;
use crate::security::auth_api::CurrentUser;
use shell::{render_page, Page, DEFAULT_PAGE};

pub fn configure_web_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root_redirect))
        .route(
            "/login",
            get(auth_handlers::login_page).post(auth_handlers::login_submit),
        )
        .route("/logout", post(auth_handlers::logout_submit))
        .route("/dashboard", get(dashboard_page))
        .route("/cadastros", get(cadastros_page))
        .merge(assets::configure_static_routes())
}

async fn root_redirect() -> Redirect {
    Redirect::to(DEFAULT_PAGE.path())
}

pub async fn dashboard_page(CurrentUser(identity): CurrentUser) -> Html<String> {
    let content = format!(
        "<h2>{}</h2><div class=\"dashboard-grid\"></div>",
        Page::Dashboard.label()
    );
    Html(render_page(Page::Dashboard, &identity, &content))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CadastrosTab {
    #[default]
    Analysts,
    Supports,
    Reasons,
}

impl CadastrosTab {
    const ALL: [CadastrosTab; 3] = [Self::Analysts, Self::Supports, Self::Reasons];

    fn slug(self) -> &'static str {
        match self {
            Self::Analysts => "analysts",
            Self::Supports => "supports",
            Self::Reasons => "reasons",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Analysts => "Analistas",
            Self::Supports => "Suportes",
            Self::Reasons => "Motivos",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CadastrosQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

fn parse_tab(raw: Option<&str>) -> CadastrosTab {
    CadastrosTab::ALL
        .into_iter()
        .find(|tab| raw == Some(tab.slug()))
        .unwrap_or_default()
}

fn render_tabs(active: CadastrosTab) -> String {
    let tabs: String = CadastrosTab::ALL
        .iter()
        .map(|tab| {
            let class = if *tab == active { "tab active" } else { "tab" };
            format!(
                "<a class=\"{}\" href=\"/cadastros?tab={}\">{}</a>",
                class,
                tab.slug(),
                tab.label()
            )
        })
        .collect();
    format!("<nav class=\"tabs\">{tabs}</nav>")
}

pub async fn cadastros_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
    Query(query): Query<CadastrosQuery>,
) -> Html<String> {
    let tab = parse_tab(query.tab.as_deref());

    let section = match tab {
        CadastrosTab::Analysts => load_section::<Analyst>(&state, &identity).await,
        CadastrosTab::Supports => load_section::<Support>(&state, &identity).await,
        CadastrosTab::Reasons => load_section::<Reason>(&state, &identity).await,
    };

    let content = format!("<h2>Cadastros</h2>{}{}", render_tabs(tab), section);
    Html(render_page(Page::Cadastros, &identity, &content))
}
