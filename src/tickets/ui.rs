use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::core::shared::models::Ticket;
use crate::core::shared::state::AppState;
use crate::records::ui::load_section;
use crate::security::auth_api::CurrentUser;
use crate::web::shell::{render_page, Page};

pub async fn tickets_page(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> Html<String> {
    let section = load_section::<Ticket>(&state, &identity).await;
    Html(render_page(Page::Tickets, &identity, &section))
}
