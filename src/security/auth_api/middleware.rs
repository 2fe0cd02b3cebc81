use super::{config::PathKind, error::AuthError, types::GateState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::shared::state::AppState;
use crate::directory::Identity;
use crate::web::shell::{decide, render_placeholder, RouteDecision, ShellState};

pub const HX_REDIRECT: &str = "HX-Redirect";

/// Resolves the session cookie and stores the outcome as a [`GateState`] extension.
pub async fn session_gate_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut gate = GateState::default();
    gate.begin();

    let headers = request.headers().clone();
    let identity = resolve_identity(&state, &headers).await;
    gate.finish(identity);

    request.extensions_mut().insert(gate);
    next.run(request).await
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    let session_id = state.sessions.session_id_from_headers(headers)?;

    match state.sessions.resolve(&session_id).await {
        Ok(Some(session)) => Some(session.identity),
        Ok(None) => {
            debug!("Session cookie present but not active");
            None
        }
        Err(e) => {
            warn!("Session lookup failed: {e}");
            None
        }
    }
}

/// Turns away requests the gate resolved to nobody, answering each path kind in its own format.
pub async fn require_session_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let kind = state.gate.classify(&path);

    let gate = request
        .extensions()
        .get::<GateState>()
        .cloned()
        .unwrap_or_default();

    match kind {
        PathKind::Public => next.run(request).await,
        PathKind::Api => {
            if gate.identity().is_none() {
                return AuthError::MissingSession.into_response();
            }
            next.run(request).await
        }
        PathKind::Fragment => {
            if gate.identity().is_none() {
                return fragment_unauthorized(&state.gate.login_path);
            }
            next.run(request).await
        }
        PathKind::Page => {
            let target = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| path.clone());

            match decide(&target, &ShellState::from(&gate)) {
                RouteDecision::Placeholder => Html(render_placeholder()).into_response(),
                RouteDecision::Login { return_to } => {
                    debug!("No session for {path}, sending to login");
                    Redirect::to(&state.gate.login_url(&return_to)).into_response()
                }
                RouteDecision::Redirect(to) => Redirect::to(&to).into_response(),
                RouteDecision::Render(_) | RouteDecision::NotFound => next.run(request).await,
            }
        }
    }
}

fn fragment_unauthorized(login_path: &str) -> Response {
    let mut response = AuthError::MissingSession.into_response();
    if let Ok(value) = HeaderValue::from_str(login_path) {
        response.headers_mut().insert(HX_REDIRECT, value);
    }
    response
}
