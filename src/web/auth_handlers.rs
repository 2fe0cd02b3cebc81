//! Login form, sign-in and sign-out for the HTML pages.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::core::shared::state::AppState;
use crate::directory::auth_routes::{sign_in, sign_out};
use crate::security::auth_api::{AuthError, GateState, LOGIN_FAILED_MESSAGE};
use crate::web::html::{hidden_field, html_escape, input_field};
use crate::web::shell::render_standalone;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub redirect: Option<String>,
}

/// Accepts only same-origin absolute paths that fit in a `Location` header;
/// anything else falls back to `default`.
pub fn sanitize_redirect(raw: Option<&str>, login_path: &str, default: &str) -> String {
    match raw.map(str::trim) {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\')
                && !target.chars().any(char::is_control)
                && HeaderValue::from_str(target).is_ok()
                && !target.starts_with(login_path) =>
        {
            target.to_string()
        }
        _ => default.to_string(),
    }
}

pub fn render_login(email: &str, redirect: &str, error: Option<&str>) -> String {
    let error_html = error
        .map(|message| format!("<div class=\"alert alert-error\">{}</div>", html_escape(message)))
        .unwrap_or_default();

    let content = format!(
        "<div class=\"login-card\">\
            <h1>Portal do Analista</h1>\
            {error_html}\
            <form method=\"post\" action=\"/login\" class=\"login-form\">\
                {redirect}\
                {email}\
                {password}\
                <button type=\"submit\" class=\"btn btn-primary\">Entrar</button>\
            </form>\
        </div>",
        error_html = error_html,
        redirect = hidden_field("redirect", redirect),
        email = input_field("E-mail", "email", "email", email, true),
        password = input_field("Senha", "password", "password", "", true),
    );

    render_standalone("Login", &content)
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    gate: Option<Extension<GateState>>,
    Query(query): Query<LoginQuery>,
) -> Response {
    let target = sanitize_redirect(
        query.redirect.as_deref(),
        &state.gate.login_path,
        &state.gate.default_path,
    );

    let signed_in = gate
        .as_ref()
        .and_then(|Extension(gate)| gate.identity())
        .is_some();
    if signed_in {
        return Redirect::to(&target).into_response();
    }

    Html(render_login("", &target, None)).into_response()
}

pub async fn login_submit(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    let target = sanitize_redirect(
        form.redirect.as_deref(),
        &state.gate.login_path,
        &state.gate.default_path,
    );

    match sign_in(&state, &form.email, &form.password).await {
        Ok(session) => {
            info!("Signed in {}", session.identity.uid);
            let cookie = state.sessions.build_cookie(&session);
            ([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response()
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, LOGIN_FAILED_MESSAGE.to_string())
                }
                other => (other.status_code(), other.message()),
            };
            (status, Html(render_login(&form.email, &target, Some(&message)))).into_response()
        }
    }
}

pub async fn logout_submit(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    sign_out(&state, &headers).await;

    (
        [(header::SET_COOKIE, state.sessions.build_logout_cookie())],
        Redirect::to(&state.gate.login_path),
    )
        .into_response()
}
