use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::shared::state::AppState;
use crate::security::auth_api::{AuthError, CurrentUser};
use crate::security::session::Session;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Checks the credentials with the configured provider and opens a session.
pub async fn sign_in(state: &AppState, identifier: &str, secret: &str) -> Result<Session, AuthError> {
    info!("Login attempt via {} provider", state.identity.name());

    let identity = match state.identity.sign_in(identifier, secret).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!("Login failed: {e}");
            return Err(e);
        }
    };

    state.sessions.create_session(identity).await.map_err(|e| {
        error!("Failed to create session: {e}");
        AuthError::InternalError(e.to_string())
    })
}

/// Revokes the session named by the request cookie, if any. Always succeeds for the caller.
pub async fn sign_out(state: &AppState, headers: &HeaderMap) {
    let Some(session_id) = state.sessions.session_id_from_headers(headers) else {
        return;
    };

    match state.sessions.validate_session(&session_id).await {
        Ok(Some(session)) => {
            if let Err(e) = state.identity.sign_out(&session.identity).await {
                warn!("Provider sign-out failed: {e}");
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Session lookup failed during logout: {e}"),
    }

    if let Err(e) = state.sessions.revoke_session(&session_id).await {
        warn!("Failed to revoke session: {e}");
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let session = sign_in(&state, &req.email, &req.password).await?;
    let cookie = state.sessions.build_cookie(&session);

    let body = LoginResponse {
        success: true,
        uid: session.identity.uid.clone(),
        email: session.identity.email.clone(),
        display_name: session.identity.display_name.clone(),
        expires_in: session.time_until_expiry().num_seconds().max(0),
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    sign_out(&state, &headers).await;

    (
        StatusCode::OK,
        [(header::SET_COOKIE, state.sessions.build_logout_cookie())],
        Json(LogoutResponse {
            success: true,
            message: "Signed out".to_string(),
        }),
    )
}

pub async fn get_current_user(CurrentUser(identity): CurrentUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        uid: identity.uid,
        email: identity.email,
        display_name: identity.display_name,
    })
}
