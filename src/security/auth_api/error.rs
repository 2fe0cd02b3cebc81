use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Generic text shown on any failed sign-in.
pub const LOGIN_FAILED_MESSAGE: &str = "Falha no login. Verifique suas credenciais.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no active session")]
    MissingSession,
    #[error("session expired")]
    SessionExpired,
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::MissingSession => StatusCode::UNAUTHORIZED,
            Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::MissingSession => "missing_session",
            Self::SessionExpired => "session_expired",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::InternalError(_) => "internal_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidCredentials => LOGIN_FAILED_MESSAGE.to_string(),
            Self::MissingSession => "Authentication is required".to_string(),
            Self::SessionExpired => "Your session has expired".to_string(),
            Self::ProviderUnavailable(_) => {
                "Identity service is unavailable, please try again later".to_string()
            }
            Self::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.error_code(),
            "message": self.message()
        }));
        (status, body).into_response()
    }
}
