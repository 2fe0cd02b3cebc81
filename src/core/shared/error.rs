use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::core::shared::models::ValidationError;
use crate::records::SubmitError;
use crate::sheet::export::ExportError;
use crate::store::StoreError;

/// Errors surfaced by the JSON API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("deletion must be confirmed with ?confirm=true")]
    ConfirmationRequired,
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(e) => Self::Validation(e),
            SubmitError::Store(e) => Self::Store(e),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(StoreError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
            Self::Export(ExportError::Empty) => StatusCode::CONFLICT,
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Store(StoreError::NotFound { .. }) => "not_found",
            Self::Store(StoreError::Unavailable(_)) => "storage_unavailable",
            Self::Store(StoreError::Backend(_)) => "storage_error",
            Self::ConfirmationRequired => "confirmation_required",
            Self::Export(ExportError::Empty) => "nothing_to_export",
            Self::Export(_) => "export_failed",
        }
    }

    /// Backend details stay in the log.
    pub fn message(&self) -> String {
        match self {
            Self::Export(ExportError::Empty) => "Nenhum resultado para exportar".to_string(),
            Self::Store(StoreError::Backend(_)) | Self::Export(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("API request failed: {self}");
        }
        let body = Json(json!({
            "error": self.error_code(),
            "message": self.message()
        }));
        (status, body).into_response()
    }
}
