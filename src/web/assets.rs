use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::Embed;
use std::sync::Arc;

use crate::core::shared::state::AppState;

#[derive(Embed)]
#[folder = "assets/"]
struct PortalAssets;

async fn serve_asset(Path(path): Path<String>) -> Response {
    let Some(content) = PortalAssets::get(&path) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    (
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        content.data.into_owned(),
    )
        .into_response()
}

pub fn configure_static_routes() -> Router<Arc<AppState>> {
    Router::new().route("/static/*path", get(serve_asset))
}

pub fn list_embedded_files() -> Vec<String> {
    PortalAssets::iter().map(|f| f.to_string()).collect()
}
