//! HTTP server initialization and routing

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::shared::state::AppState;
use crate::security::auth_api::{require_session_middleware, session_gate_middleware};

use super::{health_check, receive_client_errors};

/// Full application router. Layers run last-added first: the session gate resolves
/// the identity before the guard reads it.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/client-errors", post(receive_client_errors))
        .nest("/api/auth", crate::directory::auth_routes::configure())
        .merge(crate::web::configure_web_routes())
        .merge(crate::records::configure_records_routes())
        .merge(crate::tickets::configure_tickets_routes())
        .merge(crate::report::configure_report_routes())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_session_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            session_gate_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Drops expired and revoked sessions every `every`.
pub fn spawn_session_cleanup(app_state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = app_state.sessions.cleanup_expired_sessions().await {
                error!("Session cleanup failed: {e}");
            }
        }
    })
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

pub async fn run_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let cleanup_every = Duration::from_secs(app_state.config.server.session_cleanup_secs.max(1));
    let cleanup = spawn_session_cleanup(app_state.clone(), cleanup_every);

    let app = build_router(app_state);

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);

    let result = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup.abort();
    result
}
