//! API server setup.

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handlers::{dashboard_handler, health_handler, profile_handler, upload_pdf_handler},
    types::ApiState,
};

/// Comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "PLAINLEGAL_CORS_ORIGINS";

/// Build the router.
///
/// The hard body limit is the upload ceiling plus room for multipart
/// framing. The finer per-file check happens in the upload gate so the
/// caller gets the usual 400 rather than a bare 413.
pub fn create_router(state: ApiState) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .route("/api/upload-pdf", post(upload_pdf_handler))
        .route("/api/auth/profile", get(profile_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let permissive = || CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let Ok(origins_str) = std::env::var(CORS_ORIGINS_ENV) else {
        tracing::warn!(
            "CORS configured to allow all origins (default). Set {} to a comma-separated \
             list of allowed origins for production.",
            CORS_ORIGINS_ENV
        );
        return permissive();
    };

    let origins: Vec<_> = origins_str
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "{} set but empty/invalid, falling back to permissive CORS",
            CORS_ORIGINS_ENV
        );
        return permissive();
    }

    tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// In-flight requests are allowed to finish once the signal arrives.
pub async fn serve(addr: SocketAddr, state: ApiState) -> std::io::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
