//! # HTTP Server for Template Conversion
//!
//! Exposes the conversion pipeline over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! tb365 serve --listen 0.0.0.0:8080
//! ```
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | GET | `/health` | - |
//! | POST | `/api/convert` | `{tb365Data, data?, options?}` |
//! | POST | `/api/schema` | request body or bare document |
//! | POST | `/api/validate` | request body or bare document |
//!
//! Input errors answer 400 with `{success: false, stage, errors}`; oversized
//! bodies answer 413.

mod handlers;
mod state;

pub use state::{ServerConfig, DEFAULT_BODY_LIMIT};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::Tb365Error;
use state::AppState;

/// Build the application router.
pub fn router(config: ServerConfig) -> Router {
    let limit = config.body_limit_bytes;
    let app_state = Arc::new(AppState::new(config));

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/convert", post(handlers::api::convert))
        .route("/api/schema", post(handlers::api::schema))
        .route("/api/validate", post(handlers::api::validate))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .with_state(app_state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use tb365::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), tb365::error::Tb365Error> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), Tb365Error> {
    let listen_addr = config.listen_addr.clone();
    log::info!(
        "tb365 server listening on {} (body limit {} bytes)",
        listen_addr,
        config.body_limit_bytes
    );
    let app = router(config);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| Tb365Error::Server(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Tb365Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
