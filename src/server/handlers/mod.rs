//! HTTP handlers for the server.

pub mod api;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::Tb365Error;

/// Pipeline error rendered as a JSON response.
///
/// Input errors become 400 with the failing stage and every message.
/// Anything else is logged and reported as a generic 500.
#[derive(Debug)]
pub struct ApiError(pub Tb365Error);

impl From<Tb365Error> for ApiError {
    fn from(e: Tb365Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_input_error() {
            let errors = match err.violations() {
                [] => vec![err.to_string()],
                items => items.to_vec(),
            };
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "stage": err.stage(),
                    "errors": errors,
                })),
            )
                .into_response()
        } else {
            log::error!("request failed at {}: {}", err.stage(), err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "stage": err.stage(),
                    "errors": ["internal error while converting document"],
                })),
            )
                .into_response()
        }
    }
}

/// Run CPU-bound pipeline work off the async executor.
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, Tb365Error> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError),
        Err(e) => Err(ApiError(Tb365Error::Server(format!("Task error: {}", e)))),
    }
}
