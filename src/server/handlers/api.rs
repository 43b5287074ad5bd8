//! Pipeline endpoints.
//!
//! Bodies are read as raw bytes and parsed here so malformed JSON gets the
//! same `{success, stage, errors}` shape as every other input error.

use axum::{body::Bytes, Json};
use serde::Serialize;
use serde_json::Value;

use crate::document::ParsedProject;
use crate::pipeline::{self, ConvertOutput, SchemaOutput};

use super::{run_blocking, ApiError};

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(flatten)]
    pub output: ConvertOutput,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub success: bool,
    #[serde(flatten)]
    pub output: SchemaOutput,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub success: bool,
    pub project: ParsedProject,
}

fn parse_body(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError(e.into()))
}

/// Handle POST /api/convert - full pipeline over `{tb365Data, data, options}`.
pub async fn convert(body: Bytes) -> Result<Json<ConvertResponse>, ApiError> {
    let body = parse_body(&body)?;
    let output = run_blocking(move || pipeline::convert(&body, None)).await?;
    Ok(Json(ConvertResponse {
        success: true,
        output,
    }))
}

/// Handle POST /api/schema - variables, data schema and sample data.
///
/// Accepts a full request body or a bare canvas document.
pub async fn schema(body: Bytes) -> Result<Json<SchemaResponse>, ApiError> {
    let body = pipeline::into_request(parse_body(&body)?);
    let output = run_blocking(move || pipeline::extract_schema(&body)).await?;
    Ok(Json(SchemaResponse {
        success: true,
        output,
    }))
}

/// Handle POST /api/validate - parse only, returning the project model.
///
/// Accepts a full request body or a bare canvas document.
pub async fn validate(body: Bytes) -> Result<Json<ValidateResponse>, ApiError> {
    let body = pipeline::into_request(parse_body(&body)?);
    let project = run_blocking(move || pipeline::validate_document(&body)).await?;
    Ok(Json(ValidateResponse {
        success: true,
        project,
    }))
}
