//! # Conversion Pipeline
//!
//! Runs the stages in order over one request body:
//!
//! ```text
//! request body ─► request::validate ─► document::parse_document ─► html::generate ─► replace::replace_variables
//!                  schema_validation    structure/canvas/element     generation         (never fails)
//! ```
//!
//! Every call works only on its own input; batches fan out over rayon with no
//! shared state between conversions.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::content::DataSchema;
use crate::document::{parse_document, CanvasInfo, ParsedProject, Statistics};
use crate::error::Tb365Error;
use crate::html::{generate, GeneratedDocument};
use crate::options::ConvertOptions;
use crate::replace::{replace_variables, ReplacementResult};
use crate::request;

/// Project facts reported alongside a conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_name: String,
    pub version: String,
    pub saved_at: String,
    pub canvas: CanvasInfo,
    pub statistics: Statistics,
    pub variables: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<&ParsedProject> for ProjectSummary {
    fn from(project: &ParsedProject) -> Self {
        Self {
            project_name: project.project_name.clone(),
            version: project.version.clone(),
            saved_at: project.saved_at.clone(),
            canvas: project.canvas.clone(),
            statistics: project.statistics.clone(),
            variables: project.text_content.variables.clone(),
            warnings: project.validation.warnings.clone(),
        }
    }
}

/// Output of a full conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    /// Random id for correlating logs with a response.
    pub conversion_id: String,
    pub project: ProjectSummary,
    /// Template HTML before substitution.
    pub generation: GeneratedDocument,
    /// Final HTML with data substituted.
    pub result: ReplacementResult,
}

/// Data skeleton for building entry forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOutput {
    pub variables: Vec<String>,
    pub schema: DataSchema,
    pub sample_data: Value,
}

/// Accept either a full request body or a bare canvas document.
///
/// A value without a `tb365Data` key is wrapped as `{"tb365Data": value}`.
pub fn into_request(value: Value) -> Value {
    if value.get("tb365Data").is_some() {
        value
    } else {
        json!({ "tb365Data": value })
    }
}

/// Options from the body's `options` object, or defaults.
pub fn request_options(body: &Value) -> Result<ConvertOptions, Tb365Error> {
    match body.get("options") {
        None | Some(Value::Null) => Ok(ConvertOptions::default()),
        Some(raw) => serde_json::from_value(raw.clone())
            .map_err(|e| Tb365Error::Request(vec![format!("options: {}", e)])),
    }
}

/// Schema validation plus full document parsing, without generating HTML.
pub fn validate_document(body: &Value) -> Result<ParsedProject, Tb365Error> {
    if let Err(e) = request::validate(body) {
        log::warn!("rejected request: {}", e);
        return Err(e);
    }

    parse_document(&body["tb365Data"]).map_err(|e| {
        log::warn!(
            "rejected document at {} ({} problem(s))",
            e.stage,
            e.errors.len()
        );
        Tb365Error::from(e)
    })
}

/// Variable paths, nested schema and sample data for a document.
pub fn extract_schema(body: &Value) -> Result<SchemaOutput, Tb365Error> {
    let project = validate_document(body)?;
    let schema = project.text_content.schema();
    Ok(SchemaOutput {
        variables: project.text_content.variables,
        sample_data: schema.sample_data(),
        schema,
    })
}

/// Run the whole pipeline on one request body.
///
/// `options` overrides the body's own `options` object when given.
pub fn convert(body: &Value, options: Option<&ConvertOptions>) -> Result<ConvertOutput, Tb365Error> {
    let start = Instant::now();
    let conversion_id = Uuid::new_v4().to_string();

    let project = validate_document(body)?;
    let options = match options {
        Some(options) => options.clone(),
        None => request_options(body)?,
    };

    let generation = generate(&project)?;
    let data = body.get("data").unwrap_or(&Value::Null);
    let result = replace_variables(&generation.html, data, &options.replace);

    log::info!(
        "conversion {} '{}': {} elements, {}/{} variables, {} warnings, {:.1}ms",
        conversion_id,
        project.project_name,
        generation.metadata.elements_rendered,
        result.statistics.replaced_variables,
        result.statistics.total_variables,
        result.warnings.len(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(ConvertOutput {
        conversion_id,
        project: ProjectSummary::from(&project),
        generation,
        result,
    })
}

/// Convert many request bodies in parallel, one result per body, in order.
pub fn convert_batch(
    bodies: &[Value],
    options: Option<&ConvertOptions>,
) -> Vec<Result<ConvertOutput, Tb365Error>> {
    bodies.par_iter().map(|body| convert(body, options)).collect()
}
