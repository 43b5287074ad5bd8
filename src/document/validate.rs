//! Staged document validation: structure, canvas, then elements.
//!
//! Each stage reports every violation it finds, and the first failing stage
//! aborts the parse. Element validation checks all elements before
//! reporting; a single bad element rejects the whole document.

use serde_json::{Map, Value};

use super::element::parse_element;
use super::fields::Fields;
use super::types::{ActiveTool, CanvasInfo, Element, Size};
use crate::error::{ParseError, ParseStage};

/// Required top-level fields, borrowed from the raw document.
#[derive(Debug)]
pub struct Structure<'a> {
    pub project_name: String,
    pub version: String,
    pub saved_at: Option<String>,
    pub canvas_state: &'a Map<String, Value>,
}

/// Stage 1: `projectName`, `version` and `canvasState`.
pub fn validate_structure(doc: &Value) -> Result<Structure<'_>, ParseError> {
    let Some(obj) = doc.as_object() else {
        return Err(ParseError::new(
            ParseStage::Structure,
            vec!["document must be a JSON object".to_string()],
        ));
    };

    let mut f = Fields::new(obj);
    let project_name = f.string("projectName");
    let version = f.string("version");
    let saved_at = match f.raw("savedAt") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            f.error("savedAt must be a string");
            None
        }
    };
    let canvas_state = match f.raw("canvasState") {
        Some(Value::Object(state)) => Some(state),
        Some(_) => {
            f.error("canvasState must be an object");
            None
        }
        None => {
            f.error("canvasState is required");
            None
        }
    };

    match (project_name, version, canvas_state) {
        (Some(project_name), Some(version), Some(canvas_state)) if f.is_ok() => Ok(Structure {
            project_name,
            version,
            saved_at,
            canvas_state,
        }),
        _ => Err(ParseError::new(ParseStage::Structure, f.into_errors())),
    }
}

/// Stage 2: canvas properties. Returns the element array alongside.
pub fn validate_canvas(state: &Map<String, Value>) -> Result<(CanvasInfo, &Vec<Value>), ParseError> {
    let mut f = Fields::new(state);

    let elements = match f.raw("elements") {
        Some(Value::Array(elements)) => Some(elements),
        Some(_) => {
            f.error("elements must be an array");
            None
        }
        None => {
            f.error("elements is required");
            None
        }
    };

    let size = match f.raw("canvasSize") {
        Some(Value::Object(size)) => {
            let mut inner = Fields::with_prefix(size, "canvasSize.");
            let width = inner.positive("width");
            let height = inner.positive("height");
            inner.merge_into(&mut f);
            width.zip(height).map(|(width, height)| Size { width, height })
        }
        Some(_) => {
            f.error("canvasSize must be an object");
            None
        }
        None => {
            f.error("canvasSize is required");
            None
        }
    };

    let zoom = f.positive("zoom");
    let snap_to_grid = f.boolean("snapToGrid");
    let grid_size = f.positive("gridSize");
    let active_tool = f.one_of("activeTool", ActiveTool::parse, ActiveTool::ALLOWED);

    match (elements, size, zoom, snap_to_grid, grid_size, active_tool) {
        (Some(elements), Some(size), Some(zoom), Some(snap_to_grid), Some(grid_size), Some(active_tool))
            if f.is_ok() =>
        {
            Ok((
                CanvasInfo {
                    size,
                    zoom,
                    snap_to_grid,
                    grid_size,
                    active_tool,
                },
                elements,
            ))
        }
        _ => Err(ParseError::new(ParseStage::Canvas, f.into_errors())),
    }
}

/// Stage 3: validate and normalize every element.
///
/// Never stops at the first failure: the error lists one entry per
/// violating element, each naming all of that element's problems.
pub fn validate_elements(raw: &[Value]) -> Result<Vec<Element>, ParseError> {
    let mut elements = Vec::with_capacity(raw.len());
    let mut failures = Vec::new();

    for (index, value) in raw.iter().enumerate() {
        match parse_element(index, value) {
            Ok(element) => elements.push(element),
            Err(message) => failures.push(message),
        }
    }

    if failures.is_empty() {
        Ok(elements)
    } else {
        Err(ParseError::new(ParseStage::Element, failures))
    }
}
