//! # Document Parser
//!
//! Validates a saved canvas document and builds the [`ParsedProject`] the
//! generator consumes.
//!
//! Parsing runs in strict order, and the first failing stage aborts with a
//! stage-tagged [`ParseError`]:
//!
//! 1. **Structure**: `projectName`, `version`, `canvasState`
//! 2. **Canvas**: `elements`, `canvasSize`, `zoom`, `snapToGrid`, `gridSize`, `activeTool`
//! 3. **Elements**: base and type-specific fields of every element; all
//!    failures are collected before reporting
//!
//! Elements that pass come out normalized (nested coordinates, typed enums,
//! `renderOrder` = source index), and the derived views are computed from them.
//!
//! ```
//! use serde_json::json;
//!
//! let doc = json!({
//!     "projectName": "Flyer",
//!     "version": "1.0",
//!     "canvasState": {
//!         "elements": [{
//!             "id": "title", "name": "Title", "type": "text",
//!             "x": 40, "y": 40, "width": 400, "height": 60,
//!             "zIndex": 1, "visible": true, "locked": false,
//!             "content": "Hello {{name}}", "fontSize": 32, "fontFamily": "Arial",
//!             "fontWeight": "bold", "fontStyle": "normal", "textAlign": "left",
//!             "color": "#222222", "padding": 0
//!         }],
//!         "canvasSize": {"width": 800, "height": 600},
//!         "zoom": 1, "snapToGrid": true, "gridSize": 10, "activeTool": "select"
//!     }
//! });
//!
//! let project = tb365::document::parse_document(&doc).unwrap();
//! assert_eq!(project.elements[0].position.x, 40.0);
//! assert_eq!(project.variables(), ["name"]);
//! ```

mod analyze;
mod element;
mod fields;
pub mod types;
mod validate;

pub use types::*;

use chrono::Utc;
use serde_json::Value;

use crate::content;
use crate::error::ParseError;

/// Validate and normalize a canvas document (the `tb365Data` object).
pub fn parse_document(doc: &Value) -> Result<ParsedProject, ParseError> {
    let structure = validate::validate_structure(doc)?;
    let (canvas, raw_elements) = validate::validate_canvas(structure.canvas_state)?;
    let elements = validate::validate_elements(raw_elements)?;

    let parsed_at = Utc::now().to_rfc3339();
    let warnings = analyze::warnings(&elements, &canvas);
    let project = ParsedProject {
        project_name: structure.project_name,
        version: structure.version,
        saved_at: structure.saved_at.unwrap_or_else(|| parsed_at.clone()),
        element_groups: analyze::group_elements(&elements),
        text_content: content::analyze(&elements),
        styles: analyze::styles(&elements),
        layout: Layout {
            bounds: analyze::bounds(&elements),
            layers: analyze::layers(&elements),
        },
        statistics: analyze::statistics(&elements),
        validation: Validation {
            is_valid: true,
            errors: Vec::new(),
            warnings,
            parsed_at,
        },
        canvas,
        elements,
    };

    log::debug!(
        "parsed '{}' v{}: {} elements, {} variables, {} warnings",
        project.project_name,
        project.version,
        project.statistics.total_elements,
        project.text_content.variables.len(),
        project.validation.warnings.len()
    );

    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseStage;
    use serde_json::json;

    fn text_element(id: &str, z: i64) -> Value {
        json!({
            "id": id, "name": id, "type": "text",
            "position": {"x": 10, "y": 10}, "size": {"width": 100, "height": 20},
            "zIndex": z, "visible": true, "locked": false,
            "content": format!("{{{{{}.value}}}}", id), "fontSize": 14, "fontFamily": "Arial",
            "fontWeight": "normal", "fontStyle": "normal", "textAlign": "left",
            "color": "#000000", "padding": 2
        })
    }

    fn document(elements: Vec<Value>) -> Value {
        json!({
            "projectName": "Test",
            "version": "2.1",
            "savedAt": "2024-05-01T10:00:00Z",
            "canvasState": {
                "elements": elements,
                "canvasSize": {"width": 800, "height": 600},
                "zoom": 1.5,
                "snapToGrid": true,
                "gridSize": 20,
                "activeTool": "text"
            }
        })
    }

    #[test]
    fn test_parse_builds_derived_views() {
        let project = parse_document(&document(vec![text_element("b", 3), text_element("a", 1)])).unwrap();
        assert_eq!(project.project_name, "Test");
        assert_eq!(project.saved_at, "2024-05-01T10:00:00Z");
        assert_eq!(project.canvas.zoom, 1.5);
        assert_eq!(project.elements[0].render_order, 0);
        assert_eq!(project.elements[1].render_order, 1);
        assert_eq!(project.element_groups.text, vec!["b", "a"]);
        let order: Vec<_> = project.paint_order().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(project.variables(), ["b.value", "a.value"]);
        assert!(project.validation.is_valid);
        assert!(project.validation.warnings.is_empty());
    }

    #[test]
    fn test_stage_order() {
        // Structure errors win even when the canvas is also broken
        let doc = json!({"version": "1", "canvasState": {"canvasSize": {}}});
        assert_eq!(parse_document(&doc).unwrap_err().stage, ParseStage::Structure);

        let mut doc = document(vec![json!({})]);
        doc["canvasState"]["gridSize"] = json!(0);
        assert_eq!(parse_document(&doc).unwrap_err().stage, ParseStage::Canvas);

        let doc = document(vec![text_element("ok", 0), json!({"id": "bad"})]);
        let err = parse_document(&doc).unwrap_err();
        assert_eq!(err.stage, ParseStage::Element);
        assert_eq!(err.errors.len(), 1);
        assert!(err.errors[0].starts_with("element-1 (bad): "));
    }

    #[test]
    fn test_serialized_shape() {
        let project = parse_document(&document(vec![text_element("a", 0)])).unwrap();
        let v = serde_json::to_value(&project).unwrap();
        let el = &v["elements"][0];
        assert_eq!(el["type"], "text");
        assert_eq!(el["renderOrder"], 0);
        assert_eq!(el["styling"]["fontFamily"], "Arial");
        assert_eq!(el["position"]["x"], 10.0);
        assert_eq!(v["canvas"]["activeTool"], "text");
        assert_eq!(v["statistics"]["elementTypes"]["text"], 1);
        assert_eq!(v["textContent"]["variables"][0], "a.value");
        assert_eq!(v["layout"]["layers"][0]["isBackground"], true);
    }

    #[test]
    fn test_missing_saved_at_uses_parse_time() {
        let mut doc = document(vec![]);
        doc.as_object_mut().unwrap().remove("savedAt");
        let project = parse_document(&doc).unwrap();
        assert_eq!(project.saved_at, project.validation.parsed_at);
        assert_eq!(project.validation.warnings, vec!["document has no elements"]);
        assert_eq!(project.layout.bounds, Bounds::default());
    }
}
