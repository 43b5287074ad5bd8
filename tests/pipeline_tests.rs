//! End-to-end tests for the conversion pipeline.
//!
//! Each test builds a request body in JSON and checks the observable output:
//! generated markup, replacement results or the stage that rejected the input.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use tb365::{
    convert, convert_batch, extract_schema, generate, parse_document, replace_variables,
    validate_document, MissingPolicy, ParseStage, ReplaceOptions, Tb365Error,
};

// ============================================================================
// Fixtures
// ============================================================================

fn text(id: &str, z: i64, content: &str) -> Value {
    json!({
        "id": id, "name": id, "type": "text",
        "position": {"x": 10, "y": 10}, "size": {"width": 200, "height": 40},
        "zIndex": z, "visible": true, "locked": false,
        "content": content, "fontSize": 14, "fontFamily": "Arial",
        "fontWeight": "normal", "fontStyle": "normal", "textAlign": "left",
        "color": "#000000", "padding": 0
    })
}

fn rect(id: &str, z: i64) -> Value {
    json!({
        "id": id, "name": id, "type": "rectangle",
        "position": {"x": 50, "y": 50}, "size": {"width": 100, "height": 100},
        "zIndex": z, "visible": true, "locked": false,
        "fill": "#3366ff", "stroke": "#000000", "strokeWidth": 1, "cornerRadius": 0
    })
}

fn document(elements: Vec<Value>) -> Value {
    json!({
        "projectName": "Listing Flyer",
        "version": "1.0",
        "savedAt": "2024-06-01T12:00:00Z",
        "canvasState": {
            "elements": elements,
            "canvasSize": {"width": 816, "height": 1056},
            "zoom": 1,
            "snapToGrid": true,
            "gridSize": 8,
            "activeTool": "select"
        }
    })
}

fn request(elements: Vec<Value>, data: Value) -> Value {
    json!({ "tb365Data": document(elements), "data": data })
}

/// The single CSS rule for an element class, e.g. `.tb365-e0{...}`.
fn rule_for<'a>(html: &'a str, class: &str) -> &'a str {
    let start = html
        .find(&format!(".{}{{", class))
        .unwrap_or_else(|| panic!("no rule for {}", class));
    let end = html[start..].find('}').unwrap() + start;
    &html[start..=end]
}

// ============================================================================
// Positioning
// ============================================================================

#[test]
fn test_fractional_geometry_is_copied_exactly() {
    let mut nested = text("nested", 0, "a");
    nested["position"] = json!({"x": 12.25, "y": 7.5});
    nested["size"] = json!({"width": 100.125, "height": 33.3});

    let mut flat = text("flat", 0, "b");
    let obj = flat.as_object_mut().unwrap();
    obj.remove("position");
    obj.remove("size");
    obj.insert("x".into(), json!(12.25));
    obj.insert("y".into(), json!(7.5));
    obj.insert("width".into(), json!(100.125));
    obj.insert("height".into(), json!(33.3));

    let project = parse_document(&document(vec![nested, flat])).unwrap();
    let html = generate(&project).unwrap().html;

    let geometry = "left:12.25px;top:7.5px;width:100.125px;height:33.3px;z-index:0";
    assert!(rule_for(&html, "tb365-e0").contains(geometry));
    assert!(rule_for(&html, "tb365-e1").contains(geometry));
}

#[test]
fn test_flattened_coordinates_default_when_absent() {
    let mut el = rect("bare", 0);
    let obj = el.as_object_mut().unwrap();
    obj.remove("position");
    obj.remove("size");
    obj.insert("x".into(), json!(5));
    obj.insert("height".into(), json!(20));

    let project = parse_document(&document(vec![el])).unwrap();
    let e = &project.elements[0];
    assert_eq!((e.position.x, e.position.y), (5.0, 0.0));
    assert_eq!((e.size.width, e.size.height), (100.0, 20.0));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_every_invalid_element_is_reported() {
    let mut bad_rect = rect("box", 1);
    bad_rect["fill"] = json!("blue");
    let mut bad_text = text("title", 2, "x");
    bad_text["fontSize"] = json!(0);
    let doc = document(vec![text("ok", 0, "fine"), bad_rect, bad_text]);

    let err = parse_document(&doc).unwrap_err();
    assert_eq!(err.stage, ParseStage::Element);
    assert_eq!(err.errors.len(), 2);
    assert!(err.errors[0].starts_with("element-1 (box): "));
    assert!(err.errors[0].contains("fill must be hex or transparent"));
    assert!(err.errors[1].starts_with("element-2 (title): "));
    assert!(err.errors[1].contains("fontSize"));
}

#[test]
fn test_missing_canvas_width_stops_at_schema_validation() {
    let mut body = request(vec![text("t", 0, "x")], json!({}));
    body["tb365Data"]["canvasState"]["canvasSize"]
        .as_object_mut()
        .unwrap()
        .remove("width");
    // An element error that the parser would report if it ran
    body["tb365Data"]["canvasState"]["elements"][0]["fontSize"] = json!(-1);

    let err = convert(&body, None).unwrap_err();
    assert!(matches!(err, Tb365Error::Request(_)));
    assert_eq!(err.stage(), "schema_validation");
    assert_eq!(
        err.violations(),
        ["tb365Data.canvasState.canvasSize.width is required"]
    );
}

#[test]
fn test_unknown_active_tool_is_canvas_error() {
    let mut body = request(vec![], json!({}));
    body["tb365Data"]["canvasState"]["activeTool"] = json!("lasso");
    let err = validate_document(&body).unwrap_err();
    assert_eq!(err.stage(), "canvas_validation");
}

// ============================================================================
// Generation
// ============================================================================

#[test]
fn test_generation_is_deterministic() {
    let doc = document(vec![rect("bg", 0), text("t", 1, "Hi {{name}}"), rect("fg", 2)]);
    let project = parse_document(&doc).unwrap();
    let first = generate(&project).unwrap();
    let second = generate(&project).unwrap();
    assert_eq!(first.html, second.html);
    assert_eq!(first.metadata.size_bytes, second.metadata.size_bytes);
}

#[test]
fn test_higher_z_index_comes_later_in_markup() {
    // B listed first but painted above A
    let doc = document(vec![rect("B", 2), rect("A", 1)]);
    let html = generate(&parse_document(&doc).unwrap()).unwrap().html;
    let a = html.find(r#"data-element-id="A""#).unwrap();
    let b = html.find(r#"data-element-id="B""#).unwrap();
    assert!(a < b);
}

#[test]
fn test_table_renders_one_header_row() {
    let table = json!({
        "id": "tbl", "name": "Specs", "type": "table",
        "position": {"x": 0, "y": 0}, "size": {"width": 300, "height": 80},
        "zIndex": 0, "visible": true, "locked": false,
        "rows": 2, "columns": 2,
        "cells": [
            [{"content": "A", "isHeader": true}, {"content": "B", "isHeader": true}],
            [{"content": "1", "isHeader": false}, {"content": "2", "isHeader": false}]
        ],
        "cellPadding": 4, "borderWidth": 1, "borderColor": "#cccccc",
        "headerBackground": "#eeeeee", "cellBackground": "#ffffff",
        "textColor": "#111111", "fontSize": 12, "fontFamily": "Arial"
    });
    let html = generate(&parse_document(&document(vec![table])).unwrap())
        .unwrap()
        .html;

    assert_eq!(html.matches("<thead>").count(), 1);
    assert!(html.contains("<thead>\n<tr><th>A</th><th>B</th></tr>\n</thead>"));
    assert!(html.contains("<tbody>\n<tr><td>1</td><td>2</td></tr>\n</tbody>"));
    assert!(html.contains(".tb365-e0 th,.tb365-e0 td{padding:4px;border:1px solid #cccccc}"));
}

// ============================================================================
// Replacement
// ============================================================================

#[test]
fn test_minimal_document_scenario() {
    let body = request(vec![text("t", 0, "Hello {{name}}")], json!({"name": "World"}));
    let out = convert(&body, None).unwrap();
    assert!(out.result.html.contains("Hello World"));
    assert_eq!(out.result.statistics.total_variables, 1);
    assert_eq!(out.result.statistics.replaced_variables, 1);
    assert!(out.result.missing.is_empty());
}

#[test]
fn test_empty_data_changes_nothing() {
    let doc = document(vec![
        text("a", 0, "Price: {{listing.price}}"),
        text("b", 1, "{{agent.name}} & {{agent.phone}}"),
    ]);
    let project = parse_document(&doc).unwrap();
    let html = generate(&project).unwrap().html;

    let result = replace_variables(&html, &json!({}), &ReplaceOptions::default());
    assert_eq!(result.html, html);
    assert_eq!(result.missing, project.variables());
    assert_eq!(result.statistics.replaced_variables, 0);
}

#[test]
fn test_script_in_data_is_stripped() {
    let body = request(
        vec![text("t", 0, "{{title}}")],
        json!({"title": "<script>alert(1)</script>ok"}),
    );
    let out = convert(&body, None).unwrap();
    assert!(!out.result.html.contains("<script"));
    assert!(out.result.html.contains("ok"));
    let v = serde_json::to_value(&out.result).unwrap();
    assert_eq!(v["warnings"][0]["type"], "SECURITY_WARNING");
    assert_eq!(v["warnings"][0]["key"], "title");
}

#[test]
fn test_strip_policy_removes_placeholders() {
    let mut body = request(vec![text("t", 0, "[{{a}}][{{b}}]")], json!({"a": "x"}));
    body["options"] = json!({"missing": "strip"});
    let out = convert(&body, None).unwrap();
    assert!(out.result.html.contains("[x][]"));
    assert_eq!(out.result.missing, vec!["b"]);
}

#[test]
fn test_image_src_placeholder() {
    let image = json!({
        "id": "logo", "name": "Logo", "type": "image",
        "position": {"x": 0, "y": 0}, "size": {"width": 64, "height": 64},
        "zIndex": 0, "visible": true, "locked": false,
        "src": "{{agency.logoUrl}}", "opacity": 1, "fit": "contain"
    });
    let body = request(
        vec![image],
        json!({"agency": {"logoUrl": "https://cdn.example.com/l.png?a=1&b=2"}}),
    );
    let out = convert(&body, None).unwrap();
    assert!(out
        .result
        .html
        .contains(r#"src="https://cdn.example.com/l.png?a=1&amp;b=2""#));
    assert!(out.result.warnings.is_empty());
}

#[test]
fn test_split_script_tag_stays_dead_without_escaping() {
    let options = ReplaceOptions {
        escape_html: false,
        ..Default::default()
    };
    let data = json!({"title": "<scr<iframe>ipt>alert(1)</scr<iframe>ipt>ok"});
    let result = replace_variables("<p>{{title}}</p>", &data, &options);
    assert!(!result.html.to_lowercase().contains("<script"));
    assert_eq!(result.html, "<p>ok</p>");
    assert!(result.has_security_warnings());
}

#[test]
fn test_names_ids_and_title_are_not_placeholders() {
    let mut element = text("{{id}}", 0, "Hi {{name}}");
    element["name"] = json!("{{label}}");
    let mut body = request(
        vec![element],
        json!({"name": "Ana", "id": "x", "label": "y", "project": "z"}),
    );
    body["tb365Data"]["projectName"] = json!("{{project}}");

    let out = convert(&body, None).unwrap();
    assert_eq!(out.project.variables, vec!["name"]);
    assert_eq!(out.result.statistics.total_variables, 1);
    assert!(out.result.html.contains("<title>&#123;&#123;project}}</title>"));
    assert!(out.result.html.contains(r#"data-element-id="&#123;&#123;id}}""#));
    assert!(out.result.html.contains("Hi Ana"));
}

#[test]
fn test_500_variables_under_one_second() {
    let content: String = (0..500).map(|i| format!("{{{{field{}}}}} ", i)).collect();
    let mut data = serde_json::Map::new();
    for i in 0..500 {
        data.insert(format!("field{}", i), json!(format!("value {}", i)));
    }
    let body = request(vec![text("big", 0, &content)], Value::Object(data));

    let start = Instant::now();
    let out = convert(&body, Some(&Default::default())).unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));

    assert_eq!(out.result.statistics.total_variables, 500);
    assert_eq!(out.result.statistics.replaced_variables, 500);
    assert!(out.result.html.contains("value 0 value 1 "));
    assert!(out.result.html.contains("value 499"));
}

// ============================================================================
// Schema and batch
// ============================================================================

#[test]
fn test_schema_merges_shared_prefixes() {
    let body = request(
        vec![text("t", 0, "{{agency.name}} {{agency.phone}} {{price}}")],
        json!({}),
    );
    let out = extract_schema(&body).unwrap();
    assert_eq!(
        out.schema.to_json(),
        json!({"agency": {"name": "string", "phone": "string"}, "price": "string"})
    );
    assert_eq!(out.sample_data["agency"]["phone"], "[agency.phone]");
}

#[test]
fn test_parallel_batch_is_independent() {
    let bodies: Vec<Value> = (0..32)
        .map(|i| request(vec![text("t", 0, "n={{n}}")], json!({"n": i})))
        .collect();
    let opts = tb365::ConvertOptions {
        replace: ReplaceOptions {
            missing: MissingPolicy::Strip,
            ..Default::default()
        },
    };
    let results = convert_batch(&bodies, Some(&opts));
    for (i, result) in results.iter().enumerate() {
        let out = result.as_ref().unwrap();
        assert!(out.result.html.contains(&format!("n={}<", i)));
    }
}
