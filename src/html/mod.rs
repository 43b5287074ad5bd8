//! # HTML/CSS Generation
//!
//! Turns a [`ParsedProject`] into one self-contained HTML document that
//! reproduces the canvas layout:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//!   <head> <style> base rules + one rule set per element </style> </head>
//!   <body>
//!     <div class="tb365-canvas">   canvas-sized, position: relative
//!       ...elements in paint order, each position: absolute
//!     </div>
//!   </body>
//! </html>
//! ```
//!
//! Elements are written in ascending `zIndex` (ties in source order) and also
//! carry their `z-index`, so later elements paint over earlier ones. Geometry
//! is copied verbatim in pixels, fractions included. Output depends only on
//! the project: generating twice yields identical bytes.
//!
//! Placeholders pass through untouched; substitution is the replacer's job.

pub mod css;
mod elements;

use std::fmt::{self, Write};
use std::time::Instant;

use serde::Serialize;

use crate::document::types::ParsedProject;
use crate::error::Tb365Error;
use css::{px, Declarations, Stylesheet};

/// Rough size class of a generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    /// Score = rendered elements + table cells / 4 + variables.
    fn from_score(score: usize) -> Self {
        match score {
            0..25 => Complexity::Simple,
            25..100 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// Distinct variables referenced by the document.
    pub variables: usize,
    pub complexity: Complexity,
    /// Milliseconds spent generating.
    pub generation_time: f64,
    pub size_bytes: usize,
    pub elements_rendered: usize,
}

/// Generated HTML plus metadata. Timing lives only in the metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocument {
    pub html: String,
    pub metadata: GenerationMetadata,
}

/// Escape text for HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text that is never a placeholder location. Braces are encoded so
/// the replacer cannot see a `{{...}}` in names, ids or the title.
pub fn escape_literal(text: &str) -> String {
    escape_html(text).replace('{', "&#123;")
}

/// Generate the HTML document for a parsed project.
pub fn generate(project: &ParsedProject) -> Result<GeneratedDocument, Tb365Error> {
    let start = Instant::now();

    let (html, rendered) = render(project).map_err(|e| {
        log::error!("HTML generation failed for '{}': {}", project.project_name, e);
        e
    })?;

    let table_cells: usize = project.text_content.table_cells.len();
    let variables = project.text_content.variables.len();
    let metadata = GenerationMetadata {
        variables,
        complexity: Complexity::from_score(rendered + table_cells / 4 + variables),
        generation_time: start.elapsed().as_secs_f64() * 1000.0,
        size_bytes: html.len(),
        elements_rendered: rendered,
    };

    log::debug!(
        "generated '{}': {} elements, {} bytes",
        project.project_name,
        rendered,
        metadata.size_bytes
    );

    Ok(GeneratedDocument { html, metadata })
}

fn render(project: &ParsedProject) -> Result<(String, usize), Tb365Error> {
    // Resolve paint order first so a broken layer list is reported as a defect.
    let mut visible = Vec::with_capacity(project.layout.layers.len());
    for layer in &project.layout.layers {
        let element = project.elements.get(layer.render_order).ok_or_else(|| {
            Tb365Error::Generation(format!(
                "layer for '{}' points at missing element {}",
                layer.element_id, layer.render_order
            ))
        })?;
        if element.id != layer.element_id {
            return Err(Tb365Error::Generation(format!(
                "layer for '{}' points at element '{}'",
                layer.element_id, element.id
            )));
        }
        if element.visible {
            visible.push(element);
        }
    }

    let mut sheet = base_stylesheet(project);
    for element in &visible {
        elements::add_rules(element, &mut sheet);
    }

    let mut html = String::with_capacity(4096 + visible.len() * 256);
    write_document(project, &sheet, &mut html, |out| {
        for element in &visible {
            elements::write_markup(element, out)?;
        }
        Ok(())
    })
    .map_err(|e| Tb365Error::Generation(format!("failed to write markup: {}", e)))?;

    Ok((html, visible.len()))
}

fn base_stylesheet(project: &ParsedProject) -> Stylesheet {
    let width = px(project.canvas.size.width);
    let height = px(project.canvas.size.height);
    let mut sheet = Stylesheet::new();

    let mut d = Declarations::new();
    d.set("box-sizing", "border-box");
    sheet.rule("*,*::before,*::after", d);

    let mut d = Declarations::new();
    d.set("margin", "0").set("padding", "0").set("background", "#ffffff");
    sheet.rule("html,body", d);

    let mut d = Declarations::new();
    d.set("width", width.clone())
        .set("height", height.clone())
        .set("-webkit-print-color-adjust", "exact")
        .set("print-color-adjust", "exact");
    sheet.rule("body", d);

    let mut d = Declarations::new();
    d.set("position", "relative")
        .set("width", width.clone())
        .set("height", height.clone())
        .set("overflow", "hidden")
        .set("background", "#ffffff");
    sheet.rule(".tb365-canvas", d);

    let mut d = Declarations::new();
    d.set("position", "absolute").set("margin", "0");
    sheet.rule(".tb365-el", d);

    let mut d = Declarations::new();
    d.set("white-space", "pre-line")
        .set("overflow-wrap", "break-word")
        .set("overflow", "hidden");
    sheet.rule(".tb365-text", d);

    let mut d = Declarations::new();
    d.set("display", "block");
    sheet.rule(".tb365-image", d);

    let mut d = Declarations::new();
    d.set("display", "flex")
        .set("align-items", "center")
        .set("justify-content", "center")
        .set("border", "1px dashed #9ca3af")
        .set("background", "#f3f4f6")
        .set("color", "#6b7280")
        .set("font-family", "sans-serif")
        .set("font-size", "12px");
    sheet.rule(".tb365-image-placeholder", d);

    let mut d = Declarations::new();
    d.set("border-collapse", "collapse").set("table-layout", "fixed");
    sheet.rule(".tb365-table", d);

    let mut d = Declarations::new();
    d.set("white-space", "pre-line")
        .set("overflow", "hidden")
        .set("text-align", "left")
        .set("vertical-align", "middle");
    sheet.rule(".tb365-table th,.tb365-table td", d);

    sheet.raw(format!("@page{{size:{} {};margin:0}}", width, height));
    sheet
}

fn write_document<F>(project: &ParsedProject, sheet: &Stylesheet, out: &mut String, body: F) -> fmt::Result
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    out.push_str("<!DOCTYPE html>\n");
    out.push_str("<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width={}\">",
        project.canvas.size.width
    )?;
    out.push_str("<meta name=\"generator\" content=\"tb365\">\n");
    writeln!(out, "<title>{}</title>", escape_literal(&project.project_name))?;
    out.push_str("<style>\n");
    sheet.write_to(out)?;
    out.push_str("</style>\n</head>\n<body>\n<div class=\"tb365-canvas\">\n");
    body(out)?;
    out.push_str("</div>\n</body>\n</html>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use serde_json::{json, Value};

    fn rect(id: &str, z: i64, visible: bool) -> Value {
        json!({
            "id": id, "name": id, "type": "rectangle",
            "position": {"x": 0, "y": 0}, "size": {"width": 10, "height": 10},
            "zIndex": z, "visible": visible, "locked": false,
            "fill": "#ff0000", "stroke": "#000000", "strokeWidth": 0, "cornerRadius": 0
        })
    }

    fn project(elements: Vec<Value>) -> ParsedProject {
        parse_document(&json!({
            "projectName": "Open <House>",
            "version": "1",
            "canvasState": {
                "elements": elements,
                "canvasSize": {"width": 612.5, "height": 792},
                "zoom": 1, "snapToGrid": false, "gridSize": 10, "activeTool": "select"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape_html("{{name}}"), "{{name}}");
        assert_eq!(escape_literal("<{{name}}>"), "&lt;&#123;&#123;name}}&gt;");
    }

    #[test]
    fn test_document_shell() {
        let doc = generate(&project(vec![])).unwrap();
        assert!(doc.html.starts_with("<!DOCTYPE html>\n<html"));
        assert!(doc.html.contains("<title>Open &lt;House&gt;</title>"));
        assert!(doc.html.contains(".tb365-canvas{position:relative;width:612.5px;height:792px"));
        assert!(doc.html.contains("html,body{margin:0;padding:0;background:#ffffff}"));
        assert!(!doc.html.contains("<link"));
        assert!(doc.html.ends_with("</html>\n"));
        assert_eq!(doc.metadata.elements_rendered, 0);
        assert_eq!(doc.metadata.complexity, Complexity::Simple);
        assert_eq!(doc.metadata.size_bytes, doc.html.len());
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let doc = generate(&project(vec![rect("shown", 0, true), rect("hidden", 1, false)])).unwrap();
        assert!(doc.html.contains(r#"data-element-id="shown""#));
        assert!(!doc.html.contains(r#"data-element-id="hidden""#));
        assert!(!doc.html.contains(".tb365-e1{"));
        assert_eq!(doc.metadata.elements_rendered, 1);
    }

    #[test]
    fn test_markup_follows_z_index() {
        let doc = generate(&project(vec![rect("front", 9, true), rect("back", -3, true)])).unwrap();
        let back = doc.html.find(r#"data-element-id="back""#).unwrap();
        let front = doc.html.find(r#"data-element-id="front""#).unwrap();
        assert!(back < front);
        assert!(doc.html.contains("z-index:-3"));
    }

    #[test]
    fn test_deterministic() {
        let p = project(vec![rect("a", 1, true), rect("b", 0, true)]);
        assert_eq!(generate(&p).unwrap().html, generate(&p).unwrap().html);
    }

    #[test]
    fn test_corrupt_layers_are_generation_errors() {
        let mut p = project(vec![rect("a", 0, true)]);
        p.layout.layers[0].render_order = 5;
        let err = generate(&p).unwrap_err();
        assert_eq!(err.stage(), "generation");
    }

    #[test]
    fn test_complexity_bands() {
        assert_eq!(Complexity::from_score(0), Complexity::Simple);
        assert_eq!(Complexity::from_score(25), Complexity::Moderate);
        assert_eq!(Complexity::from_score(500), Complexity::Complex);
    }
}
