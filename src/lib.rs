//! # tb365 - Canvas Template Compiler
//!
//! tb365 turns a saved visual canvas design into a standalone HTML document
//! and fills its `{{path.to.value}}` placeholders with business data. It
//! provides:
//!
//! - **Schema validation**: cheap top-level checks on the request body
//! - **Document parsing**: staged validation, coordinate normalization and
//!   derived views (groups, bounds, layers, styles, statistics)
//! - **Content analysis**: placeholder extraction and a nested data schema
//! - **HTML generation**: pixel-exact, deterministic HTML with embedded CSS
//! - **Variable replacement**: escaped, sanitized and format-checked substitution
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//!
//! let body = json!({
//!     "tb365Data": {
//!         "projectName": "Open House",
//!         "version": "1.0",
//!         "canvasState": {
//!             "elements": [{
//!                 "id": "headline", "name": "Headline", "type": "text",
//!                 "position": {"x": 24, "y": 24}, "size": {"width": 560, "height": 48},
//!                 "zIndex": 1, "visible": true, "locked": false,
//!                 "content": "Hello {{name}}", "fontSize": 28, "fontFamily": "Georgia",
//!                 "fontWeight": "bold", "fontStyle": "normal", "textAlign": "center",
//!                 "color": "#1f2937", "padding": 4
//!             }],
//!             "canvasSize": {"width": 612, "height": 792},
//!             "zoom": 1, "snapToGrid": true, "gridSize": 8, "activeTool": "select"
//!         }
//!     },
//!     "data": {"name": "World"}
//! });
//!
//! let output = tb365::convert(&body, None)?;
//! assert!(output.result.html.contains("Hello World"));
//! assert_eq!(output.result.statistics.replaced_variables, 1);
//! # Ok::<(), tb365::Tb365Error>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Top-level request shape checks |
//! | [`document`] | Canvas document parser and project model |
//! | [`content`] | Placeholder analysis and data schema |
//! | [`html`] | HTML/CSS generation |
//! | [`replace`] | Variable substitution |
//! | [`pipeline`] | End-to-end conversion, batch and schema extraction |
//! | [`options`] | Conversion options |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod content;
pub mod document;
pub mod error;
pub mod html;
pub mod options;
pub mod pipeline;
pub mod replace;
pub mod request;
pub mod server;

// Re-exports for convenience
pub use document::{parse_document, ParsedProject};
pub use error::{ParseError, ParseStage, Tb365Error};
pub use html::{generate, GeneratedDocument};
pub use options::{ConvertOptions, MissingPolicy, ReplaceOptions};
pub use pipeline::{convert, convert_batch, extract_schema, validate_document, ConvertOutput};
pub use replace::{replace_variables, ReplacementResult};
