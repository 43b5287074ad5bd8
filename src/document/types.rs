//! Types for the parsed project model.
//!
//! Everything here is produced by the parser after validation, so every
//! numeric field is present and every enum field holds a known value. The
//! generator matches on [`ElementKind`] exhaustively and never guesses
//! defaults at render time.
//!
//! All types serialize with camelCase keys so the model can be returned as-is
//! from the HTTP API.

use serde::{Serialize, Serializer};

use crate::content::ContentAnalysis;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Top-left corner of an element, in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Element or canvas dimensions, in document pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

// ============================================================================
// ENUMS
// ============================================================================

/// Define a string-backed enum with `parse`, `as_str` and an `ALLOWED` list
/// used in validation messages.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Accepted spellings, in declaration order.
            pub const ALLOWED: &'static [&'static str] = &[$($text,)+];

            /// Parse from the document's string form.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// The document's string form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Editor tool active when the document was saved.
    ActiveTool {
        Select => "select",
        Text => "text",
        Rectangle => "rectangle",
        Image => "image",
        Table => "table",
    }
}

string_enum! {
    /// Element discriminant.
    ElementType {
        Text => "text",
        Rectangle => "rectangle",
        Image => "image",
        Table => "table",
    }
}

string_enum! {
    FontWeight {
        Normal => "normal",
        Bold => "bold",
    }
}

string_enum! {
    FontStyle {
        Normal => "normal",
        Italic => "italic",
    }
}

string_enum! {
    TextAlign {
        Left => "left",
        Center => "center",
        Right => "right",
    }
}

string_enum! {
    /// How an image fills its box. `Stretch` renders exactly like `Fill`.
    ImageFit {
        Fill => "fill",
        Contain => "contain",
        Cover => "cover",
        Stretch => "stretch",
    }
}

impl ImageFit {
    /// CSS `object-fit` value.
    pub fn object_fit(&self) -> &'static str {
        match self {
            ImageFit::Fill | ImageFit::Stretch => "fill",
            ImageFit::Contain => "contain",
            ImageFit::Cover => "cover",
        }
    }
}

/// A fill that is either a 6-digit hex color or transparent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Paint {
    Transparent,
    /// Lowercased `#rrggbb`.
    Hex(String),
}

impl Paint {
    /// CSS color value.
    pub fn css(&self) -> &str {
        match self {
            Paint::Transparent => "transparent",
            Paint::Hex(hex) => hex,
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Paint::Transparent)
    }
}

impl Serialize for Paint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.css())
    }
}

// ============================================================================
// ELEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyling {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleStyling {
    pub fill: Paint,
    pub stroke: String,
    pub stroke_width: f64,
    pub corner_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStyling {
    pub opacity: f64,
    pub fit: ImageFit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub content: String,
    pub is_header: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub rows: usize,
    pub columns: usize,
    /// Row-major, exactly `rows` × `columns`.
    pub cells: Vec<Vec<TableCell>>,
    pub cell_padding: f64,
    pub border_width: f64,
    pub border_color: String,
    pub header_background: Paint,
    pub cell_background: Paint,
    pub text_color: String,
    pub font_size: f64,
    pub font_family: String,
}

impl TableData {
    /// True when every cell in the row is a header cell.
    pub fn is_header_row(&self, row: usize) -> bool {
        self.cells
            .get(row)
            .is_some_and(|cells| !cells.is_empty() && cells.iter().all(|c| c.is_header))
    }
}

/// Type-specific part of an element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text { content: String, styling: TextStyling },
    Rectangle { styling: RectangleStyling },
    Image { src: String, styling: ImageStyling },
    Table { table: TableData },
}

/// A validated, normalized canvas element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub name: String,
    pub position: Position,
    pub size: Size,
    pub z_index: i64,
    pub visible: bool,
    pub locked: bool,
    /// Index of the element in the source `elements` array.
    pub render_order: usize,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Text { .. } => ElementType::Text,
            ElementKind::Rectangle { .. } => ElementType::Rectangle,
            ElementKind::Image { .. } => ElementType::Image,
            ElementKind::Table { .. } => ElementType::Table,
        }
    }

    pub fn right(&self) -> f64 {
        self.position.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.position.y + self.size.height
    }

    pub fn area(&self) -> f64 {
        self.size.width * self.size.height
    }
}

// ============================================================================
// PARSED PROJECT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasInfo {
    pub size: Size,
    pub zoom: f64,
    pub snap_to_grid: bool,
    pub grid_size: f64,
    pub active_tool: ActiveTool,
}

/// Element ids partitioned by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementGroups {
    pub rectangles: Vec<String>,
    pub text: Vec<String>,
    pub images: Vec<String>,
    pub tables: Vec<String>,
}

/// One distinct style, with the elements that share it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSnapshot {
    pub element_type: ElementType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub element_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Styles {
    pub fonts: Vec<String>,
    pub colors: Vec<String>,
    pub font_sizes: Vec<f64>,
    pub unique_styles: Vec<StyleSnapshot>,
}

/// Minimal axis-aligned box covering every element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

/// One entry in paint order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub element_id: String,
    pub z_index: i64,
    pub render_order: usize,
    pub is_background: bool,
    pub is_foreground: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub bounds: Bounds,
    /// Elements in ascending `zIndex`; ties keep source order.
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeCounts {
    pub text: usize,
    pub rectangle: usize,
    pub image: usize,
    pub table: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_elements: usize,
    pub element_types: TypeCounts,
    pub average_size: Size,
    pub total_area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub parsed_at: String,
}

/// The validated, normalized, derived-enriched project consumed by the generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProject {
    pub project_name: String,
    pub version: String,
    pub saved_at: String,
    pub canvas: CanvasInfo,
    pub elements: Vec<Element>,
    pub element_groups: ElementGroups,
    pub text_content: ContentAnalysis,
    pub styles: Styles,
    pub layout: Layout,
    pub statistics: Statistics,
    pub validation: Validation,
}

impl ParsedProject {
    /// Look up an element by id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Elements in paint order (ascending `zIndex`, ties in source order).
    pub fn paint_order(&self) -> impl Iterator<Item = &Element> {
        self.layout
            .layers
            .iter()
            .filter_map(|layer| self.elements.get(layer.render_order))
    }

    /// Distinct variable paths referenced anywhere in the document.
    pub fn variables(&self) -> &[String] {
        &self.text_content.variables
    }
}
