//! Per-element validation and normalization.
//!
//! Each element is read in one pass: base fields, then the fields its `type`
//! requires. Coordinates are accepted nested (`position.x`) or flattened
//! (`x` on the element itself) and always come out nested.

use serde_json::{Map, Value};

use super::fields::Fields;
use super::types::*;

const DEFAULT_WIDTH: f64 = 100.0;
const DEFAULT_HEIGHT: f64 = 50.0;

fn any_number(_: f64) -> bool {
    true
}

fn non_negative(v: f64) -> bool {
    v >= 0.0
}

/// Validate and normalize the element at `index` in the source array.
///
/// On failure, returns one line naming the element and listing every
/// violation, e.g. `element-3 (box-1): fill must be hex or transparent, strokeWidth is required`.
pub fn parse_element(index: usize, value: &Value) -> Result<Element, String> {
    let Some(obj) = value.as_object() else {
        return Err(format!("element-{} (unknown): element must be an object", index));
    };
    let label = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown");

    let mut f = Fields::new(obj);
    let id = f.non_empty_string("id");
    let name = f.string("name");
    let element_type = f.one_of("type", ElementType::parse, ElementType::ALLOWED);
    let position = read_position(&mut f);
    let size = read_size(&mut f);
    let visible = f.boolean("visible");
    let locked = f.boolean("locked");
    let z_index = f.integer("zIndex");
    let kind = element_type.and_then(|t| read_kind(t, &mut f));

    match (id, name, position, size, visible, locked, z_index, kind) {
        (
            Some(id),
            Some(name),
            Some(position),
            Some(size),
            Some(visible),
            Some(locked),
            Some(z_index),
            Some(kind),
        ) if f.is_ok() => Ok(Element {
            id,
            name,
            position,
            size,
            z_index,
            visible,
            locked,
            render_order: index,
            kind,
        }),
        _ => Err(format!(
            "element-{} ({}): {}",
            index,
            label,
            f.into_errors().join(", ")
        )),
    }
}

fn read_position(f: &mut Fields<'_>) -> Option<Position> {
    match f.raw("position") {
        Some(Value::Object(nested)) => read_xy(nested, "position.", f),
        Some(_) => {
            f.error("position must be an object");
            None
        }
        None if f.has("x") || f.has("y") => {
            let x = f.number_or("x", 0.0, any_number, "a number");
            let y = f.number_or("y", 0.0, any_number, "a number");
            Some(Position { x: x?, y: y? })
        }
        None => {
            f.error("position is required");
            None
        }
    }
}

fn read_xy(obj: &Map<String, Value>, prefix: &str, f: &mut Fields<'_>) -> Option<Position> {
    let mut inner = Fields::with_prefix(obj, prefix);
    let x = inner.number_or("x", 0.0, any_number, "a number");
    let y = inner.number_or("y", 0.0, any_number, "a number");
    inner.merge_into(f);
    Some(Position { x: x?, y: y? })
}

fn read_size(f: &mut Fields<'_>) -> Option<Size> {
    match f.raw("size") {
        Some(Value::Object(nested)) => {
            let mut inner = Fields::with_prefix(nested, "size.");
            let width = inner.number_or("width", DEFAULT_WIDTH, non_negative, "a non-negative number");
            let height =
                inner.number_or("height", DEFAULT_HEIGHT, non_negative, "a non-negative number");
            inner.merge_into(f);
            Some(Size {
                width: width?,
                height: height?,
            })
        }
        Some(_) => {
            f.error("size must be an object");
            None
        }
        None if f.has("width") || f.has("height") => {
            let width = f.number_or("width", DEFAULT_WIDTH, non_negative, "a non-negative number");
            let height = f.number_or("height", DEFAULT_HEIGHT, non_negative, "a non-negative number");
            Some(Size {
                width: width?,
                height: height?,
            })
        }
        None => {
            f.error("size is required");
            None
        }
    }
}

fn read_kind(element_type: ElementType, f: &mut Fields<'_>) -> Option<ElementKind> {
    match element_type {
        ElementType::Text => read_text(f),
        ElementType::Rectangle => read_rectangle(f),
        ElementType::Image => read_image(f),
        ElementType::Table => read_table(f),
    }
}

fn read_text(f: &mut Fields<'_>) -> Option<ElementKind> {
    let content = f.string("content");
    let font_size = f.positive("fontSize");
    let font_family = f.non_empty_string("fontFamily");
    let font_weight = f.one_of("fontWeight", FontWeight::parse, FontWeight::ALLOWED);
    let font_style = f.one_of("fontStyle", FontStyle::parse, FontStyle::ALLOWED);
    let text_align = f.one_of("textAlign", TextAlign::parse, TextAlign::ALLOWED);
    let color = f.hex("color");
    let background_color = f.optional_hex("backgroundColor");
    let padding = f.non_negative("padding");

    Some(ElementKind::Text {
        content: content?,
        styling: TextStyling {
            font_size: font_size?,
            font_family: font_family?,
            font_weight: font_weight?,
            font_style: font_style?,
            text_align: text_align?,
            color: color?,
            background_color: background_color?,
            padding: padding?,
        },
    })
}

fn read_rectangle(f: &mut Fields<'_>) -> Option<ElementKind> {
    let fill = f.paint("fill");
    let stroke = f.hex("stroke");
    let stroke_width = f.non_negative("strokeWidth");
    let corner_radius = f.non_negative("cornerRadius");

    Some(ElementKind::Rectangle {
        styling: RectangleStyling {
            fill: fill?,
            stroke: stroke?,
            stroke_width: stroke_width?,
            corner_radius: corner_radius?,
        },
    })
}

fn read_image(f: &mut Fields<'_>) -> Option<ElementKind> {
    // A missing src is allowed and renders as a placeholder box.
    let src = if f.has("src") {
        f.string("src")
    } else {
        Some(String::new())
    };
    let opacity = f.number("opacity", |v| (0.0..=1.0).contains(&v), "between 0 and 1");
    let fit = f.one_of("fit", ImageFit::parse, ImageFit::ALLOWED);

    Some(ElementKind::Image {
        src: src?,
        styling: ImageStyling {
            opacity: opacity?,
            fit: fit?,
        },
    })
}

fn read_table(f: &mut Fields<'_>) -> Option<ElementKind> {
    let rows = f.positive_integer("rows");
    let columns = f.positive_integer("columns");
    let cells = read_cells(f, rows, columns);
    let cell_padding = f.non_negative("cellPadding");
    let border_width = f.non_negative("borderWidth");
    let border_color = f.hex("borderColor");
    let header_background = f.paint("headerBackground");
    let cell_background = f.paint("cellBackground");
    let text_color = f.hex("textColor");
    let font_size = f.positive("fontSize");
    let font_family = f.non_empty_string("fontFamily");

    Some(ElementKind::Table {
        table: TableData {
            rows: rows?,
            columns: columns?,
            cells: cells?,
            cell_padding: cell_padding?,
            border_width: border_width?,
            border_color: border_color?,
            header_background: header_background?,
            cell_background: cell_background?,
            text_color: text_color?,
            font_size: font_size?,
            font_family: font_family?,
        },
    })
}

fn read_cells(
    f: &mut Fields<'_>,
    rows: Option<usize>,
    columns: Option<usize>,
) -> Option<Vec<Vec<TableCell>>> {
    let raw_rows = match f.raw("cells") {
        Some(Value::Array(raw_rows)) => raw_rows,
        Some(_) => {
            f.error("cells must be a 2-D array");
            return None;
        }
        None => {
            f.error("cells is required");
            return None;
        }
    };

    let mut ok = true;
    if let Some(rows) = rows {
        if raw_rows.len() != rows {
            f.error(format!("cells must have {} rows, found {}", rows, raw_rows.len()));
            ok = false;
        }
    }

    let mut out = Vec::with_capacity(raw_rows.len());
    for (r, raw_row) in raw_rows.iter().enumerate() {
        let Some(raw_cells) = raw_row.as_array() else {
            f.error(format!("cells[{}] must be an array", r));
            ok = false;
            continue;
        };
        if let Some(columns) = columns {
            if raw_cells.len() != columns {
                f.error(format!(
                    "cells[{}] must have {} columns, found {}",
                    r,
                    columns,
                    raw_cells.len()
                ));
                ok = false;
            }
        }

        let mut row = Vec::with_capacity(raw_cells.len());
        for (c, raw_cell) in raw_cells.iter().enumerate() {
            match read_cell(raw_cell) {
                Ok(cell) => row.push(cell),
                Err(msg) => {
                    f.error(format!("cells[{}][{}]{}", r, c, msg));
                    ok = false;
                }
            }
        }
        out.push(row);
    }

    ok.then_some(out)
}

/// A cell object; absent `content` is empty and absent `isHeader` is false.
fn read_cell(value: &Value) -> Result<TableCell, String> {
    let Some(obj) = value.as_object() else {
        return Err(" must be an object".to_string());
    };
    let content = match obj.get("content") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(".content must be a string".to_string()),
    };
    let is_header = match obj.get("isHeader") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(".isHeader must be a boolean".to_string()),
    };
    Ok(TableCell { content, is_header })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rectangle() -> Value {
        json!({
            "id": "box", "name": "Box", "type": "rectangle",
            "position": {"x": 10.5, "y": 20.25},
            "size": {"width": 200, "height": 100},
            "zIndex": 2, "visible": true, "locked": false,
            "fill": "#FF0000", "stroke": "#000000", "strokeWidth": 2, "cornerRadius": 4
        })
    }

    #[test]
    fn test_rectangle_nested_coordinates() {
        let el = parse_element(0, &rectangle()).unwrap();
        assert_eq!(el.position, Position { x: 10.5, y: 20.25 });
        assert_eq!(el.size, Size { width: 200.0, height: 100.0 });
        assert_eq!(el.z_index, 2);
        assert_eq!(el.element_type(), ElementType::Rectangle);
        match el.kind {
            ElementKind::Rectangle { styling } => {
                assert_eq!(styling.fill, Paint::Hex("#ff0000".into()));
                assert_eq!(styling.stroke_width, 2.0);
            }
            other => panic!("expected rectangle, got {:?}", other),
        }
    }

    #[test]
    fn test_flattened_coordinates_normalize() {
        let mut v = rectangle();
        let obj = v.as_object_mut().unwrap();
        obj.remove("position");
        obj.remove("size");
        obj.insert("x".into(), json!(10.5));
        obj.insert("y".into(), json!(20.25));
        obj.insert("width".into(), json!(200));
        obj.insert("height".into(), json!(100));
        let flat = parse_element(0, &v).unwrap();
        let nested = parse_element(0, &rectangle()).unwrap();
        assert_eq!(flat, nested);
    }

    #[test]
    fn test_partial_coordinates_default() {
        let mut v = rectangle();
        v["position"] = json!({"x": 5});
        v["size"] = json!({});
        let el = parse_element(0, &v).unwrap();
        assert_eq!(el.position, Position { x: 5.0, y: 0.0 });
        assert_eq!(el.size, Size { width: 100.0, height: 50.0 });
    }

    #[test]
    fn test_missing_position_rejected() {
        let mut v = rectangle();
        v.as_object_mut().unwrap().remove("position");
        let err = parse_element(1, &v).unwrap_err();
        assert_eq!(err, "element-1 (box): position is required");
    }

    #[test]
    fn test_reports_every_field() {
        let mut v = rectangle();
        v["fill"] = json!("red");
        v["strokeWidth"] = json!(-1);
        v["visible"] = json!("yes");
        let err = parse_element(3, &v).unwrap_err();
        assert_eq!(
            err,
            "element-3 (box): visible must be a boolean, fill must be hex or transparent, \
             strokeWidth must be a non-negative number"
        );
    }

    #[test]
    fn test_unknown_type_skips_type_fields() {
        let mut v = rectangle();
        v["type"] = json!("circle");
        let err = parse_element(0, &v).unwrap_err();
        assert_eq!(
            err,
            "element-0 (box): type must be one of text, rectangle, image, table"
        );
    }

    #[test]
    fn test_text_element() {
        let v = json!({
            "id": "t1", "name": "Title", "type": "text",
            "x": 0, "y": 0, "width": 300, "height": 40,
            "zIndex": 1, "visible": true, "locked": false,
            "content": "Hello {{name}}", "fontSize": 24, "fontFamily": "Arial",
            "fontWeight": "bold", "fontStyle": "normal", "textAlign": "center",
            "color": "#333333", "backgroundColor": "transparent", "padding": 8
        });
        let el = parse_element(0, &v).unwrap();
        match el.kind {
            ElementKind::Text { content, styling } => {
                assert_eq!(content, "Hello {{name}}");
                assert_eq!(styling.font_weight, FontWeight::Bold);
                assert_eq!(styling.text_align, TextAlign::Center);
                assert_eq!(styling.background_color, None);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_image_without_src() {
        let v = json!({
            "id": "img", "name": "Logo", "type": "image",
            "position": {"x": 0, "y": 0}, "size": {"width": 50, "height": 50},
            "zIndex": 0, "visible": true, "locked": true,
            "opacity": 0.5, "fit": "stretch"
        });
        let el = parse_element(0, &v).unwrap();
        match el.kind {
            ElementKind::Image { src, styling } => {
                assert!(src.is_empty());
                assert_eq!(styling.fit.object_fit(), "fill");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_image_opacity_out_of_range() {
        let v = json!({
            "id": "img", "name": "Logo", "type": "image",
            "position": {"x": 0, "y": 0}, "size": {"width": 50, "height": 50},
            "zIndex": 0, "visible": true, "locked": true,
            "src": "a.png", "opacity": 1.5, "fit": "zoom"
        });
        let err = parse_element(0, &v).unwrap_err();
        assert!(err.contains("opacity must be between 0 and 1"));
        assert!(err.contains("fit must be one of fill, contain, cover, stretch"));
    }

    #[test]
    fn test_table_cell_shape() {
        let v = json!({
            "id": "tbl", "name": "Table", "type": "table",
            "position": {"x": 0, "y": 0}, "size": {"width": 200, "height": 80},
            "zIndex": 0, "visible": true, "locked": false,
            "rows": 2, "columns": 2,
            "cells": [
                [{"content": "A", "isHeader": true}, {"content": "B", "isHeader": true}],
                [{"content": "1"}, {"content": 2}]
            ],
            "cellPadding": 4, "borderWidth": 1, "borderColor": "#cccccc",
            "headerBackground": "#eeeeee", "cellBackground": "transparent",
            "textColor": "#000000", "fontSize": 12, "fontFamily": "Arial"
        });
        let err = parse_element(0, &v).unwrap_err();
        assert_eq!(err, "element-0 (tbl): cells[1][1].content must be a string");
    }

    #[test]
    fn test_table_dimensions_mismatch() {
        let v = json!({
            "id": "tbl", "name": "Table", "type": "table",
            "position": {"x": 0, "y": 0}, "size": {"width": 200, "height": 80},
            "zIndex": 0, "visible": true, "locked": false,
            "rows": 2, "columns": 2,
            "cells": [[{"content": "A"}]],
            "cellPadding": 4, "borderWidth": 1, "borderColor": "#cccccc",
            "headerBackground": "#eeeeee", "cellBackground": "#ffffff",
            "textColor": "#000000", "fontSize": 12, "fontFamily": "Arial"
        });
        let err = parse_element(0, &v).unwrap_err();
        assert!(err.contains("cells must have 2 rows, found 1"));
        assert!(err.contains("cells[0] must have 2 columns, found 1"));
    }
}
