//! Markup and style rules for each element type.
//!
//! Every element gets a class `tb365-e{renderOrder}` carrying its geometry and
//! type-specific styling in the embedded stylesheet; the markup itself has no
//! inline styles.

use std::fmt::{self, Write};

use super::css::{font_family, px, Declarations, Stylesheet};
use super::{escape_html, escape_literal};
use crate::document::types::*;

/// Class unique to one element.
pub fn element_class(element: &Element) -> String {
    format!("tb365-e{}", element.render_order)
}

/// Absolute box shared by all element types.
fn geometry(element: &Element) -> Declarations {
    let mut d = Declarations::new();
    d.set("left", px(element.position.x))
        .set("top", px(element.position.y))
        .set("width", px(element.size.width))
        .set("height", px(element.size.height))
        .set("z-index", element.z_index.to_string());
    d
}

/// Add this element's rules to the stylesheet.
pub fn add_rules(element: &Element, sheet: &mut Stylesheet) {
    let selector = format!(".{}", element_class(element));
    let mut d = geometry(element);

    match &element.kind {
        ElementKind::Text { styling, .. } => {
            d.set("font-family", font_family(&styling.font_family))
                .set("font-size", px(styling.font_size))
                .set("font-weight", styling.font_weight.as_str())
                .set("font-style", styling.font_style.as_str())
                .set("color", styling.color.as_str())
                .set("text-align", styling.text_align.as_str())
                .set("padding", px(styling.padding));
            if let Some(bg) = &styling.background_color {
                d.set("background-color", bg.as_str());
            }
            sheet.rule(selector, d);
        }
        ElementKind::Rectangle { styling } => {
            d.set("background-color", styling.fill.css());
            if styling.stroke_width > 0.0 {
                d.set(
                    "border",
                    format!("{} solid {}", px(styling.stroke_width), styling.stroke),
                );
            }
            if styling.corner_radius > 0.0 {
                d.set("border-radius", px(styling.corner_radius));
            }
            sheet.rule(selector, d);
        }
        ElementKind::Image { styling, .. } => {
            d.set("object-fit", styling.fit.object_fit());
            if styling.opacity < 1.0 {
                d.set("opacity", styling.opacity.to_string());
            }
            sheet.rule(selector, d);
        }
        ElementKind::Table { table } => {
            d.set("font-family", font_family(&table.font_family))
                .set("font-size", px(table.font_size))
                .set("color", table.text_color.as_str());
            sheet.rule(selector.clone(), d);

            let mut cells = Declarations::new();
            cells.set("padding", px(table.cell_padding));
            if table.border_width > 0.0 {
                cells.set(
                    "border",
                    format!("{} solid {}", px(table.border_width), table.border_color),
                );
            } else {
                cells.set("border", "none");
            }
            sheet.rule(format!("{sel} th,{sel} td", sel = selector), cells);

            let mut header = Declarations::new();
            header
                .set("background-color", table.header_background.css())
                .set("font-weight", "bold");
            sheet.rule(format!("{} th", selector), header);

            let mut body = Declarations::new();
            body.set("background-color", table.cell_background.css());
            sheet.rule(format!("{} td", selector), body);
        }
    }
}

/// Write this element's markup on its own line.
pub fn write_markup(element: &Element, out: &mut String) -> fmt::Result {
    let class = element_class(element);
    let id = escape_literal(&element.id);

    match &element.kind {
        ElementKind::Text { content, .. } => {
            writeln!(
                out,
                r#"<div class="tb365-el tb365-text {}" data-element-id="{}">{}</div>"#,
                class,
                id,
                escape_html(content)
            )
        }
        ElementKind::Rectangle { .. } => {
            writeln!(
                out,
                r#"<div class="tb365-el tb365-rect {}" data-element-id="{}"></div>"#,
                class, id
            )
        }
        ElementKind::Image { src, .. } if src.trim().is_empty() => {
            writeln!(
                out,
                r#"<div class="tb365-el tb365-image-placeholder {}" data-element-id="{}" data-placeholder="image">{}</div>"#,
                class,
                id,
                escape_literal(&element.name)
            )
        }
        ElementKind::Image { src, .. } => {
            writeln!(
                out,
                r#"<img class="tb365-el tb365-image {}" data-element-id="{}" src="{}" alt="{}">"#,
                class,
                id,
                escape_html(src.trim()),
                escape_literal(&element.name)
            )
        }
        ElementKind::Table { table } => write_table(table, &class, &id, out),
    }
}

/// Leading all-header rows go in `<thead>`, the rest in `<tbody>`.
fn write_table(table: &TableData, class: &str, id: &str, out: &mut String) -> fmt::Result {
    writeln!(
        out,
        r#"<table class="tb365-el tb365-table {}" data-element-id="{}">"#,
        class, id
    )?;

    let header_rows = (0..table.cells.len())
        .take_while(|&r| table.is_header_row(r))
        .count();
    let (head, body) = table.cells.split_at(header_rows);

    if !head.is_empty() {
        out.push_str("<thead>\n");
        for row in head {
            write_row(row, out)?;
        }
        out.push_str("</thead>\n");
    }
    if !body.is_empty() {
        out.push_str("<tbody>\n");
        for row in body {
            write_row(row, out)?;
        }
        out.push_str("</tbody>\n");
    }

    out.push_str("</table>\n");
    Ok(())
}

fn write_row(row: &[TableCell], out: &mut String) -> fmt::Result {
    out.push_str("<tr>");
    for cell in row {
        let tag = if cell.is_header { "th" } else { "td" };
        write!(out, "<{tag}>{}</{tag}>", escape_html(&cell.content), tag = tag)?;
    }
    out.push_str("</tr>\n");
    Ok(())
}
