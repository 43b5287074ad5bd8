//! Derived views over validated elements: grouping, bounds, paint order,
//! style summaries, aggregate statistics and non-fatal warnings.

use std::collections::HashSet;

use super::types::*;

/// Partition element ids by type.
pub fn group_elements(elements: &[Element]) -> ElementGroups {
    let mut groups = ElementGroups::default();
    for element in elements {
        let bucket = match element.element_type() {
            ElementType::Rectangle => &mut groups.rectangles,
            ElementType::Text => &mut groups.text,
            ElementType::Image => &mut groups.images,
            ElementType::Table => &mut groups.tables,
        };
        bucket.push(element.id.clone());
    }
    groups
}

/// Minimal box covering every element, or a zero box when there are none.
pub fn bounds(elements: &[Element]) -> Bounds {
    let Some(first) = elements.first() else {
        return Bounds::default();
    };

    let init = (first.position.x, first.position.y, first.right(), first.bottom());
    let (min_x, min_y, max_x, max_y) = elements.iter().skip(1).fold(init, |acc, e| {
        (
            acc.0.min(e.position.x),
            acc.1.min(e.position.y),
            acc.2.max(e.right()),
            acc.3.max(e.bottom()),
        )
    });

    Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
        width: max_x - min_x,
        height: max_y - min_y,
    }
}

/// Paint order: ascending `zIndex`, ties broken by source order.
///
/// The first layer is flagged as background and the last as foreground.
pub fn layers(elements: &[Element]) -> Vec<Layer> {
    let mut ordered: Vec<&Element> = elements.iter().collect();
    ordered.sort_by_key(|e| (e.z_index, e.render_order));

    let last = ordered.len().saturating_sub(1);
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, e)| Layer {
            element_id: e.id.clone(),
            z_index: e.z_index,
            render_order: e.render_order,
            is_background: i == 0,
            is_foreground: i == last,
        })
        .collect()
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Style snapshot for one element, without the id list filled in.
fn snapshot(element: &Element) -> StyleSnapshot {
    let mut s = StyleSnapshot {
        element_type: element.element_type(),
        font_family: None,
        font_size: None,
        font_weight: None,
        color: None,
        background: None,
        border: None,
        opacity: None,
        element_ids: Vec::new(),
    };
    match &element.kind {
        ElementKind::Text { styling, .. } => {
            s.font_family = Some(styling.font_family.clone());
            s.font_size = Some(styling.font_size);
            s.font_weight = Some(styling.font_weight);
            s.color = Some(styling.color.clone());
            s.background = styling.background_color.clone();
        }
        ElementKind::Rectangle { styling } => {
            s.background = Some(styling.fill.css().to_string());
            if styling.stroke_width > 0.0 {
                s.border = Some(format!("{}px {}", styling.stroke_width, styling.stroke));
            }
        }
        ElementKind::Image { styling, .. } => {
            s.opacity = Some(styling.opacity);
        }
        ElementKind::Table { table } => {
            s.font_family = Some(table.font_family.clone());
            s.font_size = Some(table.font_size);
            s.color = Some(table.text_color.clone());
            s.background = Some(table.cell_background.css().to_string());
            if table.border_width > 0.0 {
                s.border = Some(format!("{}px {}", table.border_width, table.border_color));
            }
        }
    }
    s
}

/// Compare everything but the element ids.
fn same_style(a: &StyleSnapshot, b: &StyleSnapshot) -> bool {
    a.element_type == b.element_type
        && a.font_family == b.font_family
        && a.font_size == b.font_size
        && a.font_weight == b.font_weight
        && a.color == b.color
        && a.background == b.background
        && a.border == b.border
        && a.opacity == b.opacity
}

/// Distinct fonts, colors and font sizes, plus one snapshot per distinct style.
pub fn styles(elements: &[Element]) -> Styles {
    let mut out = Styles::default();

    for element in elements {
        match &element.kind {
            ElementKind::Text { styling, .. } => {
                push_unique(&mut out.fonts, styling.font_family.clone());
                push_unique(&mut out.colors, styling.color.clone());
                if let Some(bg) = &styling.background_color {
                    push_unique(&mut out.colors, bg.clone());
                }
                push_unique(&mut out.font_sizes, styling.font_size);
            }
            ElementKind::Rectangle { styling } => {
                if let Paint::Hex(fill) = &styling.fill {
                    push_unique(&mut out.colors, fill.clone());
                }
                if styling.stroke_width > 0.0 {
                    push_unique(&mut out.colors, styling.stroke.clone());
                }
            }
            ElementKind::Image { .. } => {}
            ElementKind::Table { table } => {
                push_unique(&mut out.fonts, table.font_family.clone());
                push_unique(&mut out.colors, table.text_color.clone());
                push_unique(&mut out.colors, table.border_color.clone());
                for paint in [&table.header_background, &table.cell_background] {
                    if let Paint::Hex(hex) = paint {
                        push_unique(&mut out.colors, hex.clone());
                    }
                }
                push_unique(&mut out.font_sizes, table.font_size);
            }
        }

        let snap = snapshot(element);
        match out.unique_styles.iter().position(|existing| same_style(existing, &snap)) {
            Some(i) => out.unique_styles[i].element_ids.push(element.id.clone()),
            None => out.unique_styles.push(StyleSnapshot {
                element_ids: vec![element.id.clone()],
                ..snap
            }),
        }
    }

    out.font_sizes.sort_by(f64::total_cmp);
    out
}

pub fn statistics(elements: &[Element]) -> Statistics {
    let mut counts = TypeCounts::default();
    let mut total_width = 0.0;
    let mut total_height = 0.0;
    let mut total_area = 0.0;

    for element in elements {
        match element.element_type() {
            ElementType::Text => counts.text += 1,
            ElementType::Rectangle => counts.rectangle += 1,
            ElementType::Image => counts.image += 1,
            ElementType::Table => counts.table += 1,
        }
        total_width += element.size.width;
        total_height += element.size.height;
        total_area += element.area();
    }

    let n = elements.len();
    let average_size = if n == 0 {
        Size::default()
    } else {
        Size {
            width: total_width / n as f64,
            height: total_height / n as f64,
        }
    };

    Statistics {
        total_elements: n,
        element_types: counts,
        average_size,
        total_area,
    }
}

/// Non-fatal observations about a valid document.
pub fn warnings(elements: &[Element], canvas: &CanvasInfo) -> Vec<String> {
    let mut out = Vec::new();

    if elements.is_empty() {
        out.push("document has no elements".to_string());
    }

    let mut seen = HashSet::new();
    for element in elements {
        if !seen.insert(element.id.as_str()) {
            out.push(format!("duplicate element id '{}'", element.id));
        }
    }

    for element in elements {
        if !element.visible {
            out.push(format!("element '{}' is hidden and will not be rendered", element.id));
        }
        if element.position.x < 0.0
            || element.position.y < 0.0
            || element.right() > canvas.size.width
            || element.bottom() > canvas.size.height
        {
            out.push(format!("element '{}' extends beyond the canvas", element.id));
        }
    }

    out
}
