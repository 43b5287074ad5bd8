//! # Content Processing
//!
//! Read-only analysis of the text a document carries. Every text-bearing
//! location (a text element's `content`, a table cell, an image `src`) is
//! classified as pure literal, a single placeholder, or a mix of both, and its
//! `{{path.to.value}}` references are extracted.
//!
//! The distinct variable paths form the document's variable set, from which a
//! [`DataSchema`] (nested skeleton of the expected data) and sample data can be
//! derived without any runtime data.
//!
//! ```
//! use tb365::content::{classify, variable_paths, ContentKind};
//!
//! assert_eq!(classify("Hello"), ContentKind::Literal);
//! assert_eq!(classify("{{agency.name}}"), ContentKind::Variable);
//! assert_eq!(classify("Call {{agency.phone}}"), ContentKind::Mixed);
//! assert_eq!(variable_paths("{{ a.b }} and {{c}}"), vec!["a.b", "c"]);
//! ```

mod schema;

pub use schema::{DataSchema, SchemaNode};

use std::collections::HashSet;
use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::document::types::{Element, ElementKind};

lazy_static! {
    /// `{{ path.to.value }}`: first segment starts with a letter, `_` or `$`;
    /// later segments may be numeric array indices.
    pub static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_$][\w$-]*(?:\.[\w$-]+)*)\s*\}\}").unwrap();
}

/// One `{{path}}` occurrence in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole `{{...}}` token.
    pub range: Range<usize>,
    /// The full token text, braces included.
    pub token: &'a str,
    /// The dot path, trimmed.
    pub path: &'a str,
}

/// Iterate over placeholders in source order.
pub fn placeholders(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER_RE.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let path = caps.get(1)?;
        Some(Placeholder {
            range: whole.range(),
            token: whole.as_str(),
            path: path.as_str(),
        })
    })
}

/// Variable paths referenced in `text`, in order, repeats included.
pub fn variable_paths(text: &str) -> Vec<String> {
    placeholders(text).map(|p| p.path.to_string()).collect()
}

/// Classification of a text-bearing location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// No placeholders.
    Literal,
    /// Exactly one placeholder and nothing else (surrounding whitespace aside).
    Variable,
    /// Literal text interleaved with placeholders.
    Mixed,
}

pub fn classify(content: &str) -> ContentKind {
    let mut found = PLACEHOLDER_RE.find_iter(content);
    match found.next() {
        None => ContentKind::Literal,
        Some(first) if found.next().is_none() && content.trim() == first.as_str() => {
            ContentKind::Variable
        }
        Some(_) => ContentKind::Mixed,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEntry {
    pub element_id: String,
    pub content: String,
    pub kind: ContentKind,
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEntry {
    pub element_id: String,
    pub row: usize,
    pub column: usize,
    pub content: String,
    pub is_header: bool,
    pub kind: ContentKind,
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSourceEntry {
    pub element_id: String,
    pub src: String,
    pub kind: ContentKind,
    pub variables: Vec<String>,
}

/// Text locations of a document and its variable set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub text_elements: Vec<TextEntry>,
    pub table_cells: Vec<CellEntry>,
    pub image_sources: Vec<ImageSourceEntry>,
    /// Distinct paths in first-seen order (element order, then cell order).
    pub variables: Vec<String>,
}

impl ContentAnalysis {
    /// Nested skeleton of the data this document expects.
    pub fn schema(&self) -> DataSchema {
        DataSchema::from_paths(&self.variables)
    }

    /// Number of locations holding at least one placeholder.
    pub fn dynamic_locations(&self) -> usize {
        self.text_elements.iter().filter(|e| !e.variables.is_empty()).count()
            + self.table_cells.iter().filter(|c| !c.variables.is_empty()).count()
            + self.image_sources.iter().filter(|i| !i.variables.is_empty()).count()
    }
}

/// Collects distinct paths while preserving first-seen order.
#[derive(Default)]
struct VariableSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl VariableSet {
    fn extend(&mut self, paths: &[String]) {
        for path in paths {
            if self.seen.insert(path.clone()) {
                self.ordered.push(path.clone());
            }
        }
    }
}

/// Walk the elements and classify every text-bearing location.
pub fn analyze(elements: &[Element]) -> ContentAnalysis {
    let mut analysis = ContentAnalysis::default();
    let mut set = VariableSet::default();

    for element in elements {
        match &element.kind {
            ElementKind::Text { content, .. } => {
                let variables = variable_paths(content);
                set.extend(&variables);
                analysis.text_elements.push(TextEntry {
                    element_id: element.id.clone(),
                    content: content.clone(),
                    kind: classify(content),
                    variables,
                });
            }
            ElementKind::Table { table } => {
                for (row, cells) in table.cells.iter().enumerate() {
                    for (column, cell) in cells.iter().enumerate() {
                        let variables = variable_paths(&cell.content);
                        set.extend(&variables);
                        analysis.table_cells.push(CellEntry {
                            element_id: element.id.clone(),
                            row,
                            column,
                            content: cell.content.clone(),
                            is_header: cell.is_header,
                            kind: classify(&cell.content),
                            variables,
                        });
                    }
                }
            }
            ElementKind::Image { src, .. } if !src.trim().is_empty() => {
                let variables = variable_paths(src);
                set.extend(&variables);
                analysis.image_sources.push(ImageSourceEntry {
                    element_id: element.id.clone(),
                    src: src.clone(),
                    kind: classify(src),
                    variables,
                });
            }
            ElementKind::Image { .. } | ElementKind::Rectangle { .. } => {}
        }
    }

    analysis.variables = set.ordered;
    analysis
}
