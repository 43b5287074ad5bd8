//! CSS building blocks for the embedded stylesheet.

use std::fmt::{self, Write};

/// Pixel length. Fractional values are kept exactly as given.
pub fn px(value: f64) -> String {
    // Avoid "-0px"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{}px", value)
}

/// A `font-family` value safe to embed in a `<style>` block.
///
/// Keeps letters, digits, spaces, commas, hyphens, underscores and quotes;
/// a single family name containing spaces is quoted.
pub fn font_family(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '-' | '_' | '\'' | '"'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return "sans-serif".to_string();
    }
    if cleaned.contains(',') || cleaned.contains('"') || cleaned.contains('\'') || !cleaned.contains(' ') {
        cleaned.to_string()
    } else {
        format!("\"{}\"", cleaned)
    }
}

/// Ordered property list for one rule.
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    entries: Vec<(&'static str, String)>,
}

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: &'static str, value: impl Into<String>) -> &mut Self {
        self.entries.push((property, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Selector → declarations, written in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<(String, Declarations)>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; empty declaration lists are skipped.
    pub fn rule(&mut self, selector: impl Into<String>, declarations: Declarations) {
        if !declarations.is_empty() {
            self.rules.push((selector.into(), declarations));
        }
    }

    /// Raw at-rule or pre-formatted rule text.
    pub fn raw(&mut self, text: impl Into<String>) {
        self.rules.push((text.into(), Declarations::new()));
    }

    /// One rule per line: `selector{prop:value;prop:value}`.
    pub fn write_to(&self, out: &mut String) -> fmt::Result {
        for (selector, decls) in &self.rules {
            if decls.is_empty() {
                writeln!(out, "{}", selector)?;
                continue;
            }
            out.push_str(selector);
            out.push('{');
            for (i, (property, value)) in decls.entries.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                write!(out, "{}:{}", property, value)?;
            }
            out.push_str("}\n");
        }
        Ok(())
    }
}
