//! Value rendering, name-based format checks and currency auto-formatting.
//!
//! A field's kind comes from the last word of its path's final segment, so
//! `listing.list_price` and `listing.listPrice` both count as `price`.
//! `phoneNumber` and `emailAddress` style names are recognised as well.
//! Unknown names get no checks and no formatting.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap();
}

const CURRENCY_WORDS: &[&str] = &[
    "price", "amount", "total", "subtotal", "cost", "fee", "fees", "salary", "rent", "balance",
    "deposit", "tax", "commission",
];
const PHONE_WORDS: &[&str] = &["phone", "mobile", "tel", "telephone", "fax", "cell"];
const EMAIL_WORDS: &[&str] = &["email", "mail"];
const URL_WORDS: &[&str] = &["url", "website", "link", "href"];

/// Kind of value a field name suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Currency,
    Phone,
    Email,
    Url,
    Other,
}

/// Split the last path segment into lowercase words on `_`, `-` and camelCase humps.
fn last_words(path: &str) -> Vec<String> {
    let segment = path.rsplit('.').next().unwrap_or(path);
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in segment.chars() {
        if c == '_' || c == '-' || c == '$' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

impl FieldKind {
    pub fn of(path: &str) -> Self {
        let words = last_words(path);
        let Some(last) = words.last().map(String::as_str) else {
            return FieldKind::Other;
        };
        // "phoneNumber", "emailAddress"
        let head = words.first().map(String::as_str).unwrap_or(last);
        let trailing_noun = matches!(last, "number" | "address" | "no");

        if CURRENCY_WORDS.contains(&last) {
            FieldKind::Currency
        } else if PHONE_WORDS.contains(&last) || (trailing_noun && PHONE_WORDS.contains(&head)) {
            FieldKind::Phone
        } else if EMAIL_WORDS.contains(&last) || (trailing_noun && EMAIL_WORDS.contains(&head)) {
            FieldKind::Email
        } else if URL_WORDS.contains(&last) {
            FieldKind::Url
        } else {
            FieldKind::Other
        }
    }
}

/// Render a resolved JSON value as substitution text.
///
/// `None` for `null`, which counts as missing.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.iter().all(is_scalar) => Some(
            items
                .iter()
                .filter_map(render_value)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Check a value against the shape its field name suggests.
///
/// Returns a message when the value looks wrong; the value is used either way.
pub fn check(kind: FieldKind, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match kind {
        FieldKind::Phone => {
            let digits = value.chars().filter(char::is_ascii_digit).count();
            (!(7..=15).contains(&digits))
                .then(|| format!("phone number should have 7-15 digits, found {}", digits))
        }
        FieldKind::Email => {
            (!EMAIL_RE.is_match(value)).then(|| "value does not look like an email address".to_string())
        }
        FieldKind::Url => {
            let lower = value.to_ascii_lowercase();
            (!(lower.starts_with("http://") || lower.starts_with("https://")))
                .then(|| "URL should start with http:// or https://".to_string())
        }
        FieldKind::Currency | FieldKind::Other => None,
    }
}

/// Currency text for a plain numeric value, e.g. `1234.5` → `$1,234.50`.
///
/// `None` when the value is not a bare number (already formatted, text, ...).
pub fn format_currency(value: &str, symbol: &str) -> Option<String> {
    let value = value.trim();
    if !NUMERIC_RE.is_match(value) {
        return None;
    }
    let number: f64 = value.parse().ok()?;
    if !number.is_finite() {
        return None;
    }

    let fixed = format!("{:.2}", number.abs());
    let (int_part, frac_part) = fixed.split_once('.')?;
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if number < 0.0 && fixed != "0.00" { "-" } else { "" };
    Some(format!("{}{}{}.{}", sign, symbol, grouped, frac_part))
}

/// Built-in date/time variables for `now`.
pub fn builtin_variables(now: DateTime<Local>) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("date", now.format("%B %-d, %Y").to_string()); // January 27, 2026
    vars.insert("date_short", now.format("%b %-d").to_string()); // Jan 27
    vars.insert("day", now.format("%A").to_string()); // Tuesday
    vars.insert("time", now.format("%H:%M").to_string()); // 09:30
    vars.insert("time_12h", now.format("%-I:%M %p").to_string()); // 9:30 AM
    vars.insert("datetime", now.format("%a, %b %-d %H:%M").to_string()); // Tue, Jan 27 09:30
    vars.insert("year", now.format("%Y").to_string());
    vars.insert("iso_date", now.format("%Y-%m-%d").to_string()); // 2026-01-27
    vars
}
