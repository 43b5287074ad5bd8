//! Accumulating field reader over a raw JSON object.
//!
//! Every accessor records a message on failure and returns `None` instead of
//! stopping, so one pass over an object reports all of its problems.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::types::Paint;

lazy_static! {
    static ref HEX_COLOR_RE: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// True for a `#rrggbb` color.
pub fn is_hex_color(s: &str) -> bool {
    HEX_COLOR_RE.is_match(s)
}

/// Reads typed fields from one JSON object, collecting every violation.
pub struct Fields<'a> {
    obj: &'a Map<String, Value>,
    /// Prefix for field names in messages (e.g. `"canvasSize."`).
    prefix: String,
    errors: Vec<String>,
}

impl<'a> Fields<'a> {
    pub fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            prefix: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_prefix(obj: &'a Map<String, Value>, prefix: &str) -> Self {
        Self {
            obj,
            prefix: prefix.to_string(),
            errors: Vec::new(),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        match self.obj.get(key) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn missing(&mut self, key: &str) {
        let msg = format!("{} is required", self.name(key));
        self.errors.push(msg);
    }

    fn invalid(&mut self, key: &str, requirement: &str) {
        let msg = format!("{} must be {}", self.name(key), requirement);
        self.errors.push(msg);
    }

    /// Required string (may be empty).
    pub fn string(&mut self, key: &str) -> Option<String> {
        match self.raw(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.invalid(key, "a string");
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    /// Required non-empty string.
    pub fn non_empty_string(&mut self, key: &str) -> Option<String> {
        match self.raw(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(_) => {
                self.invalid(key, "a non-empty string");
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    pub fn boolean(&mut self, key: &str) -> Option<bool> {
        match self.raw(key) {
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.invalid(key, "a boolean");
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    /// Required finite number satisfying `check`; `requirement` completes
    /// "`key` must be ..." when it does not.
    pub fn number(&mut self, key: &str, check: fn(f64) -> bool, requirement: &str) -> Option<f64> {
        match self.raw(key) {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() && check(v) => Some(v),
                _ => {
                    self.invalid(key, requirement);
                    None
                }
            },
            Some(_) => {
                self.invalid(key, requirement);
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    pub fn positive(&mut self, key: &str) -> Option<f64> {
        self.number(key, |v| v > 0.0, "a positive number")
    }

    pub fn non_negative(&mut self, key: &str) -> Option<f64> {
        self.number(key, |v| v >= 0.0, "a non-negative number")
    }

    /// Optional number with a default when absent; still rejects non-numbers.
    pub fn number_or(&mut self, key: &str, default: f64, check: fn(f64) -> bool, requirement: &str) -> Option<f64> {
        if self.has(key) {
            self.number(key, check, requirement)
        } else {
            Some(default)
        }
    }

    /// Required integral number (accepts `3` and `3.0`).
    pub fn integer(&mut self, key: &str) -> Option<i64> {
        self.number(key, |v| v.fract() == 0.0 && v.abs() < 9.0e15, "an integer")
            .map(|v| v as i64)
    }

    pub fn positive_integer(&mut self, key: &str) -> Option<usize> {
        self.number(
            key,
            |v| v.fract() == 0.0 && v >= 1.0 && v < 1.0e9,
            "a positive integer",
        )
        .map(|v| v as usize)
    }

    /// Required string that must be one of `allowed`.
    pub fn one_of<T>(&mut self, key: &str, parse: fn(&str) -> Option<T>, allowed: &[&str]) -> Option<T> {
        match self.raw(key) {
            Some(Value::String(s)) => match parse(s) {
                Some(v) => Some(v),
                None => {
                    self.invalid(key, &format!("one of {}", allowed.join(", ")));
                    None
                }
            },
            Some(_) => {
                self.invalid(key, &format!("one of {}", allowed.join(", ")));
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    /// Required `#rrggbb` color, lowercased.
    pub fn hex(&mut self, key: &str) -> Option<String> {
        match self.raw(key) {
            Some(Value::String(s)) if is_hex_color(s) => Some(s.to_ascii_lowercase()),
            Some(_) => {
                self.invalid(key, "a 6-digit hex color");
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    /// Required `#rrggbb` color or `transparent`.
    pub fn paint(&mut self, key: &str) -> Option<Paint> {
        match self.raw(key) {
            Some(Value::String(s)) if s.eq_ignore_ascii_case("transparent") => {
                Some(Paint::Transparent)
            }
            Some(Value::String(s)) if is_hex_color(s) => Some(Paint::Hex(s.to_ascii_lowercase())),
            Some(_) => {
                self.invalid(key, "hex or transparent");
                None
            }
            None => {
                self.missing(key);
                None
            }
        }
    }

    /// Optional color: absent, empty or `transparent` mean "not set".
    pub fn optional_hex(&mut self, key: &str) -> Option<Option<String>> {
        match self.raw(key) {
            None => Some(None),
            Some(Value::String(s)) if s.is_empty() || s.eq_ignore_ascii_case("transparent") => {
                Some(None)
            }
            Some(Value::String(s)) if is_hex_color(s) => Some(Some(s.to_ascii_lowercase())),
            Some(_) => {
                self.invalid(key, "hex or transparent");
                None
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Move this reader's messages into another reader.
    pub fn merge_into(self, other: &mut Fields<'_>) {
        other.errors.extend(self.errors);
    }
}
