//! # Variable Replacement
//!
//! Substitutes runtime data into `{{path.to.value}}` placeholders.
//!
//! Each distinct path is resolved once per call by walking the data object
//! (numeric segments index arrays), then run through:
//!
//! 1. **Sanitize**: script blocks, script/iframe/object/embed tags, script URI
//!    schemes and inline event handlers are stripped (`SECURITY_WARNING`)
//! 2. **Check**: phone, email and URL named fields are shape-checked
//!    (`VALIDATION_WARNING`, value still used)
//! 3. **Format**: currency named fields holding a bare number get a symbol,
//!    thousands separators and two decimals
//! 4. **Escape**: HTML-escaped unless `escapeHtml` is off
//!
//! Unresolved paths (absent or `null`) never fail the call. They are listed in
//! `missing` and the placeholder is kept or removed per [`MissingPolicy`].
//!
//! ```
//! use serde_json::json;
//! use tb365::options::ReplaceOptions;
//! use tb365::replace::replace_variables;
//!
//! let result = replace_variables(
//!     "<p>{{agent.name}} - {{listing.price}} - {{agent.fax}}</p>",
//!     &json!({"agent": {"name": "Jo <3"}, "listing": {"price": 450000}}),
//!     &ReplaceOptions::default(),
//! );
//! assert_eq!(result.html, "<p>Jo &lt;3 - $450,000.00 - {{agent.fax}}</p>");
//! assert_eq!(result.missing, ["agent.fax"]);
//! assert_eq!(result.statistics.replaced_variables, 2);
//! ```

pub mod format;
pub mod sanitize;

use std::collections::HashMap;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use serde_json::Value;

use crate::content::placeholders;
use crate::html::escape_html;
use crate::options::{MissingPolicy, ReplaceOptions};
use format::FieldKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    #[serde(rename = "SECURITY_WARNING")]
    Security,
    #[serde(rename = "VALIDATION_WARNING")]
    Validation,
}

/// A non-fatal problem with one data value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    /// Variable path the value was bound to.
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementStatistics {
    /// Distinct paths encountered.
    pub total_variables: usize,
    /// Distinct paths that resolved.
    pub replaced_variables: usize,
}

impl ReplacementStatistics {
    /// Resolved share in `[0, 1]`; `1.0` when there was nothing to replace.
    pub fn rate(&self) -> f64 {
        if self.total_variables == 0 {
            1.0
        } else {
            self.replaced_variables as f64 / self.total_variables as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementResult {
    pub success: bool,
    pub html: String,
    /// Unresolved paths, first-seen order.
    pub missing: Vec<String>,
    pub warnings: Vec<ReplacementWarning>,
    pub statistics: ReplacementStatistics,
    /// Milliseconds for the whole call.
    pub processing_time: f64,
}

impl ReplacementResult {
    pub fn has_security_warnings(&self) -> bool {
        self.warnings.iter().any(|w| w.kind == WarningKind::Security)
    }
}

/// Per-call resolution state. Lives only for one [`replace_variables`] call.
struct Resolver<'a, 'h> {
    data: &'a Value,
    options: &'a ReplaceOptions,
    builtins: HashMap<&'static str, String>,
    /// Final substitution text per path, `None` when unresolved.
    cache: HashMap<&'h str, Option<String>>,
    missing: Vec<String>,
    warnings: Vec<ReplacementWarning>,
}

impl<'a, 'h> Resolver<'a, 'h> {
    fn new(data: &'a Value, options: &'a ReplaceOptions) -> Self {
        let builtins = if options.builtins {
            format::builtin_variables(Local::now())
        } else {
            HashMap::new()
        };
        Self {
            data,
            options,
            builtins,
            cache: HashMap::new(),
            missing: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn substitution(&mut self, path: &'h str) -> Option<&str> {
        if !self.cache.contains_key(path) {
            let resolved = self.resolve(path);
            if resolved.is_none() {
                self.missing.push(path.to_string());
            }
            self.cache.insert(path, resolved);
        }
        self.cache.get(path).and_then(|s| s.as_deref())
    }

    fn resolve(&mut self, path: &str) -> Option<String> {
        let value = lookup(self.data, path).and_then(format::render_value);
        let raw = match value {
            Some(raw) => raw,
            None => self.builtins.get(path).cloned()?,
        };

        let (clean, threats) = sanitize::sanitize(raw);
        for threat in threats {
            log::warn!("stripped unsafe content from '{}': {}", path, threat.describe());
            self.warn(WarningKind::Security, path, threat.describe().to_string());
        }

        let kind = FieldKind::of(path);
        if let Some(message) = format::check(kind, &clean) {
            self.warn(WarningKind::Validation, path, message);
        }

        let text = match kind {
            FieldKind::Currency if self.options.auto_format => {
                format::format_currency(&clean, &self.options.currency_symbol).unwrap_or(clean)
            }
            _ => clean,
        };

        Some(if self.options.escape_html {
            escape_html(&text)
        } else {
            text
        })
    }

    fn warn(&mut self, kind: WarningKind, key: &str, message: String) {
        self.warnings.push(ReplacementWarning {
            kind,
            key: key.to_string(),
            message,
        });
    }

    fn statistics(&self) -> ReplacementStatistics {
        ReplacementStatistics {
            total_variables: self.cache.len(),
            replaced_variables: self.cache.values().filter(|v| v.is_some()).count(),
        }
    }
}

/// Walk `data` along a dot path. `null` leaves are returned as-is.
pub fn lookup<'v>(data: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(data, |node, key| match node {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Replace every placeholder in `html` with data values.
///
/// Never fails: data problems end up in `missing` and `warnings`. Text outside
/// placeholders is copied unchanged.
pub fn replace_variables(html: &str, data: &Value, options: &ReplaceOptions) -> ReplacementResult {
    let start = Instant::now();
    let mut resolver = Resolver::new(data, options);

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for placeholder in placeholders(html) {
        out.push_str(&html[last..placeholder.range.start]);
        match resolver.substitution(placeholder.path) {
            Some(text) => out.push_str(text),
            None if options.missing == MissingPolicy::Leave => out.push_str(placeholder.token),
            None => {}
        }
        last = placeholder.range.end;
    }
    out.push_str(&html[last..]);

    let statistics = resolver.statistics();
    log::debug!(
        "replaced {}/{} variables, {} warnings",
        statistics.replaced_variables,
        statistics.total_variables,
        resolver.warnings.len()
    );

    ReplacementResult {
        success: true,
        html: out,
        missing: resolver.missing,
        warnings: resolver.warnings,
        statistics,
        processing_time: start.elapsed().as_secs_f64() * 1000.0,
    }
}
