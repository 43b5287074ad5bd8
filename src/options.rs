//! # Conversion Options
//!
//! Explicit configuration values passed into the pipeline. Nothing in the
//! pipeline reads ambient state: the same document, data and options always
//! produce the same output.
//!
//! ## JSON form
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `escapeHtml` | `true` | HTML-escape substituted values |
//! | `missing` | `"leave"` | `"leave"` keeps unresolved `{{path}}` text, `"strip"` removes it |
//! | `autoFormat` | `true` | Format currency-like fields (`price`, `amount`, ...) |
//! | `currencySymbol` | `"$"` | Prefix used by auto-formatting |
//! | `builtins` | `false` | Fill `{{date}}`, `{{time}}`, ... when the data lacks them |
//!
//! ```
//! use tb365::options::{ConvertOptions, MissingPolicy};
//!
//! let opts: ConvertOptions = serde_json::from_str(r#"{"missing": "strip"}"#).unwrap();
//! assert_eq!(opts.replace.missing, MissingPolicy::Strip);
//! assert!(opts.replace.escape_html);
//! ```

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

/// What to do with a placeholder whose path does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Keep the original `{{path}}` text in the output.
    #[default]
    Leave,
    /// Remove the placeholder entirely.
    Strip,
}

/// Options for the variable replacer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOptions {
    #[serde(default = "default_true")]
    pub escape_html: bool,
    #[serde(default)]
    pub missing: MissingPolicy,
    #[serde(default = "default_true")]
    pub auto_format: bool,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub builtins: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            escape_html: true,
            missing: MissingPolicy::Leave,
            auto_format: true,
            currency_symbol: default_currency_symbol(),
            builtins: false,
        }
    }
}

/// Options for a full conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    #[serde(flatten)]
    pub replace: ReplaceOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let opts: ConvertOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ConvertOptions::default());
        assert_eq!(opts.replace.currency_symbol, "$");
        assert!(!opts.replace.builtins);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{"escapeHtml": false, "autoFormat": false, "currencySymbol": "€", "missing": "strip"}"#;
        let opts: ReplaceOptions = serde_json::from_str(json).unwrap();
        assert!(!opts.escape_html);
        assert!(!opts.auto_format);
        assert_eq!(opts.currency_symbol, "€");
        assert_eq!(opts.missing, MissingPolicy::Strip);
    }

    #[test]
    fn test_unknown_missing_policy_rejected() {
        let result: Result<ReplaceOptions, _> = serde_json::from_str(r#"{"missing": "explode"}"#);
        assert!(result.is_err());
    }
}
