//! Removal of script-capable content from substituted values.
//!
//! The pattern list is a starting policy, not a complete XSS filter. Escaping
//! (on by default) is what keeps values inert; stripping makes sure a value
//! stays harmless even when a caller turns escaping off.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_BLOCK_RE: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap();
    static ref SCRIPT_TAG_RE: Regex = Regex::new(r"(?i)</?script\b[^>]*>?").unwrap();
    static ref EMBED_TAG_RE: Regex =
        Regex::new(r"(?i)</?(?:iframe|object|embed)\b[^>]*>?").unwrap();
    static ref SCRIPT_URI_RE: Regex = Regex::new(r"(?i)\b(?:javascript|vbscript)\s*:").unwrap();
    static ref DATA_HTML_RE: Regex = Regex::new(r"(?i)\bdata\s*:\s*text/html").unwrap();
    static ref EVENT_HANDLER_RE: Regex = Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap();
}

/// What a pattern caught, in the order first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threat {
    ScriptBlock,
    ScriptTag,
    EmbeddedObject,
    ScriptUri,
    HtmlDataUri,
    EventHandler,
}

impl Threat {
    pub fn describe(&self) -> &'static str {
        match self {
            Threat::ScriptBlock => "script block removed",
            Threat::ScriptTag => "script tag removed",
            Threat::EmbeddedObject => "iframe/object/embed tag removed",
            Threat::ScriptUri => "script URI scheme removed",
            Threat::HtmlDataUri => "HTML data URI removed",
            Threat::EventHandler => "inline event handler removed",
        }
    }
}

fn patterns() -> [(Threat, &'static Regex); 6] {
    [
        (Threat::ScriptBlock, &*SCRIPT_BLOCK_RE),
        (Threat::ScriptTag, &*SCRIPT_TAG_RE),
        (Threat::EmbeddedObject, &*EMBED_TAG_RE),
        (Threat::ScriptUri, &*SCRIPT_URI_RE),
        (Threat::HtmlDataUri, &*DATA_HTML_RE),
        (Threat::EventHandler, &*EVENT_HANDLER_RE),
    ]
}

/// Passes before giving up on a value that keeps rebuilding patterns.
const MAX_PASSES: usize = 16;

/// Strip every dangerous pattern from `value`.
///
/// The whole pattern list is rerun until a pass finds nothing, since removing
/// one pattern can join the text around it into another
/// (`<scr<iframe>ipt>`). A value still dirty after `MAX_PASSES` loses all
/// angle brackets. Returns the cleaned value and the distinct threats found,
/// empty when the value was already clean. Clean values are returned without
/// reallocating.
pub fn sanitize(mut value: String) -> (String, Vec<Threat>) {
    let mut found = Vec::new();
    for _ in 0..MAX_PASSES {
        let mut matched = false;
        for (threat, re) in patterns() {
            if re.is_match(&value) {
                value = re.replace_all(&value, "").into_owned();
                matched = true;
                if !found.contains(&threat) {
                    found.push(threat);
                }
            }
        }
        if !matched {
            return (value, found);
        }
    }

    if patterns().iter().any(|(_, re)| re.is_match(&value)) {
        value.retain(|c| c != '<' && c != '>');
    }
    (value, found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_values_untouched() {
        for v in ["Jane Doe", "Common = yes", "https://example.com/a?b=1", "data: 42", ""] {
            let (out, threats) = sanitize(v.to_string());
            assert_eq!(out, v);
            assert!(threats.is_empty(), "{v}");
        }
    }

    #[test]
    fn test_script_block_removed() {
        let (out, threats) = sanitize("<script>alert(1)</script>ok".into());
        assert_eq!(out, "ok");
        assert_eq!(threats, vec![Threat::ScriptBlock]);

        let (out, _) = sanitize("a<SCRIPT type=\"x\">\nsteal()\n</Script >b".into());
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_orphan_script_tag_removed() {
        let (out, threats) = sanitize("x<script src=evil.js>".into());
        assert_eq!(out, "x");
        assert_eq!(threats, vec![Threat::ScriptTag]);
    }

    #[test]
    fn test_uri_and_handlers() {
        let (out, threats) = sanitize("<a href=\"javascript:alert(1)\" onclick=\"x()\">".into());
        assert!(!out.to_lowercase().contains("javascript:"));
        assert!(!out.contains("onclick="));
        assert_eq!(threats, vec![Threat::ScriptUri, Threat::EventHandler]);

        let (out, threats) = sanitize("data:text/html;base64,AAAA".into());
        assert_eq!(out, ";base64,AAAA");
        assert_eq!(threats, vec![Threat::HtmlDataUri]);
    }

    #[test]
    fn test_embeds_removed() {
        let (out, threats) = sanitize("<iframe src=x></iframe>hi".into());
        assert_eq!(out, "hi");
        assert_eq!(threats, vec![Threat::EmbeddedObject]);
    }

    #[test]
    fn test_tag_rebuilt_by_removal_is_caught() {
        let (out, threats) = sanitize("<scr<iframe>ipt>alert(1)</scr<iframe>ipt>ok".into());
        assert_eq!(out, "ok");
        assert_eq!(threats, vec![Threat::EmbeddedObject, Threat::ScriptBlock]);

        let (out, threats) = sanitize("<scr<scr<embed>ipt>ipt>x".into());
        assert!(!out.to_lowercase().contains("<script"));
        assert!(threats.contains(&Threat::ScriptTag));

        let (out, _) = sanitize("<a oncl<iframe>ick=\"x()\">".into());
        assert!(!out.contains("onclick"));
    }

    #[test]
    fn test_threats_reported_once() {
        let (_, threats) = sanitize("<iframe></iframe><object>".into());
        assert_eq!(threats, vec![Threat::EmbeddedObject]);
    }
}
