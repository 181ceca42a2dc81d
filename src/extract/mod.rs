//! Payload body-extraction engine.
//!
//! Stored payloads carry no format contract: producers have queued JSON,
//! JSON with escaped HTML, a custom Body-tag flavor of XML, and truncated
//! variants of each. Recovery runs an ordered chain of strategies — a cheap
//! format sniff, structured JSON extraction, then text patterns — and always
//! terminates with either real content or a clearly marked diagnostic string.
//! No parse failure escapes this module.

pub mod decode;
mod patterns;
mod structured;
mod update;

pub use update::apply_recipient_update;

use crate::domain::content::{ExtractedContent, ExtractedFields};
use decode::escape_html;

/// Sentinel prefix of the diagnostic placeholder emitted when every recovery
/// tier came up empty. The presentation layer may match on it.
pub const BODY_NOT_FOUND_MARKER: &str = "[no body found]";

/// How much raw payload text the diagnostic placeholder shows.
const DIAGNOSTIC_PREVIEW_CHARS: usize = 1_000;

/// Classifies a payload as structured (JSON-object shaped) or not.
///
/// Deliberately a heuristic rather than a parse attempt: payloads are often
/// truncated, and a blob that merely starts with `{` should still be routed
/// through structured extraction first.
#[must_use]
pub fn looks_structured(payload: &str) -> bool {
    payload.trim_start().starts_with('{')
}

/// Recovers displayable body content and metadata from a raw payload.
///
/// Pure and infallible: strategies are tried in order (structured JSON when
/// the sniffer is favorable, then the pattern chain) and the result degrades
/// to a diagnostic placeholder when nothing matched.
#[must_use]
pub fn extract_body(payload: &str) -> ExtractedContent {
    let is_structured = looks_structured(payload);

    let mut body = String::new();
    if is_structured {
        body = structured::body_from_json(payload).unwrap_or_default();
    }
    if body.is_empty() {
        body = patterns::body_from_patterns(payload).unwrap_or_default();
    }

    let body_html = if body.is_empty() { diagnostic_placeholder(payload) } else { body };

    ExtractedContent { body_html, fields: extract_fields(payload), is_structured }
}

/// Extracts only the metadata field set. Unstructured payloads yield the
/// fully-populated default (all fields empty).
#[must_use]
pub fn extract_fields(payload: &str) -> ExtractedFields {
    if looks_structured(payload) { structured::fields_from_json(payload) } else { ExtractedFields::default() }
}

/// Last-resort output: a recognizable marker plus a bounded, display-safe
/// copy of the raw payload.
fn diagnostic_placeholder(payload: &str) -> String {
    let preview: String = payload.chars().take(DIAGNOSTIC_PREVIEW_CHARS).collect();
    format!("{BODY_NOT_FOUND_MARKER}<br><pre>{}</pre>", escape_html(&preview))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_payload_with_body_key() {
        let payload = json!({"Body": "hello", "To": "a@x.com", "Unrelated": true}).to_string();
        let content = extract_body(&payload);
        assert_eq!(content.body_html, "hello");
        assert!(content.is_structured);
        assert_eq!(content.fields.to, "a@x.com");
    }

    #[test]
    fn structured_sniff_is_heuristic_whitespace_tolerant() {
        assert!(looks_structured("  \n\t{\"Body\":\"x\"}"));
        assert!(!looks_structured("<Body>x</Body>"));
        assert!(!looks_structured(""));
    }

    #[test]
    fn json_prefix_with_parse_failure_falls_through_to_patterns() {
        // Looks structured, strict parse fails; the pattern chain still
        // recovers the body.
        let payload = r#"{"Caption":"x","Body":"recovered","Broken": "#;
        let content = extract_body(payload);
        assert_eq!(content.body_html, "recovered");
        assert!(content.is_structured);
    }

    #[test]
    fn xml_payload_with_entities() {
        let content = extract_body("<Body>Hello &amp; welcome</Body>");
        assert_eq!(content.body_html, "Hello & welcome");
        assert!(!content.is_structured);
        assert_eq!(content.fields, ExtractedFields::default());
    }

    #[test]
    fn json_fragment_recovered_by_pattern_fallback() {
        let content = extract_body(r#""Body":"line1\nline2""#);
        assert_eq!(content.body_html, "line1\nline2");
        assert!(!content.is_structured);
    }

    #[test]
    fn plain_text_yields_diagnostic_placeholder() {
        let content = extract_body("not json, not xml, just text");
        assert!(content.body_html.starts_with(BODY_NOT_FOUND_MARKER));
        assert!(content.body_html.contains("not json, not xml, just text"));
    }

    #[test]
    fn diagnostic_placeholder_escapes_and_truncates() {
        let payload = format!("<script>alert('x')</script>{}", "y".repeat(2_000));
        let content = extract_body(&payload);
        assert!(content.body_html.starts_with(BODY_NOT_FOUND_MARKER));
        assert!(content.body_html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!content.body_html.contains("<script>"));
        // Marker and wrapper aside, at most 1000 chars of payload survive.
        let y_run = content.body_html.chars().filter(|&c| c == 'y').count();
        assert!(y_run <= 1_000 - "<script>alert('x')</script>".len());
    }

    #[test]
    fn structured_body_preferred_over_pattern_match() {
        // Valid JSON whose Body would also satisfy the XML pattern: the
        // structured tier must supply the (decoded) value.
        let payload = json!({"Body": "<body>inner</body>"}).to_string();
        assert_eq!(extract_body(&payload).body_html, "<body>inner</body>");
    }

    #[test]
    fn empty_payload_yields_placeholder() {
        let content = extract_body("");
        assert!(content.body_html.starts_with(BODY_NOT_FOUND_MARKER));
        assert!(!content.is_structured);
    }
}
