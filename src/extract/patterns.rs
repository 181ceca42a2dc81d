//! Text-pattern recovery for payloads that defeat structured parsing.
//!
//! Applied when the payload was never classified as JSON, or when it looked
//! like JSON but strict parsing failed (truncated producers are common).

use super::decode::decode_fragment;
use regex::Regex;
use std::sync::LazyLock;

/// Ordered fallback patterns. Priority is load-bearing: a payload can satisfy
/// several patterns with different captures, and the first non-empty capture
/// wins. JSON-shaped captures run before the XML tag captures, and each
/// variant is matched case-sensitively.
static BODY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Double-quoted JSON field, tolerant of embedded newlines; the
        // capture stops at the first unescaped closing quote.
        r#"(?s)"Body"\s*:\s*"((?:\\.|[^"\\])*)""#,
        r#"(?s)"body"\s*:\s*"((?:\\.|[^"\\])*)""#,
        r#"(?s)"BODY"\s*:\s*"((?:\\.|[^"\\])*)""#,
        // Single-quoted JSON-like variant.
        r"(?s)'Body'\s*:\s*'((?:\\.|[^'\\])*)'",
        // XML tag flavor; attributes on the opening tag are ignored.
        r"(?s)<Body[^>]*>(.*?)</Body>",
        r"(?s)<body[^>]*>(.*?)</body>",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("body pattern must compile"))
    .collect()
});

/// Runs the pattern chain against the raw payload and returns the first
/// non-empty capture, fully decoded.
pub(crate) fn body_from_patterns(payload: &str) -> Option<String> {
    BODY_PATTERNS
        .iter()
        .filter_map(|pattern| pattern.captures(payload))
        .filter_map(|caps| caps.get(1))
        .map(|capture| capture.as_str())
        .find(|capture| !capture.is_empty())
        .map(decode_fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_field_capture() {
        assert_eq!(body_from_patterns(r#"garbage "Body":"hello" trailing"#).as_deref(), Some("hello"));
    }

    #[test]
    fn json_field_capture_spans_lines() {
        assert_eq!(body_from_patterns("\"Body\":\"line1\nline2\"").as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn json_field_capture_decodes_escapes() {
        assert_eq!(body_from_patterns(r#""Body":"line1\nline2""#).as_deref(), Some("line1\nline2"));
    }

    #[test]
    fn json_field_capture_stops_at_unescaped_quote() {
        assert_eq!(body_from_patterns(r#""Body":"say \"hi\" now","Next":"x""#).as_deref(), Some(r#"say "hi" now"#));
    }

    #[test]
    fn lowercase_and_uppercase_variants() {
        assert_eq!(body_from_patterns(r#"{"body":"low"}"#).as_deref(), Some("low"));
        assert_eq!(body_from_patterns(r#"{"BODY":"up"}"#).as_deref(), Some("up"));
    }

    #[test]
    fn single_quoted_variant() {
        assert_eq!(body_from_patterns("'Body':'quoted content'").as_deref(), Some("quoted content"));
    }

    #[test]
    fn xml_tag_capture() {
        assert_eq!(body_from_patterns("<Envelope><Body>Hello</Body></Envelope>").as_deref(), Some("Hello"));
    }

    #[test]
    fn xml_tag_capture_ignores_attributes_and_spans_lines() {
        let payload = "<Body xmlns=\"urn:x\">first\nsecond</Body>";
        assert_eq!(body_from_patterns(payload).as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn xml_lowercase_tag_variant() {
        assert_eq!(body_from_patterns("<html><body>page</body></html>").as_deref(), Some("page"));
    }

    #[test]
    fn json_shape_outranks_xml_tag() {
        // Both shapes present: the JSON-shaped capture must win.
        let payload = r#"{"Body":"from json"} <Body>from xml</Body>"#;
        assert_eq!(body_from_patterns(payload).as_deref(), Some("from json"));
    }

    #[test]
    fn empty_capture_falls_through_to_next_pattern() {
        let payload = r#""Body":"" <Body>tag content</Body>"#;
        assert_eq!(body_from_patterns(payload).as_deref(), Some("tag content"));
    }

    #[test]
    fn no_pattern_matches() {
        assert_eq!(body_from_patterns("not json, not xml, just text"), None);
    }
}
