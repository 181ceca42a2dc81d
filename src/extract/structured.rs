//! Body and metadata recovery from payloads that parse as JSON objects.

use super::decode::decode_fragment;
use crate::domain::content::ExtractedFields;
use serde_json::{Map, Value};

/// Body key candidates, highest priority first. Producers have never agreed
/// on a spelling.
const BODY_KEYS: [&str; 6] = ["Body", "body", "BODY", "HtmlBody", "htmlBody", "HTML"];

/// Attempts structured body extraction.
///
/// Returns `None` when the payload is not a JSON object or holds no body
/// candidate; the caller falls through to the pattern chain. Parse failures
/// are swallowed here by design.
pub(crate) fn body_from_json(payload: &str) -> Option<String> {
    let root: Value = serde_json::from_str(payload).ok()?;
    let obj = root.as_object()?;

    for key in BODY_KEYS {
        if let Some(text) = obj.get(key).and_then(Value::as_str) {
            return Some(decode_fragment(text));
        }
    }

    // No named candidate: take the first top-level string that carries an
    // HTML document marker.
    obj.values()
        .filter_map(Value::as_str)
        .find(|text| text.contains("<html") || text.contains("<HTML>"))
        .map(decode_fragment)
}

/// Extracts the fixed metadata field set from a structured payload.
///
/// Lookups are case-insensitive against the payload's top-level keys. Every
/// logical field is populated; a missing key maps to the empty string.
pub(crate) fn fields_from_json(payload: &str) -> ExtractedFields {
    let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(payload) else {
        return ExtractedFields::default();
    };

    ExtractedFields {
        to: text_ci(&obj, "To"),
        to_cc: text_ci(&obj, "ToCC"),
        bcc: text_ci(&obj, "BCC"),
        caption: text_ci(&obj, "Caption"),
        type_mes: text_ci(&obj, "typeMes"),
        correlation_id: text_ci(&obj, "uuid"),
    }
}

fn text_ci(obj: &Map<String, Value>, name: &str) -> String {
    obj.iter()
        .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value))
        .and_then(scalar_text)
        .unwrap_or_default()
}

/// Scalar-to-text conversion matching what lenient JSON tree access gives:
/// strings as-is, numbers and booleans stringified, everything else absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_key_found_among_unrelated_keys() {
        let payload = json!({"To": "a@x.com", "Body": "hello", "Extra": 1}).to_string();
        assert_eq!(body_from_json(&payload).as_deref(), Some("hello"));
    }

    #[test]
    fn body_key_priority_order() {
        let payload = json!({"HtmlBody": "ranked third", "body": "ranked second", "Body": "ranked first"}).to_string();
        assert_eq!(body_from_json(&payload).as_deref(), Some("ranked first"));

        let payload = json!({"HtmlBody": "ranked third", "BODY": "ranked second"}).to_string();
        assert_eq!(body_from_json(&payload).as_deref(), Some("ranked second"));
    }

    #[test]
    fn body_value_is_decoded() {
        let payload = r#"{"Body":"&lt;b&gt;bold&lt;/b&gt; & more"}"#;
        assert_eq!(body_from_json(payload).as_deref(), Some("<b>bold</b> & more"));
    }

    #[test]
    fn html_marker_scan_when_no_named_key() {
        let payload = json!({"To": "a@x.com", "Content": "<html><p>doc</p></html>"}).to_string();
        assert_eq!(body_from_json(&payload).as_deref(), Some("<html><p>doc</p></html>"));
    }

    #[test]
    fn no_candidate_yields_none() {
        let payload = json!({"To": "a@x.com", "Caption": "subject"}).to_string();
        assert_eq!(body_from_json(&payload), None);
    }

    #[test]
    fn malformed_json_yields_none() {
        assert_eq!(body_from_json(r#"{"Body": "truncated"#), None);
    }

    #[test]
    fn non_object_root_yields_none() {
        assert_eq!(body_from_json(r#"["Body", "x"]"#), None);
    }

    #[test]
    fn fields_fully_populated_with_defaults() {
        let payload = json!({"To": "a@x.com"}).to_string();
        let fields = fields_from_json(&payload);
        assert_eq!(fields.to, "a@x.com");
        assert_eq!(fields.to_cc, "");
        assert_eq!(fields.bcc, "");
        assert_eq!(fields.caption, "");
        assert_eq!(fields.type_mes, "");
        assert_eq!(fields.correlation_id, "");
    }

    #[test]
    fn field_lookup_is_case_insensitive() {
        let payload = json!({"to": "a@x.com", "TOCC": "b@x.com", "caption": "Hi", "TYPEMES": "alert"}).to_string();
        let fields = fields_from_json(&payload);
        assert_eq!(fields.to, "a@x.com");
        assert_eq!(fields.to_cc, "b@x.com");
        assert_eq!(fields.caption, "Hi");
        assert_eq!(fields.type_mes, "alert");
    }

    #[test]
    fn uuid_key_maps_to_correlation_id() {
        let payload = json!({"uuid": "3f2c-77ab"}).to_string();
        assert_eq!(fields_from_json(&payload).correlation_id, "3f2c-77ab");
    }

    #[test]
    fn numeric_field_values_are_stringified() {
        let payload = json!({"uuid": 12345}).to_string();
        assert_eq!(fields_from_json(&payload).correlation_id, "12345");
    }

    #[test]
    fn fields_default_on_unparseable_payload() {
        assert_eq!(fields_from_json("<Body>x</Body>"), ExtractedFields::default());
    }
}
