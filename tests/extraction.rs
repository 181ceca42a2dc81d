use outbox_console::domain::content::ExtractedFields;
use outbox_console::domain::message::RecipientUpdate;
use outbox_console::error::AppError;
use outbox_console::extract::decode::{decode_fragment, escape_html};
use outbox_console::extract::{BODY_NOT_FOUND_MARKER, apply_recipient_update, extract_body, extract_fields};
use serde_json::{Value, json};

#[test]
fn well_formed_json_body_is_decoded_regardless_of_extra_keys() {
    let payload = json!({
        "Caption": "weekly report",
        "Body": "Totals: 5 &amp; 7\\nDone",
        "attempt": 3,
        "nested": {"ignored": true}
    })
    .to_string();

    let content = extract_body(&payload);
    assert_eq!(content.body_html, "Totals: 5 & 7\nDone");
    assert!(content.is_structured);
}

#[test]
fn case_variant_keys_resolve_in_priority_order() {
    let payload = json!({
        "HTML": "rank six",
        "htmlBody": "rank five",
        "HtmlBody": "rank four",
        "BODY": "rank three",
        "body": "rank two",
        "Body": "rank one"
    })
    .to_string();
    assert_eq!(extract_body(&payload).body_html, "rank one");

    let payload = json!({"HTML": "rank six", "htmlBody": "rank five", "BODY": "rank three"}).to_string();
    assert_eq!(extract_body(&payload).body_html, "rank three");
}

#[test]
fn xml_body_tag_with_entity() {
    let content = extract_body("<Body>Hello &amp; welcome</Body>");
    assert_eq!(content.body_html, "Hello & welcome");
    assert!(!content.is_structured);
}

#[test]
fn json_fragment_recovered_via_pattern_fallback() {
    // Not a full object, so structured parsing never applies.
    let content = extract_body(r#""Body":"line1\nline2""#);
    assert_eq!(content.body_html, "line1\nline2");
}

#[test]
fn free_text_yields_marked_escaped_truncated_diagnostic() {
    let long_tail = "z".repeat(1_500);
    let payload = format!("not json, not xml, <just> text {long_tail}");

    let content = extract_body(&payload);
    assert!(content.body_html.starts_with(BODY_NOT_FOUND_MARKER));
    assert!(content.body_html.contains("&lt;just&gt;"));
    assert!(!content.body_html.contains("<just>"));

    // At most 1000 payload chars survive into the preview.
    let shown_tail = content.body_html.chars().filter(|&c| c == 'z').count();
    assert!(shown_tail < 1_000);
}

#[test]
fn recipient_update_preserves_unrelated_keys() {
    let payload = r#"{"To":"a@x.com","Other":"keep"}"#;
    let update = RecipientUpdate { to: Some("b@x.com".to_string()), ..RecipientUpdate::default() };

    let rewritten = apply_recipient_update(payload, &update).expect("object payload");
    let value: Value = serde_json::from_str(&rewritten).expect("valid JSON out");
    assert_eq!(value, json!({"To": "b@x.com", "Other": "keep"}));
}

#[test]
fn recipient_update_rejects_array_payload() {
    let err = apply_recipient_update(r#"[{"To":"a@x.com"}]"#, &RecipientUpdate::default())
        .expect_err("array root must be rejected");
    assert!(matches!(err, AppError::MalformedPayload(_)));
}

#[test]
fn decode_is_idempotent_on_clean_text() {
    let inputs = ["plain text", "a & b < c", "back\\slash kept", "line\nbreaks stay"];
    for input in inputs {
        let once = decode_fragment(input);
        assert_eq!(decode_fragment(&once), once, "double decode changed {input:?}");
    }
}

#[test]
fn escape_html_round_trips_through_decode() {
    let raw = r#"<a href="x">5 & 6 aren't 7</a>"#;
    assert_eq!(decode_fragment(&escape_html(raw)), raw);
}

#[test]
fn fields_always_fully_populated() {
    let fields = extract_fields(r#"{"To":"a@x.com","typeMes":"notify","uuid":"c-1"}"#);
    assert_eq!(
        fields,
        ExtractedFields {
            to: "a@x.com".to_string(),
            type_mes: "notify".to_string(),
            correlation_id: "c-1".to_string(),
            ..ExtractedFields::default()
        }
    );

    // Unstructured payloads still yield the full (empty) field set.
    assert_eq!(extract_fields("<Body>x</Body>"), ExtractedFields::default());
}
