use serde::Serialize;

/// Best-effort content recovered from a raw payload. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    /// Recovered human-readable body, or a diagnostic placeholder when every
    /// recovery tier came up empty.
    pub body_html: String,
    pub fields: ExtractedFields,
    /// True when the payload was classified as JSON by the format sniffer.
    pub is_structured: bool,
}

/// Metadata fields of a structured payload.
///
/// Always fully populated: a field missing from the payload maps to the empty
/// string, never to an absent marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub to: String,
    #[serde(rename = "toCC")]
    pub to_cc: String,
    pub bcc: String,
    pub caption: String,
    pub type_mes: String,
    pub correlation_id: String,
}
