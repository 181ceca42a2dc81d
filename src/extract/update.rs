//! Write-back path: rewrites the recipient keys of a structured payload.

use crate::domain::message::RecipientUpdate;
use crate::error::{AppError, Result};
use serde_json::Value;

/// Applies `update` to a structured payload and returns the replacement text.
///
/// Only the keys named by the update are touched; every other key, known or
/// unknown, is carried over verbatim. Key order stability is not guaranteed.
///
/// # Errors
/// Returns `AppError::MalformedPayload` when the payload does not parse as a
/// JSON object. The caller must leave the stored record unchanged in that
/// case.
pub fn apply_recipient_update(payload: &str, update: &RecipientUpdate) -> Result<String> {
    let mut root: Value = serde_json::from_str(payload)
        .map_err(|e| AppError::MalformedPayload(format!("payload is not valid JSON: {e}")))?;

    let Some(obj) = root.as_object_mut() else {
        return Err(AppError::MalformedPayload("payload root is not a JSON object".to_string()));
    };

    if let Some(to) = &update.to {
        obj.insert("To".to_string(), Value::String(to.clone()));
    }
    if let Some(to_cc) = &update.to_cc {
        obj.insert("ToCC".to_string(), Value::String(to_cc.clone()));
    }
    if let Some(bcc) = &update.bcc {
        obj.insert("BCC".to_string(), Value::String(bcc.clone()));
    }

    serde_json::to_string(&root).map_err(|_| AppError::Internal)
}
