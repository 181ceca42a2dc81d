use crate::domain::content::ExtractedFields;
use crate::domain::message::{RecipientUpdate, StoredMessage};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub recipient: Option<String>,
    /// Creation date in `YYYY-MM-DD` form.
    pub created_on: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    pub message_ids: Vec<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendResponse {
    pub updated_count: u64,
    pub messages: Vec<MessageDto>,
}

#[derive(Deserialize)]
pub struct RecipientUpdateRequest {
    pub to: Option<String>,
    #[serde(rename = "toCC")]
    pub to_cc: Option<String>,
    pub bcc: Option<String>,
}

impl From<RecipientUpdateRequest> for RecipientUpdate {
    fn from(request: RecipientUpdateRequest) -> Self {
        Self { to: request.to, to_cc: request.to_cc, bcc: request.bcc }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: i64,
    pub topic: String,
    pub payload: String,
    pub created_at: String,
    pub status: Option<String>,
    pub completed_at: Option<String>,
    pub server: Option<String>,
    pub attempt_count: Option<i32>,
    pub message_type: Option<String>,
}

impl From<StoredMessage> for MessageDto {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            topic: message.topic,
            payload: message.payload,
            created_at: message.created_at.format(&Rfc3339).unwrap_or_default(),
            status: message.status,
            completed_at: message.completed_at.and_then(|t| t.format(&Rfc3339).ok()),
            server: message.server,
            attempt_count: message.attempt_count,
            message_type: message.message_type,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBodyResponse {
    pub message: MessageDto,
    pub body_content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetailResponse {
    pub message: MessageDto,
    pub body_content: String,
    pub is_json: bool,
    pub fields: ExtractedFields,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub messages: Vec<MessageDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesResponse {
    pub dates: Vec<String>,
}
