use crate::domain::message::StoredMessage;
use time::OffsetDateTime;

/// Row shape of the `messages` table.
#[derive(Debug, sqlx::FromRow)]
pub struct MessageRecord {
    pub(crate) id: i64,
    pub(crate) topic: String,
    pub(crate) payload: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) status: Option<String>,
    pub(crate) completed_at: Option<OffsetDateTime>,
    pub(crate) server: Option<String>,
    pub(crate) attempt_count: Option<i32>,
    pub(crate) message_type: Option<String>,
}

impl From<MessageRecord> for StoredMessage {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            topic: record.topic,
            payload: record.payload,
            created_at: record.created_at,
            status: record.status,
            completed_at: record.completed_at,
            server: record.server,
            attempt_count: record.attempt_count,
            message_type: record.message_type,
        }
    }
}
