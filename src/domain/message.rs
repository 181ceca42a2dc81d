use time::OffsetDateTime;

/// One row of the outbound message store.
///
/// The payload is raw text as the producer queued it, JSON or XML, possibly
/// truncated. The delivery-tracking fields (`status`, `completed_at`,
/// `server`, `attempt_count`) are owned by the external delivery pipeline;
/// the only write this service performs on them is the resend reset.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: i64,
    pub topic: String,
    pub payload: String,
    pub created_at: OffsetDateTime,
    pub status: Option<String>,
    pub completed_at: Option<OffsetDateTime>,
    pub server: Option<String>,
    pub attempt_count: Option<i32>,
    pub message_type: Option<String>,
}

/// Replacement values for the recipient keys of a structured payload.
///
/// `None` leaves the corresponding key untouched.
#[derive(Debug, Clone, Default)]
pub struct RecipientUpdate {
    pub to: Option<String>,
    pub to_cc: Option<String>,
    pub bcc: Option<String>,
}

impl RecipientUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.to.is_none() && self.to_cc.is_none() && self.bcc.is_none()
    }
}
