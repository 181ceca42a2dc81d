use crate::config::ResendConfig;
use crate::domain::content::ExtractedContent;
use crate::domain::message::{RecipientUpdate, StoredMessage};
use crate::error::{AppError, Result};
use crate::extract;
use crate::storage::DbPool;
use crate::storage::message_repo::MessageRepository;
use opentelemetry::{KeyValue, global, metrics::Counter};
use time::Date;

#[derive(Clone, Debug)]
struct Metrics {
    extractions_total: Counter<u64>,
    resent_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("outbox-console");
        Self {
            extractions_total: meter
                .u64_counter("outbox_extractions_total")
                .with_description("Body extractions by outcome")
                .build(),
            resent_total: meter
                .u64_counter("outbox_messages_resent_total")
                .with_description("Messages reset for redelivery")
                .build(),
        }
    }
}

/// Search criteria; at least one must be given for the search to run.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub recipient: Option<String>,
    pub created_on: Option<Date>,
}

#[derive(Clone, Debug)]
pub struct MessageService {
    pool: DbPool,
    repo: MessageRepository,
    config: ResendConfig,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(pool: DbPool, repo: MessageRepository, config: ResendConfig) -> Self {
        Self { pool, repo, config, metrics: Metrics::new() }
    }

    /// Fetches one message.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id does not exist.
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn get_message(&self, id: i64) -> Result<StoredMessage> {
        let mut conn = self.pool.acquire().await?;
        self.repo.fetch_by_id(&mut conn, id).await?.ok_or(AppError::NotFound)
    }

    /// Fetches a batch of messages; missing ids are omitted.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(count = ids.len()))]
    pub async fn get_messages(&self, ids: &[i64]) -> Result<Vec<StoredMessage>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.fetch_by_ids(&mut conn, ids).await
    }

    /// Fetches one message together with its recovered content.
    ///
    /// Extraction itself never fails; a payload that defeats every recovery
    /// tier yields the diagnostic placeholder.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id does not exist.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn inspect(&self, id: i64) -> Result<(StoredMessage, ExtractedContent)> {
        let message = self.get_message(id).await?;
        let content = extract::extract_body(&message.payload);

        let outcome =
            if content.body_html.starts_with(extract::BODY_NOT_FOUND_MARKER) { "placeholder" } else { "recovered" };
        self.metrics.extractions_total.add(1, &[KeyValue::new("outcome", outcome)]);

        Ok((message, content))
    }

    /// Searches stored messages by recipient substring and/or creation date.
    ///
    /// Returns an empty list without touching the store when no criterion is
    /// given.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, query),
        fields(has_recipient = query.recipient.is_some(), created_on = ?query.created_on)
    )]
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<StoredMessage>> {
        let recipient = query.recipient.as_deref().map(str::trim).filter(|r| !r.is_empty());
        if recipient.is_none() && query.created_on.is_none() {
            tracing::warn!("Search rejected: no criterion given");
            return Ok(Vec::new());
        }

        let mut conn = self.pool.acquire().await?;
        self.repo.search(&mut conn, recipient, query.created_on, self.config.search_limit).await
    }

    /// Resets delivery tracking so the external pipeline retries the given
    /// messages. An empty id set performs no store round-trip and returns 0.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the update fails.
    #[tracing::instrument(err(level = "warn"), skip(self), fields(count = ids.len()))]
    pub async fn resend(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.pool.acquire().await?;
        let updated = self.repo.reset_for_resend(&mut conn, ids, self.config.attempt_budget).await?;

        tracing::info!(requested = ids.len(), updated, "Messages reset for redelivery");
        self.metrics.resent_total.add(updated, &[]);

        Ok(updated)
    }

    /// Rewrites the recipient keys of a structured payload and persists the
    /// replacement. Runs in a transaction with a row lock so concurrent
    /// updates to the same record serialize; a rejected update leaves the
    /// record untouched.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the id does not exist.
    /// Returns `AppError::MalformedPayload` if the payload is not a JSON object.
    #[tracing::instrument(err(level = "warn"), skip(self, update))]
    pub async fn update_recipients(&self, id: i64, update: &RecipientUpdate) -> Result<StoredMessage> {
        let mut tx = self.pool.begin().await?;

        let message = self.repo.fetch_by_id_for_update(&mut tx, id).await?.ok_or(AppError::NotFound)?;
        let payload = extract::apply_recipient_update(&message.payload, update)?;
        self.repo.update_payload(&mut tx, id, &payload).await?;

        tx.commit().await?;
        tracing::info!("Recipient fields updated");

        Ok(StoredMessage { payload, ..message })
    }

    /// Distinct creation dates across the store, oldest first.
    ///
    /// # Errors
    /// Returns `AppError::Database` if the query fails.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn unique_dates(&self) -> Result<Vec<Date>> {
        let mut conn = self.pool.acquire().await?;
        self.repo.distinct_created_dates(&mut conn).await
    }
}
