use crate::domain::message::StoredMessage;
use crate::error::Result;
use crate::storage::records::MessageRecord;
use sqlx::PgConnection;
use time::Date;

#[derive(Clone, Debug, Default)]
pub struct MessageRepository {}

impl MessageRepository {
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }

    /// Looks up a single message.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn fetch_by_id(&self, conn: &mut PgConnection, id: i64) -> Result<Option<StoredMessage>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, topic, payload, created_at, status, completed_at, server, attempt_count, message_type
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Looks up a single message with a row lock, for the payload-rewrite
    /// path. Must run inside a transaction.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn fetch_by_id_for_update(
        &self,
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<StoredMessage>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, topic, payload, created_at, status, completed_at, server, attempt_count, message_type
            FROM messages
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(record.map(Into::into))
    }

    /// Fetches the given messages; ids that do not exist are simply omitted.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn), fields(count = ids.len()))]
    pub(crate) async fn fetch_by_ids(&self, conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<StoredMessage>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, topic, payload, created_at, status, completed_at, server, attempt_count, message_type
            FROM messages
            WHERE id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Substring search against the raw payload combined with an optional
    /// creation-date filter. One dynamic query replaces the historical
    /// one-query-per-criterion-combination variants.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn search(
        &self,
        conn: &mut PgConnection,
        recipient: Option<&str>,
        created_on: Option<Date>,
        limit: i64,
    ) -> Result<Vec<StoredMessage>> {
        let pattern = recipient.map(|r| format!("%{r}%"));
        let records = sqlx::query_as::<_, MessageRecord>(
            r"
            SELECT id, topic, payload, created_at, status, completed_at, server, attempt_count, message_type
            FROM messages
            WHERE ($1::text IS NULL OR payload LIKE $1)
              AND ($2::date IS NULL OR created_at::date = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            ",
        )
        .bind(pattern)
        .bind(created_on)
        .bind(limit)
        .fetch_all(conn)
        .await?;

        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Clears the delivery-tracking fields so the external pipeline picks
    /// the messages up again.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn), fields(count = ids.len()))]
    pub(crate) async fn reset_for_resend(
        &self,
        conn: &mut PgConnection,
        ids: &[i64],
        attempt_budget: i32,
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r"
            UPDATE messages
            SET status = NULL, completed_at = NULL, server = '', attempt_count = $2
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .bind(attempt_budget)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Replaces the stored payload of one message.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the update fails.
    #[tracing::instrument(level = "debug", skip(self, conn, payload))]
    pub(crate) async fn update_payload(&self, conn: &mut PgConnection, id: i64, payload: &str) -> Result<u64> {
        let result =
            sqlx::query("UPDATE messages SET payload = $2 WHERE id = $1").bind(id).bind(payload).execute(conn).await?;

        Ok(result.rows_affected())
    }

    /// Distinct creation dates, oldest first. Feeds search-form completion.
    ///
    /// # Errors
    /// Returns `sqlx::Error` if the query fails.
    #[tracing::instrument(level = "debug", skip(self, conn))]
    pub(crate) async fn distinct_created_dates(&self, conn: &mut PgConnection) -> Result<Vec<Date>> {
        let dates = sqlx::query_scalar::<_, Date>("SELECT DISTINCT created_at::date AS day FROM messages ORDER BY day")
            .fetch_all(conn)
            .await?;

        Ok(dates)
    }
}
