use crate::api::AppState;
use crate::api::dto::messages::{
    DatesResponse, MessageBodyResponse, MessageDetailResponse, RecipientUpdateRequest, ResendRequest, ResendResponse,
    SearchRequest, SearchResponse,
};
use crate::error::{AppError, Result};
use crate::services::message_service::SearchQuery;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Returns one message with its recovered body.
///
/// # Errors
/// Returns `AppError::NotFound` if the id does not exist.
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageBodyResponse>> {
    let (message, content) = state.message_service.inspect(id).await?;

    Ok(Json(MessageBodyResponse { message: message.into(), body_content: content.body_html }))
}

/// Returns one message with its recovered body, metadata fields, and format
/// classification.
///
/// # Errors
/// Returns `AppError::NotFound` if the id does not exist.
pub async fn get_message_full(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageDetailResponse>> {
    let (message, content) = state.message_service.inspect(id).await?;

    Ok(Json(MessageDetailResponse {
        message: message.into(),
        body_content: content.body_html,
        is_json: content.is_structured,
        fields: content.fields,
    }))
}

/// Searches stored messages by recipient substring and/or creation date.
///
/// # Errors
/// Returns `AppError::BadRequest` if the date filter is not `YYYY-MM-DD`.
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let created_on = request
        .created_on
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Date::parse(s, DATE_FORMAT))
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Invalid createdOn date: {e}")))?;

    let query = SearchQuery { recipient: request.recipient, created_on };
    let messages = state.message_service.search(&query).await?;

    Ok(Json(SearchResponse { messages: messages.into_iter().map(Into::into).collect() }))
}

/// Resets delivery tracking for the given messages and returns their fresh
/// state.
///
/// # Errors
/// Returns `AppError::Database` if the update fails.
pub async fn resend(
    State(state): State<AppState>,
    Json(request): Json<ResendRequest>,
) -> Result<Json<ResendResponse>> {
    let updated_count = state.message_service.resend(&request.message_ids).await?;
    let messages = state.message_service.get_messages(&request.message_ids).await?;

    Ok(Json(ResendResponse { updated_count, messages: messages.into_iter().map(Into::into).collect() }))
}

/// Rewrites the recipient fields of a structured payload.
///
/// # Errors
/// Returns `AppError::NotFound` if the id does not exist.
/// Returns `AppError::MalformedPayload` if the payload is not a JSON object.
pub async fn update_recipients(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecipientUpdateRequest>,
) -> Result<impl IntoResponse> {
    state.message_service.update_recipients(id, &request.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the distinct creation dates present in the store.
///
/// # Errors
/// Returns `AppError::Database` if the query fails.
pub async fn list_dates(State(state): State<AppState>) -> Result<Json<DatesResponse>> {
    let dates = state.message_service.unique_dates().await?;
    let dates = dates.iter().filter_map(|date| date.format(DATE_FORMAT).ok()).collect();

    Ok(Json(DatesResponse { dates }))
}
