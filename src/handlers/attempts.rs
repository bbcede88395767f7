// src/handlers/attempts.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{ArchiveAttemptRequest, AttemptSummary},
    services::archiver,
    state::DynStore,
    utils::{extract::AppPath, json::AppJson, jwt::Claims},
};

/// Archives an attempt graded by the caller.
/// The snapshots are stored as sent and never re-read from the question bank.
pub async fn archive_attempt(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<ArchiveAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }

    let attempt =
        archiver::build_attempt(&payload.topic, payload.time_taken_seconds, payload.answers);
    let record = store.append_attempt(claims.user_id(), attempt).await?;

    tracing::info!(
        "Archived attempt {} for user {} ({}%)",
        record.id,
        record.user_id,
        record.percentage
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// The current user's attempt history, newest first.
pub async fn list_my_attempts(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let history: Vec<AttemptSummary> = store
        .list_attempts(claims.user_id())
        .await?
        .iter()
        .map(AttemptSummary::from)
        .collect();

    Ok(Json(history))
}

/// One archived attempt with its full answer snapshots, for review.
pub async fn get_my_attempt(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = store
        .find_attempt(claims.user_id(), id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    Ok(Json(record))
}
