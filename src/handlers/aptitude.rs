// src/handlers/aptitude.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        submission::{ArchivedSubmissionResponse, SubmitAndArchiveRequest, SubmitAnswersRequest},
        topic::TopicSummary,
    },
    services::{archiver, assembler, evaluator},
    state::DynStore,
    utils::{
        extract::{AppPath, AppQuery},
        json::AppJson,
        jwt::Claims,
    },
};

/// Query parameters shared by the sampling endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// Absent or zero falls back to `default`; anything above `max` is clamped.
fn effective_limit(requested: Option<usize>, default: Option<usize>, max: usize) -> Option<usize> {
    requested.filter(|&l| l > 0).or(default).map(|l| l.min(max))
}

/// Lists active topics with their question counts.
pub async fn list_active_topics(
    State(store): State<DynStore>,
) -> Result<impl IntoResponse, AppError> {
    let topics: Vec<TopicSummary> = store
        .find_active_topics()
        .await?
        .iter()
        .map(|t| t.summary())
        .collect();

    Ok(Json(topics))
}

/// Builds a test from a single topic, optionally sampled down to `limit`.
pub async fn topic_test(
    State(store): State<DynStore>,
    State(config): State<Config>,
    AppPath(topic): AppPath<String>,
    AppQuery(params): AppQuery<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = effective_limit(params.limit, None, config.max_test_limit);

    let found = store.find_topic_by_name(&topic).await?;
    let test = assembler::single_topic(found.as_ref(), limit, &mut rand::thread_rng())?;

    Ok(Json(test))
}

/// Samples `limit` questions uniformly across all active topics.
pub async fn random_questions(
    State(store): State<DynStore>,
    State(config): State<Config>,
    AppQuery(params): AppQuery<LimitParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = effective_limit(
        params.limit,
        Some(config.random_default_limit),
        config.max_test_limit,
    )
    .unwrap_or(config.random_default_limit);

    let topics = store.find_active_topics().await?;
    let test = assembler::random_sample(&topics, limit, &mut rand::thread_rng())?;

    Ok(Json(test))
}

/// One question from every active, non-empty topic.
pub async fn mixed_test(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let topics = store.find_active_topics().await?;
    let test = assembler::mixed(&topics, &mut rand::thread_rng());

    Ok(Json(test))
}

/// Scores a submission against the topic's current answer key.
pub async fn submit_answers(
    State(store): State<DynStore>,
    AppJson(payload): AppJson<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    evaluator::check_submission(&payload.topic, &payload.answers)?;
    payload.validate()?;

    let topic = store
        .find_topic_by_name(&payload.topic)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    Ok(Json(evaluator::evaluate(&topic, &payload.answers)))
}

/// Scores a submission and archives the attempt for the current user.
///
/// Snapshots are taken from the questions resolved during grading.
pub async fn submit_and_archive(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<SubmitAndArchiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let SubmitAndArchiveRequest {
        submission,
        time_taken_seconds,
    } = payload;
    evaluator::check_submission(&submission.topic, &submission.answers)?;

    let topic = store
        .find_topic_by_name(&submission.topic)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let graded = evaluator::grade(&topic, &submission.answers);
    let attempt = archiver::build_attempt(&topic.name, time_taken_seconds, graded.snapshots);
    let record = store.append_attempt(claims.user_id(), attempt).await?;

    tracing::info!(
        "Archived attempt {} for user {} on '{}' ({}/{})",
        record.id,
        record.user_id,
        record.topic,
        graded.result.score,
        graded.result.total
    );

    Ok((
        StatusCode::CREATED,
        Json(ArchivedSubmissionResponse {
            result: graded.result,
            attempt: record,
        }),
    ))
}
