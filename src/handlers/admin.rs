// src/handlers/admin.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        question::{CreateQuestionRequest, QuestionUpdate},
        topic::{SetTopicActiveRequest, TopicSummary},
    },
    state::DynStore,
    utils::{extract::AppPath, json::AppJson},
};

/// Adds a question, creating its topic on first use.
/// Admin only.
pub async fn create_question(
    State(store): State<DynStore>,
    AppJson(payload): AppJson<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = store
        .upsert_question(&payload.topic, payload.question)
        .await?;

    tracing::info!(
        "Question added to topic '{}' ({} total)",
        topic.name,
        topic.questions.len()
    );

    Ok((StatusCode::CREATED, Json(topic)))
}

/// Lists every topic, including inactive ones.
/// Admin only.
pub async fn list_topics(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let topics: Vec<TopicSummary> = store
        .list_topics()
        .await?
        .iter()
        .map(|t| t.summary())
        .collect();

    Ok(Json(topics))
}

/// Returns a question with its answer key.
/// Admin only.
pub async fn get_question(
    State(store): State<DynStore>,
    AppPath((topic, id)): AppPath<(String, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let question = store
        .resolve_question(&topic, id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Updates a question in place. Archived attempts keep their snapshots.
/// Admin only.
pub async fn update_question(
    State(store): State<DynStore>,
    AppPath((topic, id)): AppPath<(String, i64)>,
    AppJson(payload): AppJson<QuestionUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let question = store.update_question(&topic, id, payload).await?;

    tracing::info!("Question {} in topic '{}' updated", id, topic);

    Ok(Json(question))
}

/// Activates or deactivates a topic. Deactivation is the only removal path.
/// Admin only.
pub async fn set_topic_active(
    State(store): State<DynStore>,
    AppPath(topic): AppPath<String>,
    AppJson(payload): AppJson<SetTopicActiveRequest>,
) -> Result<impl IntoResponse, AppError> {
    let topic = store.set_topic_active(&topic, payload.is_active).await?;

    tracing::info!(
        "Topic '{}' is now {}",
        topic.name,
        if topic.is_active { "active" } else { "inactive" }
    );

    Ok(Json(topic.summary()))
}
