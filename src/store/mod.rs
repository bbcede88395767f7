// src/store/mod.rs

//! Persistence seam of the engine.
//!
//! The question bank and the attempt history live behind [`AptitudeStore`].
//! Implementations must guarantee at most one topic per normalized name and
//! append-only attempt histories. Failures are surfaced, never retried.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptRecord, NewAttempt},
        question::{NewQuestion, Question, QuestionUpdate},
        topic::Topic,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AptitudeStore: Send + Sync {
    /// Ensures the topic exists (active on creation), then appends the question.
    /// Rejects invalid questions with `AppError::Validation`.
    async fn upsert_question(&self, topic: &str, question: NewQuestion) -> Result<Topic, AppError>;

    /// Replaces fields of an existing question in place. The merged question
    /// is validated like a new one.
    async fn update_question(
        &self,
        topic: &str,
        question_id: i64,
        update: QuestionUpdate,
    ) -> Result<Question, AppError>;

    async fn set_topic_active(&self, topic: &str, is_active: bool) -> Result<Topic, AppError>;

    /// Every topic in store order, active or not.
    async fn list_topics(&self) -> Result<Vec<Topic>, AppError>;

    /// Active topics in store order.
    async fn find_active_topics(&self) -> Result<Vec<Topic>, AppError>;

    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, AppError>;

    /// Absence is `Ok(None)`, never an error.
    async fn resolve_question(
        &self,
        topic: &str,
        question_id: i64,
    ) -> Result<Option<Question>, AppError>;

    async fn append_attempt(
        &self,
        user_id: &str,
        attempt: NewAttempt,
    ) -> Result<AttemptRecord, AppError>;

    /// Newest first.
    async fn list_attempts(&self, user_id: &str) -> Result<Vec<AttemptRecord>, AppError>;

    async fn find_attempt(
        &self,
        user_id: &str,
        attempt_id: i64,
    ) -> Result<Option<AttemptRecord>, AppError>;
}

/// Normalizes and validates the inputs shared by every `upsert_question`.
pub(crate) fn prepare_question(
    topic: &str,
    question: NewQuestion,
) -> Result<(String, NewQuestion), AppError> {
    use validator::Validate;

    let name = crate::models::topic::normalize_topic_name(topic);
    if name.is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }
    if name.len() > 100 {
        return Err(AppError::Validation("topic name is too long".to_string()));
    }

    let question = question.normalized();
    question.validate()?;
    Ok((name, question))
}

/// Merges and validates a question update.
pub(crate) fn prepare_update(
    current: &Question,
    update: QuestionUpdate,
) -> Result<NewQuestion, AppError> {
    use validator::Validate;

    let merged = update.apply_to(current).normalized();
    merged.validate()?;
    Ok(merged)
}
