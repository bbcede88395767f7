// src/store/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptRecord, NewAttempt},
        question::{NewQuestion, Question, QuestionUpdate},
        topic::{Topic, normalize_topic_name},
    },
    store::{AptitudeStore, prepare_question, prepare_update},
};

/// Process-local store. Topic uniqueness holds because creation and append
/// happen under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    topics: RwLock<Vec<Topic>>,
    attempts: RwLock<HashMap<String, Vec<AttemptRecord>>>,
    next_topic_id: AtomicI64,
    next_question_id: AtomicI64,
    next_attempt_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl AptitudeStore for MemoryStore {
    async fn upsert_question(&self, topic: &str, question: NewQuestion) -> Result<Topic, AppError> {
        let (name, question) = prepare_question(topic, question)?;
        let mut topics = self.topics.write().await;
        let now = Utc::now();

        let index = match topics.iter().position(|t| t.name == name) {
            Some(index) => index,
            None => {
                topics.push(Topic {
                    id: Self::next_id(&self.next_topic_id),
                    name,
                    questions: Vec::new(),
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                });
                topics.len() - 1
            }
        };

        let topic = &mut topics[index];
        topic
            .questions
            .push(question.into_question(Self::next_id(&self.next_question_id)));
        topic.updated_at = now;
        Ok(topic.clone())
    }

    async fn update_question(
        &self,
        topic: &str,
        question_id: i64,
        update: QuestionUpdate,
    ) -> Result<Question, AppError> {
        let name = normalize_topic_name(topic);
        let mut topics = self.topics.write().await;
        let topic = topics
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or(AppError::NotFound("Topic not found".to_string()))?;
        let slot = topic
            .questions
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let merged = prepare_update(slot, update)?;
        *slot = merged.into_question(question_id);
        let updated = slot.clone();
        topic.updated_at = Utc::now();
        Ok(updated)
    }

    async fn set_topic_active(&self, topic: &str, is_active: bool) -> Result<Topic, AppError> {
        let name = normalize_topic_name(topic);
        let mut topics = self.topics.write().await;
        let topic = topics
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or(AppError::NotFound("Topic not found".to_string()))?;
        topic.is_active = is_active;
        topic.updated_at = Utc::now();
        Ok(topic.clone())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, AppError> {
        Ok(self.topics.read().await.clone())
    }

    async fn find_active_topics(&self) -> Result<Vec<Topic>, AppError> {
        Ok(self
            .topics
            .read()
            .await
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, AppError> {
        let name = normalize_topic_name(name);
        Ok(self
            .topics
            .read()
            .await
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn resolve_question(
        &self,
        topic: &str,
        question_id: i64,
    ) -> Result<Option<Question>, AppError> {
        let name = normalize_topic_name(topic);
        Ok(self
            .topics
            .read()
            .await
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| t.find_question(question_id))
            .cloned())
    }

    async fn append_attempt(
        &self,
        user_id: &str,
        attempt: NewAttempt,
    ) -> Result<AttemptRecord, AppError> {
        let record = attempt.into_record(Self::next_id(&self.next_attempt_id), user_id);
        self.attempts
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_attempts(&self, user_id: &str) -> Result<Vec<AttemptRecord>, AppError> {
        Ok(self
            .attempts
            .read()
            .await
            .get(user_id)
            .map(|history| history.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_attempt(
        &self,
        user_id: &str,
        attempt_id: i64,
    ) -> Result<Option<AttemptRecord>, AppError> {
        Ok(self
            .attempts
            .read()
            .await
            .get(user_id)
            .and_then(|history| history.iter().find(|a| a.id == attempt_id))
            .cloned())
    }
}
