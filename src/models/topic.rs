// src/models/topic.rs

use serde::{Deserialize, Serialize};

use crate::models::question::Question;

/// A named partition of the question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,

    /// Unique, trimmed and lowercased.
    pub name: String,

    /// Ordered by creation.
    pub questions: Vec<Question>,

    /// Inactive topics are excluded from every assembly mode.
    pub is_active: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Topic {
    pub fn find_question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            name: self.name.clone(),
            question_count: self.questions.len(),
            is_active: self.is_active,
        }
    }
}

/// Canonical form of a topic name: trimmed and lowercased.
pub fn normalize_topic_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Listing row for topics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub name: String,
    pub question_count: usize,
    pub is_active: bool,
}

/// DTO for toggling a topic's visibility.
#[derive(Debug, Deserialize)]
pub struct SetTopicActiveRequest {
    pub is_active: bool,
}
