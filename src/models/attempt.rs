// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{Difficulty, QuestionOption};

/// Self-contained copy of one answered question, taken at grading time.
/// Stays interpretable after the source question is edited or its topic
/// is deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSnapshot {
    pub question_id: i64,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub explanation: Option<String>,
    #[serde(default = "snapshot_difficulty")]
    pub difficulty: Difficulty,
    pub selected_index: i64,
    pub correct_index: i16,
    pub is_correct: bool,
}

/// Snapshots sent without a difficulty are recorded as `medium`.
fn snapshot_difficulty() -> Difficulty {
    Difficulty::Medium
}

/// An archived attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub user_id: String,
    pub topic: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub percentage: i64,
    pub time_taken_seconds: i64,
    pub answers: Vec<AnswerSnapshot>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Attempt with its aggregates computed, before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub topic: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub percentage: i64,
    pub time_taken_seconds: i64,
    pub answers: Vec<AnswerSnapshot>,
}

impl NewAttempt {
    pub fn into_record(self, id: i64, user_id: &str) -> AttemptRecord {
        AttemptRecord {
            id,
            user_id: user_id.to_string(),
            topic: self.topic,
            total_questions: self.total_questions,
            correct_answers: self.correct_answers,
            percentage: self.percentage,
            time_taken_seconds: self.time_taken_seconds,
            answers: self.answers,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Listing row for a user's history; answers are fetched per attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptSummary {
    pub id: i64,
    pub topic: String,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub percentage: i64,
    pub time_taken_seconds: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&AttemptRecord> for AttemptSummary {
    fn from(record: &AttemptRecord) -> Self {
        AttemptSummary {
            id: record.id,
            topic: record.topic.clone(),
            total_questions: record.total_questions,
            correct_answers: record.correct_answers,
            percentage: record.percentage,
            time_taken_seconds: record.time_taken_seconds,
            created_at: record.created_at,
        }
    }
}

/// DTO for archiving an attempt graded by the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArchiveAttemptRequest {
    #[validate(length(min = 1, max = 100, message = "topic is required"))]
    pub topic: String,
    #[validate(range(min = 0))]
    pub time_taken_seconds: i64,
    #[serde(default)]
    pub answers: Vec<AnswerSnapshot>,
}
