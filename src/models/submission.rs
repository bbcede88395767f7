// src/models/submission.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::attempt::{AnswerSnapshot, AttemptRecord};

/// One submitted choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_index: i64,
}

/// DTO for grading a test instance.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "topic is required"))]
    pub topic: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one answer is required"))]
    pub answers: Vec<SubmittedAnswer>,
}

/// DTO for grading and archiving in one call.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAndArchiveRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub submission: SubmitAnswersRequest,
    #[validate(range(min = 0))]
    pub time_taken_seconds: i64,
}

/// Score of one submission.
/// `total` is the number of submitted answers, resolved or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub total: usize,
    pub score: usize,
}

/// A scored submission together with the review snapshots of every
/// answer whose question could be resolved at grading time.
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub result: SubmissionResult,
    pub snapshots: Vec<AnswerSnapshot>,
}

/// Response of the grade-and-archive call.
#[derive(Debug, Serialize)]
pub struct ArchivedSubmissionResponse {
    #[serde(flatten)]
    pub result: SubmissionResult,
    pub attempt: AttemptRecord,
}
