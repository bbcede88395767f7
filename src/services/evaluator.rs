// src/services/evaluator.rs

use crate::{
    error::AppError,
    models::{
        attempt::AnswerSnapshot,
        submission::{GradedSubmission, SubmissionResult, SubmittedAnswer},
        topic::Topic,
    },
};

/// Rejects submissions without a topic or without answers.
pub fn check_submission(topic: &str, answers: &[SubmittedAnswer]) -> Result<(), AppError> {
    if topic.trim().is_empty() {
        return Err(AppError::Validation("topic is required".to_string()));
    }
    if answers.is_empty() {
        return Err(AppError::Validation("No answers submitted".to_string()));
    }
    Ok(())
}

/// Grades `answers` against the current answer key of `topic`.
///
/// The topic need not be active. Answers whose question no longer exists
/// add nothing to `score` and produce no snapshot, but `total` is always
/// the number of submitted answers.
pub fn grade(topic: &Topic, answers: &[SubmittedAnswer]) -> GradedSubmission {
    let mut score = 0;
    let mut snapshots = Vec::with_capacity(answers.len());

    for answer in answers {
        let Some(question) = topic.find_question(answer.question_id) else {
            tracing::debug!(
                "Skipping unresolved question {} in topic '{}'",
                answer.question_id,
                topic.name
            );
            continue;
        };

        let is_correct = question.is_correct(answer.selected_index);
        if is_correct {
            score += 1;
        }

        snapshots.push(AnswerSnapshot {
            question_id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            explanation: question.explanation.clone(),
            difficulty: question.difficulty,
            selected_index: answer.selected_index,
            correct_index: question.correct_index,
            is_correct,
        });
    }

    GradedSubmission {
        result: SubmissionResult {
            total: answers.len(),
            score,
        },
        snapshots,
    }
}

/// Score only.
pub fn evaluate(topic: &Topic, answers: &[SubmittedAnswer]) -> SubmissionResult {
    grade(topic, answers).result
}
