// src/services/archiver.rs

use crate::models::attempt::{AnswerSnapshot, NewAttempt};

/// Rounded percentage, half rounding up. Zero when there is nothing to score.
pub fn percentage(correct: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (200 * correct + total) / (2 * total)
}

/// Computes the aggregates of an attempt from its graded snapshots.
/// The snapshots are stored as given; nothing is re-read from the bank.
pub fn build_attempt(
    topic: &str,
    time_taken_seconds: i64,
    answers: Vec<AnswerSnapshot>,
) -> NewAttempt {
    let total_questions = answers.len() as i64;
    let correct_answers = answers.iter().filter(|a| a.is_correct).count() as i64;

    NewAttempt {
        topic: topic.trim().to_string(),
        total_questions,
        correct_answers,
        percentage: percentage(correct_answers, total_questions),
        time_taken_seconds,
        answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Difficulty, QuestionOption};

    fn snapshot(question_id: i64, is_correct: bool) -> AnswerSnapshot {
        AnswerSnapshot {
            question_id,
            question: format!("Q{}", question_id),
            options: ["a", "b", "c", "d"].iter().map(|o| QuestionOption::from(*o)).collect(),
            explanation: None,
            difficulty: Difficulty::Easy,
            selected_index: if is_correct { 1 } else { 0 },
            correct_index: 1,
            is_correct,
        }
    }

    #[test]
    fn empty_attempt_scores_zero_percent() {
        let attempt = build_attempt("logic", 30, Vec::new());
        assert_eq!(attempt.total_questions, 0);
        assert_eq!(attempt.correct_answers, 0);
        assert_eq!(attempt.percentage, 0);
    }

    #[test]
    fn aggregates_follow_snapshots() {
        let attempt = build_attempt("logic", 95, vec![snapshot(1, true), snapshot(2, false)]);
        assert_eq!(attempt.total_questions, 2);
        assert_eq!(attempt.correct_answers, 1);
        assert_eq!(attempt.percentage, 50);
        assert_eq!(attempt.time_taken_seconds, 95);
        assert_eq!(attempt.answers[0].question, "Q1");
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }
}
