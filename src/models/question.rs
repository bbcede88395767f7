// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::html::contains_markup;

/// Every question carries exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// Difficulty label of a question. Defaults to `easy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// One answer choice. Stored and sent as `{"text": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
}

impl From<&str> for QuestionOption {
    fn from(text: &str) -> Self {
        QuestionOption {
            text: text.to_string(),
        }
    }
}

/// A question as held by the store, answer key included.
/// Owned by exactly one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub correct_index: i16,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
}

impl Question {
    /// Client-safe projection. `topic` is set by the cross-topic modes.
    pub fn to_view(&self, topic: Option<&str>) -> QuestionView {
        QuestionView {
            id: self.id,
            topic: topic.map(str::to_string),
            question: self.question.clone(),
            options: self.options.clone(),
            difficulty: self.difficulty,
            explanation: self.explanation.clone(),
        }
    }

    pub fn is_correct(&self, selected_index: i64) -> bool {
        i64::from(self.correct_index) == selected_index
    }
}

/// A question with its correct-answer index withheld.
/// This type has no answer-key field at all, so nothing built from it can leak one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub difficulty: Difficulty,
    pub explanation: Option<String>,
}

/// A validated question ready to be appended to a topic.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuestion {
    #[validate(custom(function = validate_text))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<QuestionOption>,
    #[validate(range(min = 0, max = 3, message = "correct_index must be between 0 and 3"))]
    pub correct_index: i16,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[validate(length(max = 2000), custom(function = validate_plain))]
    pub explanation: Option<String>,
}

impl NewQuestion {
    /// Trims every text field. Empty explanations collapse to `None`.
    pub fn normalized(self) -> Self {
        NewQuestion {
            question: self.question.trim().to_string(),
            options: self
                .options
                .into_iter()
                .map(|o| QuestionOption {
                    text: o.text.trim().to_string(),
                })
                .collect(),
            correct_index: self.correct_index,
            difficulty: self.difficulty,
            explanation: self
                .explanation
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }

    pub fn into_question(self, id: i64) -> Question {
        Question {
            id,
            question: self.question,
            options: self.options,
            correct_index: self.correct_index,
            difficulty: self.difficulty,
            explanation: self.explanation,
        }
    }
}

/// Partial update of an existing question. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionUpdate {
    pub question: Option<String>,
    pub options: Option<Vec<QuestionOption>>,
    pub correct_index: Option<i16>,
    pub difficulty: Option<Difficulty>,
    pub explanation: Option<String>,
}

impl QuestionUpdate {
    /// Merges the patch over `current`, returning the full candidate question.
    /// The caller validates the result before writing it.
    pub fn apply_to(self, current: &Question) -> NewQuestion {
        NewQuestion {
            question: self.question.unwrap_or_else(|| current.question.clone()),
            options: self.options.unwrap_or_else(|| current.options.clone()),
            correct_index: self.correct_index.unwrap_or(current.correct_index),
            difficulty: self.difficulty.unwrap_or(current.difficulty),
            explanation: self.explanation.or_else(|| current.explanation.clone()),
        }
    }
}

/// DTO for adding a question (upserts the topic).
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub topic: String,
    #[serde(flatten)]
    pub question: NewQuestion,
}

fn validate_plain(text: &str) -> Result<(), validator::ValidationError> {
    if contains_markup(text) {
        return Err(validator::ValidationError::new("markup_not_allowed"));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), validator::ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(validator::ValidationError::new("question_text_cannot_be_empty"));
    }
    if trimmed.len() > 1000 {
        return Err(validator::ValidationError::new("question_text_too_long"));
    }
    validate_plain(trimmed)
}

fn validate_options(options: &[QuestionOption]) -> Result<(), validator::ValidationError> {
    if options.len() != OPTION_COUNT {
        return Err(validator::ValidationError::new("exactly_four_options_required"));
    }
    for opt in options {
        if opt.text.trim().is_empty() {
            return Err(validator::ValidationError::new("option_text_cannot_be_empty"));
        }
        if opt.text.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
        validate_plain(&opt.text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(options: &[&str], correct_index: i16) -> NewQuestion {
        NewQuestion {
            question: "What comes next: 2, 4, 8, ?".to_string(),
            options: options.iter().map(|o| QuestionOption::from(*o)).collect(),
            correct_index,
            difficulty: Difficulty::default(),
            explanation: None,
        }
    }

    #[test]
    fn accepts_four_options_and_index_in_range() {
        assert!(sample(&["10", "12", "16", "18"], 2).validate().is_ok());
        assert!(sample(&["10", "12", "16", "18"], 0).validate().is_ok());
        assert!(sample(&["10", "12", "16", "18"], 3).validate().is_ok());
    }

    #[test]
    fn rejects_wrong_option_count() {
        assert!(sample(&["10", "12", "16"], 0).validate().is_err());
        assert!(sample(&["10", "12", "16", "18", "20"], 0).validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert!(sample(&["10", "12", "16", "18"], 4).validate().is_err());
        assert!(sample(&["10", "12", "16", "18"], -1).validate().is_err());
    }

    #[test]
    fn rejects_blank_text() {
        let mut q = sample(&["10", "12", "16", "18"], 1);
        q.question = "   ".to_string();
        assert!(q.validate().is_err());
        assert!(sample(&["10", " ", "16", "18"], 1).validate().is_err());
    }

    #[test]
    fn difficulty_defaults_to_easy_when_omitted() {
        let q: NewQuestion = serde_json::from_value(serde_json::json!({
            "question": "Odd one out?",
            "options": [{"text": "a"}, {"text": "b"}, {"text": "c"}, {"text": "1"}],
            "correct_index": 3
        }))
        .unwrap();
        assert_eq!(q.difficulty, Difficulty::Easy);
    }

    #[test]
    fn view_never_serializes_an_answer_key() {
        let q = sample(&["10", "12", "16", "18"], 2).into_question(7);
        let json = serde_json::to_value(q.to_view(Some("series"))).unwrap();
        assert!(json.get("correct_index").is_none());
        assert_eq!(json["topic"], "series");
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn update_merges_over_current_question() {
        let current = sample(&["10", "12", "16", "18"], 2).into_question(1);
        let patch = QuestionUpdate {
            correct_index: Some(1),
            explanation: Some("Doubles each step".to_string()),
            ..Default::default()
        };
        let merged = patch.apply_to(&current);
        assert_eq!(merged.correct_index, 1);
        assert_eq!(merged.options, current.options);
        assert_eq!(merged.explanation.as_deref(), Some("Doubles each step"));
    }

    #[test]
    fn normalization_trims_and_keeps_symbols() {
        let mut q = sample(&[" x < z ", "12", "16", "18"], 2);
        q.question = "  If x < y and y < z, which holds? (Tom & Jerry)  ".to_string();
        q.explanation = Some("   ".to_string());
        let q = q.normalized();
        assert_eq!(q.question, "If x < y and y < z, which holds? (Tom & Jerry)");
        assert_eq!(q.options[0].text, "x < z");
        assert!(q.explanation.is_none());
        assert!(q.validate().is_ok());
    }

    #[test]
    fn rejects_markup_in_any_text_field() {
        let mut q = sample(&["10", "12", "16", "18"], 2);
        q.question = "<script>alert(1)</script>Next?".to_string();
        assert!(q.validate().is_err());

        assert!(sample(&["<b>10</b>", "12", "16", "18"], 2).validate().is_err());

        let mut q = sample(&["10", "12", "16", "18"], 2);
        q.explanation = Some("<img src=x onerror=alert(1)>".to_string());
        assert!(q.validate().is_err());
    }
}
