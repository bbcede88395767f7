// src/services/assembler.rs

//! Builds test instances from a snapshot of the question bank.
//!
//! Every function here is pure over the topics it is handed; the caller
//! supplies the RNG so sampling can be seeded in tests. All output is made
//! of [`QuestionView`]s, which cannot carry an answer key.

use rand::{Rng, seq::SliceRandom, seq::index};
use serde::Serialize;

use crate::{
    config::MIXED_QUESTIONS_PER_TOPIC,
    error::AppError,
    models::{
        question::{Question, QuestionView},
        topic::Topic,
    },
};

/// A caller-facing test: views plus the topic label when there is one.
#[derive(Debug, Clone, Serialize)]
pub struct TestInstance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MixedTestMeta {
    pub questions_per_topic: usize,
    /// Number of active topics, including those with no questions.
    pub topics_count: usize,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MixedTest {
    pub questions: Vec<QuestionView>,
    pub meta: MixedTestMeta,
}

/// Uniformly samples `amount` distinct items without replacement.
/// Returns everything, in original order, when `amount` covers the input.
fn sample_uniform<'a, T, R: Rng + ?Sized>(items: &'a [T], amount: usize, rng: &mut R) -> Vec<&'a T> {
    if amount >= items.len() {
        return items.iter().collect();
    }
    index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|i| &items[i])
        .collect()
}

/// Single-topic mode: the whole topic, or a uniform subset of `limit`.
/// Absent and inactive topics are both `NotFound`.
pub fn single_topic<R: Rng + ?Sized>(
    topic: Option<&Topic>,
    limit: Option<usize>,
    rng: &mut R,
) -> Result<TestInstance, AppError> {
    let topic = topic
        .filter(|t| t.is_active)
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let picked: Vec<&Question> = match limit {
        Some(limit) => sample_uniform(&topic.questions, limit, rng),
        None => topic.questions.iter().collect(),
    };

    Ok(TestInstance {
        topic: Some(topic.name.clone()),
        questions: picked.into_iter().map(|q| q.to_view(None)).collect(),
    })
}

/// Cross-topic mode: one pool over every active topic, sampled uniformly.
/// A pool smaller than `limit` is returned whole.
pub fn random_sample<R: Rng + ?Sized>(
    topics: &[Topic],
    limit: usize,
    rng: &mut R,
) -> Result<TestInstance, AppError> {
    let pool: Vec<(&str, &Question)> = topics
        .iter()
        .filter(|t| t.is_active)
        .flat_map(|t| t.questions.iter().map(move |q| (t.name.as_str(), q)))
        .collect();

    if pool.is_empty() {
        return Err(AppError::EmptyPool(
            "No questions available in any active topic".to_string(),
        ));
    }

    let mut picked = sample_uniform(&pool, limit, rng);
    // Full-pool returns keep store order; shuffle so topics are interleaved.
    picked.shuffle(rng);

    Ok(TestInstance {
        topic: None,
        questions: picked
            .into_iter()
            .map(|&(topic, q)| q.to_view(Some(topic)))
            .collect(),
    })
}

/// Mixed mode: exactly one uniformly chosen question from every active,
/// non-empty topic, in store order. Empty topics are skipped.
pub fn mixed<R: Rng + ?Sized>(topics: &[Topic], rng: &mut R) -> MixedTest {
    let active: Vec<&Topic> = topics.iter().filter(|t| t.is_active).collect();

    let questions: Vec<QuestionView> = active
        .iter()
        .flat_map(|t| {
            sample_uniform(&t.questions, MIXED_QUESTIONS_PER_TOPIC, rng)
                .into_iter()
                .map(|q| q.to_view(Some(t.name.as_str())))
                .collect::<Vec<_>>()
        })
        .collect();

    MixedTest {
        meta: MixedTestMeta {
            questions_per_topic: MIXED_QUESTIONS_PER_TOPIC,
            topics_count: active.len(),
            total_questions: questions.len(),
        },
        questions,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::models::question::{Difficulty, QuestionOption};

    fn topic(id: i64, name: &str, question_ids: std::ops::Range<i64>, is_active: bool) -> Topic {
        let now = chrono::Utc::now();
        Topic {
            id,
            name: name.to_string(),
            questions: question_ids
                .map(|qid| Question {
                    id: qid,
                    question: format!("{} question {}", name, qid),
                    options: ["a", "b", "c", "d"].iter().map(|o| QuestionOption::from(*o)).collect(),
                    correct_index: (qid % 4) as i16,
                    difficulty: Difficulty::Easy,
                    explanation: None,
                })
                .collect(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn bank() -> Vec<Topic> {
        vec![
            topic(1, "logic", 1..6, true),
            topic(2, "verbal", 6..9, true),
            topic(3, "numerical", 9..13, true),
            topic(4, "archived", 13..20, false),
            topic(5, "empty", 0..0, true),
        ]
    }

    #[test]
    fn single_topic_returns_everything_without_limit() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(1);
        let test = single_topic(bank.first(), None, &mut rng).unwrap();
        assert_eq!(test.topic.as_deref(), Some("logic"));
        let ids: Vec<i64> = test.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn single_topic_limit_samples_distinct_questions() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(2);
        let test = single_topic(bank.first(), Some(3), &mut rng).unwrap();
        let ids: HashSet<i64> = test.questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.iter().all(|id| (1..6).contains(id)));
    }

    #[test]
    fn single_topic_rejects_missing_or_inactive() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            single_topic(None, None, &mut rng),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            single_topic(bank.get(3), None, &mut rng),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn random_sample_draws_distinct_ids_from_active_topics() {
        let bank = bank();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let test = random_sample(&bank, 5, &mut rng).unwrap();
            assert!(test.topic.is_none());
            let ids: HashSet<i64> = test.questions.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), 5);
            assert!(ids.iter().all(|id| (1..13).contains(id)));
            assert!(test.questions.iter().all(|q| q.topic.is_some()));
        }
    }

    #[test]
    fn random_sample_degrades_to_whole_pool() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(4);
        let test = random_sample(&bank, 100, &mut rng).unwrap();
        assert_eq!(test.questions.len(), 12);
    }

    #[test]
    fn random_sample_on_empty_pool_is_an_error() {
        let bank = vec![topic(1, "empty", 0..0, true), topic(2, "off", 1..4, false)];
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            random_sample(&bank, 10, &mut rng),
            Err(AppError::EmptyPool(_))
        ));
    }

    #[test]
    fn random_sample_is_roughly_uniform_across_the_pool() {
        // 12 eligible questions, 1 drawn per trial: each should land near 1/12.
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(6);
        let trials = 12_000;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for _ in 0..trials {
            let test = random_sample(&bank, 1, &mut rng).unwrap();
            *counts.entry(test.questions[0].id).or_default() += 1;
        }
        assert_eq!(counts.len(), 12);
        for (id, count) in counts {
            assert!((800..1200).contains(&count), "question {} drawn {} times", id, count);
        }
    }

    #[test]
    fn mixed_takes_one_per_non_empty_active_topic() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(7);
        let test = mixed(&bank, &mut rng);
        let topics: Vec<&str> = test
            .questions
            .iter()
            .map(|q| q.topic.as_deref().unwrap())
            .collect();
        assert_eq!(topics, vec!["logic", "verbal", "numerical"]);
        assert_eq!(test.meta.total_questions, 3);
        assert_eq!(test.meta.topics_count, 4);
        assert_eq!(test.meta.questions_per_topic, 1);
    }

    #[test]
    fn mixed_gives_every_question_in_a_topic_a_chance() {
        let bank = vec![topic(1, "logic", 1..5, true)];
        let mut rng = StdRng::seed_from_u64(8);
        let seen: HashSet<i64> = (0..200).map(|_| mixed(&bank, &mut rng).questions[0].id).collect();
        assert_eq!(seen, (1..5).collect());
    }

    #[test]
    fn mixed_over_empty_bank_is_empty_not_an_error() {
        let mut rng = StdRng::seed_from_u64(9);
        let test = mixed(&[], &mut rng);
        assert!(test.questions.is_empty());
        assert_eq!(test.meta.topics_count, 0);
    }

    #[test]
    fn views_never_carry_an_answer_key() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(10);
        let test = random_sample(&bank, 12, &mut rng).unwrap();
        let json = serde_json::to_value(&test).unwrap();
        for q in json["questions"].as_array().unwrap() {
            assert!(q.get("correct_index").is_none());
        }
    }
}
