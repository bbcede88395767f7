// tests/pg_store_tests.rs
//
// Run with a disposable database:
//   DATABASE_URL=postgres://... cargo test --test pg_store_tests -- --ignored

use std::sync::Arc;

use aptitude_engine::{
    error::AppError,
    models::{
        attempt::NewAttempt,
        question::{Difficulty, NewQuestion, QuestionOption, QuestionUpdate},
    },
    store::{AptitudeStore, PgStore},
};

async fn connect() -> PgStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.")
}

/// Topic names are unique per run so tests can share one database.
fn unique_topic(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

fn question(text: &str, correct_index: i16) -> NewQuestion {
    NewQuestion {
        question: text.to_string(),
        options: ["A", "B", "C", "D"].iter().map(|o| QuestionOption::from(*o)).collect(),
        correct_index,
        difficulty: Difficulty::Medium,
        explanation: Some("Because".to_string()),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn upsert_appends_to_single_topic_row() {
    let store = connect().await;
    let name = unique_topic("logic");

    let first = store
        .upsert_question(&format!("  {} ", name.to_uppercase()), question("Q1", 0))
        .await
        .unwrap();
    assert_eq!(first.name, name);
    assert_eq!(first.questions.len(), 1);

    let second = store.upsert_question(&name, question("Q2", 3)).await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.questions.len(), 2);
    assert_eq!(second.questions[1].correct_index, 3);
    assert_eq!(second.questions[1].difficulty, Difficulty::Medium);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn concurrent_upserts_share_one_topic() {
    let store = Arc::new(connect().await);
    let name = unique_topic("race");

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let name = name.clone();
        handles.push(tokio::spawn(async move {
            store
                .upsert_question(&name, question(&format!("Q{}", i), 1))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let topic = store.find_topic_by_name(&name).await.unwrap().unwrap();
    assert_eq!(topic.questions.len(), 8);
    let same_name = store
        .list_topics()
        .await
        .unwrap()
        .into_iter()
        .filter(|t| t.name == name)
        .count();
    assert_eq!(same_name, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn update_validates_and_resolve_sees_changes() {
    let store = connect().await;
    let name = unique_topic("edit");
    let topic = store.upsert_question(&name, question("Q1", 0)).await.unwrap();
    let id = topic.questions[0].id;

    let bad = store
        .update_question(
            &name,
            id,
            QuestionUpdate {
                options: Some(vec![QuestionOption::from("only one")]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(bad, AppError::Validation(_)));

    store
        .update_question(
            &name,
            id,
            QuestionUpdate {
                correct_index: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let resolved = store.resolve_question(&name, id).await.unwrap().unwrap();
    assert_eq!(resolved.correct_index, 2);
    assert!(store.resolve_question(&name, id + 1_000_000).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn deactivation_hides_topic_from_active_listing() {
    let store = connect().await;
    let name = unique_topic("hidden");
    store.upsert_question(&name, question("Q1", 0)).await.unwrap();

    let topic = store.set_topic_active(&name, false).await.unwrap();
    assert!(!topic.is_active);
    let active = store.find_active_topics().await.unwrap();
    assert!(active.iter().all(|t| t.name != name));

    let missing = store
        .set_topic_active(&unique_topic("absent"), false)
        .await
        .unwrap_err();
    assert!(matches!(missing, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn attempts_round_trip_through_jsonb() {
    let store = connect().await;
    let user = unique_topic("user");

    let record = store
        .append_attempt(
            &user,
            NewAttempt {
                topic: "logic".to_string(),
                total_questions: 0,
                correct_answers: 0,
                percentage: 0,
                time_taken_seconds: 17,
                answers: Vec::new(),
            },
        )
        .await
        .unwrap();

    let history = store.list_attempts(&user).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], record);
    assert!(store.find_attempt("someone-else", record.id).await.unwrap().is_none());
}
