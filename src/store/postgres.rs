// src/store/postgres.rs

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, postgres::PgPoolOptions, types::Json};

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerSnapshot, AttemptRecord, NewAttempt},
        question::{NewQuestion, Question, QuestionOption, QuestionUpdate},
        topic::{Topic, normalize_topic_name},
    },
    store::{AptitudeStore, prepare_question, prepare_update},
};

const QUESTION_COLUMNS: &str =
    "q.id, q.topic_id, q.question, q.options, q.correct_index, q.difficulty, q.explanation";

const ATTEMPT_COLUMNS: &str = "id, user_id, topic, total_questions, correct_answers, percentage, \
     time_taken_seconds, answers, created_at";

/// Row of the 'aptitude_topics' table.
#[derive(Debug, FromRow)]
struct TopicRow {
    id: i64,
    name: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

/// Row of the 'aptitude_questions' table.
#[derive(Debug, FromRow)]
struct QuestionRow {
    id: i64,
    topic_id: i64,
    question: String,
    options: Json<Vec<QuestionOption>>,
    correct_index: i16,
    difficulty: String,
    explanation: Option<String>,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let difficulty = row
            .difficulty
            .parse()
            .map_err(AppError::InternalServerError)?;
        Ok(Question {
            id: row.id,
            question: row.question,
            options: row.options.0,
            correct_index: row.correct_index,
            difficulty,
            explanation: row.explanation,
        })
    }
}

/// Row of the 'aptitude_attempts' table.
#[derive(Debug, FromRow)]
struct AttemptRow {
    id: i64,
    user_id: String,
    topic: String,
    total_questions: i64,
    correct_answers: i64,
    percentage: i64,
    time_taken_seconds: i64,
    answers: Json<Vec<AnswerSnapshot>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AttemptRow> for AttemptRecord {
    fn from(row: AttemptRow) -> Self {
        AttemptRecord {
            id: row.id,
            user_id: row.user_id,
            topic: row.topic,
            total_questions: row.total_questions,
            correct_answers: row.correct_answers,
            percentage: row.percentage,
            time_taken_seconds: row.time_taken_seconds,
            answers: row.answers.0,
            created_at: row.created_at,
        }
    }
}

enum TopicFilter {
    All,
    Active,
    Named(String),
}

/// Logs a failed query with context and passes the error through unchanged.
fn store_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// Postgres-backed store. Topic uniqueness is enforced by the UNIQUE
/// constraint on `aptitude_topics.name`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, waiting for the database to come up, and applies migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > 5 {
                        return Err(AppError::Database(e));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };
        tracing::info!("Database connected...");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(format!("migration failed: {}", e)))?;
        tracing::info!("Migrations applied successfully.");

        Ok(Self::new(pool))
    }

    async fn load_topics(&self, filter: TopicFilter) -> Result<Vec<Topic>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, name, is_active, created_at, updated_at FROM aptitude_topics",
        );
        match filter {
            TopicFilter::All => {}
            TopicFilter::Active => {
                builder.push(" WHERE is_active");
            }
            TopicFilter::Named(name) => {
                builder.push(" WHERE name = ");
                builder.push_bind(name);
            }
        }
        builder.push(" ORDER BY id");

        let rows: Vec<TopicRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("Failed to fetch topics"))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|t| t.id).collect();
        let question_rows: Vec<QuestionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM aptitude_questions q WHERE q.topic_id = ANY($1) ORDER BY q.id",
            QUESTION_COLUMNS
        ))
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("Failed to fetch questions"))?;

        let mut by_topic: HashMap<i64, Vec<Question>> = HashMap::new();
        for row in question_rows {
            let topic_id = row.topic_id;
            by_topic
                .entry(topic_id)
                .or_default()
                .push(Question::try_from(row)?);
        }

        Ok(rows
            .into_iter()
            .map(|t| Topic {
                questions: by_topic.remove(&t.id).unwrap_or_default(),
                id: t.id,
                name: t.name,
                is_active: t.is_active,
                created_at: t.created_at,
                updated_at: t.updated_at,
            })
            .collect())
    }

    async fn load_topic(&self, name: String) -> Result<Option<Topic>, AppError> {
        Ok(self
            .load_topics(TopicFilter::Named(name))
            .await?
            .into_iter()
            .next())
    }
}

#[async_trait]
impl AptitudeStore for PgStore {
    async fn upsert_question(&self, topic: &str, question: NewQuestion) -> Result<Topic, AppError> {
        let (name, question) = prepare_question(topic, question)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to begin transaction"))?;

        // A concurrent creator blocks on the unique index; the loser inserts
        // nothing and appends to the winner's row below.
        sqlx::query("INSERT INTO aptitude_topics (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(&name)
            .execute(&mut *tx)
            .await
            .map_err(store_err("Failed to ensure topic"))?;

        let topic_id: i64 =
            sqlx::query_scalar("SELECT id FROM aptitude_topics WHERE name = $1 FOR UPDATE")
                .bind(&name)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_err("Failed to lock topic"))?;

        sqlx::query(
            r#"
            INSERT INTO aptitude_questions
            (topic_id, question, options, correct_index, difficulty, explanation)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(topic_id)
        .bind(question.question)
        .bind(Json(question.options))
        .bind(question.correct_index)
        .bind(question.difficulty.as_str())
        .bind(question.explanation)
        .execute(&mut *tx)
        .await
        .map_err(store_err("Failed to append question"))?;

        sqlx::query("UPDATE aptitude_topics SET updated_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(topic_id)
            .execute(&mut *tx)
            .await
            .map_err(store_err("Failed to touch topic"))?;

        tx.commit()
            .await
            .map_err(store_err("Failed to commit question"))?;

        self.load_topic(name)
            .await?
            .ok_or(AppError::InternalServerError(
                "Topic vanished after upsert".to_string(),
            ))
    }

    async fn update_question(
        &self,
        topic: &str,
        question_id: i64,
        update: QuestionUpdate,
    ) -> Result<Question, AppError> {
        let name = normalize_topic_name(topic);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to begin transaction"))?;

        let row: QuestionRow = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM aptitude_questions q
            JOIN aptitude_topics t ON t.id = q.topic_id
            WHERE t.name = $1 AND q.id = $2
            FOR UPDATE OF q
            "#,
            QUESTION_COLUMNS
        ))
        .bind(&name)
        .bind(question_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_err("Failed to fetch question"))?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

        let current = Question::try_from(row)?;
        let merged = prepare_update(&current, update)?;

        sqlx::query(
            r#"
            UPDATE aptitude_questions
            SET question = $1, options = $2, correct_index = $3, difficulty = $4, explanation = $5
            WHERE id = $6
            "#,
        )
        .bind(&merged.question)
        .bind(Json(&merged.options))
        .bind(merged.correct_index)
        .bind(merged.difficulty.as_str())
        .bind(&merged.explanation)
        .bind(question_id)
        .execute(&mut *tx)
        .await
        .map_err(store_err("Failed to update question"))?;

        tx.commit()
            .await
            .map_err(store_err("Failed to commit question update"))?;

        Ok(merged.into_question(question_id))
    }

    async fn set_topic_active(&self, topic: &str, is_active: bool) -> Result<Topic, AppError> {
        let name = normalize_topic_name(topic);
        let result = sqlx::query(
            "UPDATE aptitude_topics SET is_active = $1, updated_at = CURRENT_TIMESTAMP WHERE name = $2",
        )
        .bind(is_active)
        .bind(&name)
        .execute(&self.pool)
        .await
        .map_err(store_err("Failed to update topic"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Topic not found".to_string()));
        }

        self.load_topic(name)
            .await?
            .ok_or(AppError::NotFound("Topic not found".to_string()))
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, AppError> {
        self.load_topics(TopicFilter::All).await
    }

    async fn find_active_topics(&self) -> Result<Vec<Topic>, AppError> {
        self.load_topics(TopicFilter::Active).await
    }

    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, AppError> {
        self.load_topic(normalize_topic_name(name)).await
    }

    async fn resolve_question(
        &self,
        topic: &str,
        question_id: i64,
    ) -> Result<Option<Question>, AppError> {
        let row: Option<QuestionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM aptitude_questions q
            JOIN aptitude_topics t ON t.id = q.topic_id
            WHERE t.name = $1 AND q.id = $2
            "#,
            QUESTION_COLUMNS
        ))
        .bind(normalize_topic_name(topic))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("Failed to resolve question"))?;

        row.map(Question::try_from).transpose()
    }

    async fn append_attempt(
        &self,
        user_id: &str,
        attempt: NewAttempt,
    ) -> Result<AttemptRecord, AppError> {
        let row: AttemptRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO aptitude_attempts
            (user_id, topic, total_questions, correct_answers, percentage, time_taken_seconds, answers)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(attempt.topic)
        .bind(attempt.total_questions)
        .bind(attempt.correct_answers)
        .bind(attempt.percentage)
        .bind(attempt.time_taken_seconds)
        .bind(Json(attempt.answers))
        .fetch_one(&self.pool)
        .await
        .map_err(store_err("Failed to archive attempt"))?;

        Ok(row.into())
    }

    async fn list_attempts(&self, user_id: &str) -> Result<Vec<AttemptRecord>, AppError> {
        let rows: Vec<AttemptRow> = sqlx::query_as(&format!(
            "SELECT {} FROM aptitude_attempts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("Failed to list attempts"))?;

        Ok(rows.into_iter().map(AttemptRecord::from).collect())
    }

    async fn find_attempt(
        &self,
        user_id: &str,
        attempt_id: i64,
    ) -> Result<Option<AttemptRecord>, AppError> {
        let row: Option<AttemptRow> = sqlx::query_as(&format!(
            "SELECT {} FROM aptitude_attempts WHERE user_id = $1 AND id = $2",
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("Failed to fetch attempt"))?;

        Ok(row.map(AttemptRecord::from))
    }
}
