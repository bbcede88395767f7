// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Default `limit` for the cross-topic random sample.
pub const DEFAULT_RANDOM_LIMIT: usize = 10;

/// Ceiling applied to any assembly `limit`; larger requests are clamped.
pub const DEFAULT_MAX_TEST_LIMIT: usize = 100;

/// Questions drawn from each topic in a mixed test.
pub const MIXED_QUESTIONS_PER_TOPIC: usize = 1;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub log_dir: String,
    pub random_default_limit: usize,
    pub max_test_limit: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let random_default_limit = parse_limit("RANDOM_TEST_DEFAULT_LIMIT", DEFAULT_RANDOM_LIMIT);
        let max_test_limit = parse_limit("MAX_TEST_LIMIT", DEFAULT_MAX_TEST_LIMIT);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            log_dir,
            random_default_limit: random_default_limit.min(max_test_limit),
            max_test_limit,
        }
    }

    /// Configuration for tests and embedding: in-memory store, default limits.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.into(),
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            random_default_limit: DEFAULT_RANDOM_LIMIT,
            max_test_limit: DEFAULT_MAX_TEST_LIMIT,
        }
    }
}

/// Reads a positive integer, falling back to `default` when unset or malformed.
fn parse_limit(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => value,
            _ => {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
