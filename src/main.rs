// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use aptitude_engine::config::Config;
use aptitude_engine::routes;
use aptitude_engine::state::{AppState, DynStore};
use aptitude_engine::store::{MemoryStore, PgStore};
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "aptitude.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store: DynStore = match &config.database_url {
        Some(url) => match PgStore::connect(url).await {
            Ok(store) => Arc::new(store),
            Err(e) => panic!("Failed to initialize Postgres store: {}", e),
        },
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store (data is not persisted)");
            Arc::new(MemoryStore::new())
        }
    };

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .unwrap_or_else(|e| panic!("Invalid BIND_ADDR '{}': {}", config.bind_addr, e));

    let state = AppState::new(store, config);

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listening address");

    // Start the server
    axum::serve(listener, app).await.expect("Server error");
}
