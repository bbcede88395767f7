// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, aptitude, attempts},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes assemble tests and score submissions.
/// * Attempt routes need an authenticated user.
/// * Admin routes need the admin role on top of authentication.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let aptitude_routes = Router::new()
        .route("/topics", get(aptitude::list_active_topics))
        .route("/topics/{topic}/test", get(aptitude::topic_test))
        .route("/questions/random", get(aptitude::random_questions))
        .route("/test/mixed", get(aptitude::mixed_test))
        .route("/submit", post(aptitude::submit_answers))
        // Protected: attempts belong to the authenticated user
        .merge(
            Router::new()
                .route("/submit/archive", post(aptitude::submit_and_archive))
                .route(
                    "/attempts",
                    get(attempts::list_my_attempts).post(attempts::archive_attempt),
                )
                .route("/attempts/{id}", get(attempts::get_my_attempt))
                .layer(auth.clone()),
        );

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route("/topics", get(admin::list_topics))
        .route("/topics/{topic}/active", put(admin::set_topic_active))
        .route(
            "/topics/{topic}/questions/{id}",
            get(admin::get_question).put(admin::update_question),
        )
        // Layers run bottom-up: auth first, then the admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(auth);

    Router::new()
        .nest("/api/aptitude", aptitude_routes)
        .nest("/api/admin/aptitude", admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
