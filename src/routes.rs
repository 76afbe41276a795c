// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempts, quizzes, settings},
    state::AppState,
    utils::jwt::{auth_middleware, manager_middleware},
};

/// Assembles the main application router.
///
/// * Learner routes: quiz list, rule descriptions, attempt check.
/// * Manager routes: settings form, save and delete.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let learner_routes = Router::new()
        .route("/", get(quizzes::list_quizzes))
        .route("/{id}/rules", get(quizzes::describe_rules))
        .route("/{id}/attempts/check", get(attempts::check_attempt));

    // Auth first, then the manager role check
    let manager_routes = Router::new()
        .route("/{id}/settings/form", get(settings::get_settings_form))
        .route(
            "/{id}/settings",
            axum::routing::put(settings::save_settings).delete(settings::delete_settings),
        )
        .layer(middleware::from_fn(manager_middleware));

    let quiz_routes = learner_routes
        .merge(manager_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
