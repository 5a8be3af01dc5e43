// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::AppError,
    handlers::{admin, page, survey},
    state::AppState,
};

/// Unknown paths get the same JSON error body as every other failure.
async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

/// Assembles the main application router.
///
/// * The dashboard page and the form/button targets it posts to.
/// * The JSON API under `/api` (CORS enabled).
/// * Request tracing on everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let page_routes = Router::new()
        .route("/", get(page::show))
        .route("/submit", post(page::submit))
        .route("/admin/seed", post(admin::seed_from_page))
        .route("/admin/clear", post(admin::clear_from_page));

    let api_routes = Router::new()
        .route("/subjects", get(survey::list_subjects))
        .route(
            "/answers",
            get(survey::list_answers).post(survey::submit_answer),
        )
        .route("/status", get(survey::get_status))
        .route("/admin/seed", post(admin::seed))
        .route("/admin/clear", post(admin::clear))
        .layer(cors);

    Router::new()
        .merge(page_routes)
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
