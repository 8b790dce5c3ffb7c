pub mod grades;

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Json, Router,
};
use common::types::Health;
use service::grades::GradeService;
use service::storage::DocumentStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::openapi;

/// Shared handler state: one grade service per process, so all writers
/// queue on the same lock.
#[derive(Clone)]
pub struct AppState {
    pub grades: Arc<GradeService<dyn DocumentStore>>,
}

impl AppState {
    pub fn new<S: DocumentStore + 'static>(store: Arc<S>) -> Self {
        let store: Arc<dyn DocumentStore> = store;
        Self { grades: Arc::new(GradeService::new(store)) }
    }
}

#[utoipa::path(get, path = "/health", tag = "system", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let grade_routes = Router::new()
        .route(
            "/grades",
            get(grades::get_grade)
                .post(grades::create_grade)
                .put(grades::update_grade),
        )
        .route("/grades/total", get(grades::total))
        .route("/grades/average", get(grades::average))
        .route("/grades/top3", get(grades::top3))
        .route("/grades/:id", delete(grades::delete_grade));

    let system = Router::new()
        .route("/health", get(health))
        .route("/openapi.json", get(openapi::openapi_json));

    system
        .merge(grade_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
