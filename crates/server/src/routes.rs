use std::sync::Arc;

use axum::{
    http::Uri,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::todo::{repository::SeaOrmTodoRepository, TodoService};

use crate::errors::ApiError;
use crate::openapi::ApiDoc;

pub mod todos;

/// Handles shared by every request; the database pool lives inside the repository.
#[derive(Clone)]
pub struct ServerState {
    pub todos: Arc<TodoService<SeaOrmTodoRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmTodoRepository::new(db));
        Self { todos: Arc::new(TodoService::new(repo)) }
    }
}

#[utoipa::path(
    get, path = "/api/v1/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Build the full application router: `/api/v1` endpoints plus the API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/todos", get(todos::list).post(todos::create))
        .route("/todos/:id", get(todos::get).put(todos::update).delete(todos::delete));

    Router::new()
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
