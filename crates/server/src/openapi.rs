use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

/// Projection returned by every todo endpoint. Timestamps are RFC 3339 in UTC.
#[derive(ToSchema)]
pub struct TodoDoc {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub deadline_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct CreateTodoDoc {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    /// ISO-8601 timestamp; a value without offset is read as UTC
    pub deadline_at: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateTodoDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    /// ISO-8601 timestamp, or `null` to clear the deadline
    pub deadline_at: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::todos::list,
        crate::routes::todos::get,
        crate::routes::todos::create,
        crate::routes::todos::update,
        crate::routes::todos::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            TodoDoc,
            CreateTodoDoc,
            UpdateTodoDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "todos")
    )
)]
pub struct ApiDoc;
