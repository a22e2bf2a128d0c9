use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use service::{
    errors::ServiceError,
    todo::domain::{NewTodo, TodoChanges, TodoFilter, TodoView},
};
use tracing::info;

use crate::{errors::ApiError, routes::ServerState};

/// Raw list query; both values are interpreted leniently.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `true`, `1` or `t` (any case) selects completed todos; anything else selects open ones
    pub completed: Option<String>,
    /// Only todos whose deadline falls within this many days from now
    pub window: Option<String>,
}

/// Ids beyond the key column's range cannot name a stored todo.
fn stored_id(id: i64) -> Option<i32> {
    i32::try_from(id).ok()
}

#[utoipa::path(
    get, path = "/api/v1/todos", tag = "todos",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::TodoDoc]),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<TodoView>>, ApiError> {
    let Query(q) = query?;
    let filter = TodoFilter::from_query(q.completed.as_deref(), q.window.as_deref());
    let todos = state.todos.list(filter).await?;
    info!(count = todos.len(), completed = ?filter.completed, window = ?filter.window_days, "list todos");
    Ok(Json(todos))
}

#[utoipa::path(
    get, path = "/api/v1/todos/{id}", tag = "todos",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::TodoDoc),
        (status = 404, description = "Todo not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TodoView>, ApiError> {
    let Path(id) = id?;
    let id = stored_id(id).ok_or_else(|| ServiceError::not_found("Todo"))?;
    Ok(Json(state.todos.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/v1/todos", tag = "todos",
    request_body = crate::openapi::CreateTodoDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::TodoDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoView>), ApiError> {
    let Json(body) = body?;
    let input = NewTodo::from_json(&body)?;
    let created = state.todos.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/v1/todos/{id}", tag = "todos",
    params(("id" = i64, Path, description = "Todo id")),
    request_body = crate::openapi::UpdateTodoDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::TodoDoc),
        (status = 400, description = "Unexpected fields or invalid value", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Todo not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TodoView>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let changes = TodoChanges::from_json(&body)?;
    let id = stored_id(id).ok_or_else(|| ServiceError::not_found("Todo"))?;
    Ok(Json(state.todos.update(id, changes).await?))
}

#[utoipa::path(
    delete, path = "/api/v1/todos/{id}", tag = "todos",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Deleted todo, or `{}` when it did not exist", body = crate::openapi::TodoDoc)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let deleted = match stored_id(id) {
        Some(id) => state.todos.delete(id).await?,
        None => None,
    };
    let resp = match deleted {
        Some(view) => Json(view).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    };
    Ok(resp)
}
