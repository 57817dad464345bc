use axum::{extract::{rejection::JsonRejection, Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use service::errors::{StoreError, ValidationError};
use service::todos::{Todo, TodoId};

use crate::{errors::JsonApiError, routes::AppState};

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTodoInput {
    #[serde(default)]
    pub title: Option<Value>,
}

impl CreateTodoInput {
    /// Missing, null and non-string titles all read as empty.
    pub fn title(&self) -> &str {
        match &self.title {
            Some(Value::String(s)) => s,
            _ => "",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedOutput { pub id: TodoId }

#[derive(Debug, Serialize)]
pub struct CompletedOutput { pub id: TodoId, pub completed: bool, pub changed: bool }

#[derive(Debug, Serialize)]
pub struct DeletedOutput { pub id: TodoId }

#[derive(Debug, Serialize)]
pub struct DeletedAllOutput { pub deleted: u64 }

/// An id that does not parse cannot name a stored todo.
fn parse_id(raw: &str) -> Result<TodoId, JsonApiError> {
    raw.parse().map_err(|_| StoreError::not_found("todo", raw).into())
}

#[utoipa::path(
    get, path = "/todos", tag = "todos",
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::TodoDoc]),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, JsonApiError> {
    let todos = state.store.list().await?;
    info!(count = todos.len(), "list todos");
    Ok(Json(todos))
}

#[utoipa::path(
    post, path = "/todos", tag = "todos",
    request_body = crate::openapi::CreateTodoRequest,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CreatedDoc),
        (status = 400, description = "Validation Error"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<CreateTodoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedOutput>), JsonApiError> {
    // a body we cannot read carries no title
    let Json(input) = input.map_err(|rejection| {
        debug!(%rejection, "unreadable create body");
        JsonApiError::from(StoreError::from(ValidationError::EmptyTitle))
    })?;
    let id = state.store.create(input.title()).await?;
    info!(%id, "created todo");
    Ok((StatusCode::CREATED, Json(CreatedOutput { id })))
}

#[utoipa::path(
    put, path = "/todos/{id}", tag = "todos",
    params(("id" = String, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Completed", body = crate::openapi::CompletedDoc),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn complete(State(state): State<AppState>, Path(raw): Path<String>) -> Result<Json<CompletedOutput>, JsonApiError> {
    let id = parse_id(&raw)?;
    let outcome = state.store.mark_completed(id).await?;
    info!(%id, ?outcome, "completed todo");
    Ok(Json(CompletedOutput { id, completed: true, changed: outcome.changed() }))
}

#[utoipa::path(
    delete, path = "/todos/{id}", tag = "todos",
    params(("id" = String, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Deleted", body = crate::openapi::DeletedDoc),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn delete_one(State(state): State<AppState>, Path(raw): Path<String>) -> Result<Json<DeletedOutput>, JsonApiError> {
    let id = parse_id(&raw)?;
    state.store.delete_one(id).await?;
    info!(%id, "deleted todo");
    Ok(Json(DeletedOutput { id }))
}

#[utoipa::path(
    delete, path = "/todos", tag = "todos",
    responses(
        (status = 200, description = "All deleted", body = crate::openapi::DeletedAllDoc),
        (status = 500, description = "Storage Error")
    )
)]
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeletedAllOutput>, JsonApiError> {
    let deleted = state.store.delete_all().await?;
    info!(deleted, "deleted all todos");
    Ok(Json(DeletedAllOutput { deleted }))
}
