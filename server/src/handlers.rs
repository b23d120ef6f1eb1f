//! Request handlers, one per route.
//!
//! # Design
//! Each handler is generic over the single store capability it calls and
//! receives it as router state. The list handler, for example, compiles
//! against anything that implements `GetAll`, so it can be mounted on a
//! router whose state is a one-method stand-in.
//!
//! Handlers never retry. A store failure becomes a 500 for that request.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::error::ApiError;
use crate::extract::{JsonBody, TodoIdParam};
use crate::model::{NewTodo, Todo, TodoPatch};
use crate::store::{CreateOne, GetAll, GetOneById, UpdateOneById};

/// `GET /v1/todos`: every todo, `[]` when there are none.
pub async fn list_todos<S: GetAll + Clone>(
    State(store): State<S>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = store.get_all().await?;
    Ok(Json(todos))
}

/// `GET /v1/todos/{id}`
pub async fn get_todo<S: GetOneById + Clone>(
    State(store): State<S>,
    TodoIdParam(id): TodoIdParam,
) -> Result<Json<Todo>, ApiError> {
    store
        .get_one_by_id(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `POST /v1/todos`: 201 with the stored todo.
pub async fn create_todo<S: CreateOne + Clone>(
    State(store): State<S>,
    JsonBody(input): JsonBody<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    input.validate()?;
    let todo = store.create_one(input).await?;
    info!(todo_id = %todo.todo_id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `PUT /v1/todos/{id}`: partial update; omitted fields keep their stored value.
pub async fn update_todo<S: UpdateOneById + Clone>(
    State(store): State<S>,
    TodoIdParam(id): TodoIdParam,
    JsonBody(patch): JsonBody<TodoPatch>,
) -> Result<Json<Todo>, ApiError> {
    patch.validate()?;
    let todo = store
        .update_one_by_id(id, patch)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(todo_id = %todo.todo_id, "todo updated");
    Ok(Json(todo))
}
