pub mod extract;

use axum::Json;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::models::{NewTaskRequest, Task, TaskList, UpdateTaskRequest};
use crate::services::TaskService;
use crate::state::AppState;

use extract::{JsonBody, TaskId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Task Management API",
        "endpoints": {
            "create_task": "POST /api/tasks",
            "list_tasks": "GET /api/tasks",
            "get_task": "GET /api/tasks/<id>",
            "update_task": "PUT /api/tasks/<id>",
            "delete_task": "DELETE /api/tasks/<id>"
        }
    }))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_tasks(State(state): State<AppState>) -> Result<Json<TaskList>, AppError> {
    let tasks = TaskService::new(state.db).list().await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let task = TaskService::new(state.db).create(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<AppState>,
    TaskId(id): TaskId,
) -> Result<Json<Task>, AppError> {
    let task = TaskService::new(state.db).get(id).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    TaskId(id): TaskId,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let task = TaskService::new(state.db).update(id, req).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<AppState>,
    TaskId(id): TaskId,
) -> Result<Json<Value>, AppError> {
    TaskService::new(state.db).delete(id).await?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
