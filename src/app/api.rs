use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::error;

use super::db::DbHandle;
use super::models::{
    ActivityGroup, BAD_REQUEST, Empty, Envelope, INTERNAL_ERROR, Outcome, TodoItem,
};
use super::service::{
    ActivityGroupService, CreateActivityGroup, CreateTodoItem, TodoItemService,
    UpdateActivityGroup, UpdateTodoItem,
};

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub activity_groups: ActivityGroupService<DbHandle>,
    pub todo_items: TodoItemService<DbHandle>,
}

impl AppState {
    pub fn new(db: DbHandle) -> Self {
        Self {
            activity_groups: ActivityGroupService::new(db.clone()),
            todo_items: TodoItemService::new(db),
        }
    }
}

pub type SharedState = Arc<AppState>;

// ── Query types ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ActivityGroupQuery {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct TodoItemQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub activity_group_id: Option<i64>,
}

/// `?activity_group_id=` means no filter, like an absent parameter.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// ── Error handling ────────────────────────────────────────────────────

/// Failures outside the business rules: unreadable input and storage errors.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Envelope::failure(BAD_REQUEST, msg),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Envelope::failure(INTERNAL_ERROR, msg),
            ),
        };
        (status, Json(envelope)).into_response()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Outcome::Success(data) => {
                (StatusCode::OK, Json(Envelope::success(data))).into_response()
            }
            Outcome::Created(data) => {
                (StatusCode::CREATED, Json(Envelope::success(data))).into_response()
            }
            Outcome::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(Envelope::failure(status, msg)),
            )
                .into_response(),
            Outcome::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(Envelope::failure(status, msg)),
            )
                .into_response(),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route(
            "/activity-groups",
            get(list_activity_groups).post(create_activity_group),
        )
        .route(
            "/activity-groups/{id}",
            get(get_activity_group)
                .patch(update_activity_group)
                .delete(delete_activity_group),
        )
        .route("/todo-items", get(list_todo_items).post(create_todo_item))
        .route(
            "/todo-items/{id}",
            get(get_todo_item)
                .patch(update_todo_item)
                .delete(delete_todo_item),
        )
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

/// Run a service call on the blocking pool; the services talk to SQLite
/// synchronously.
async fn run_blocking<T, F>(state: SharedState, f: F) -> Result<Outcome<T>, ApiError>
where
    F: FnOnce(&AppState) -> anyhow::Result<Outcome<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(format!("Service task panicked: {}", e)))?
        .map_err(|e| {
            error!(error = %format!("{:#}", e), "Request failed in persistence layer");
            ApiError::Internal(e.to_string())
        })
}

/// A request without a JSON content type is treated as an empty body, so the
/// field validation decides how to answer it.
fn body_or_default<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn list_activity_groups(
    State(state): State<SharedState>,
    query: Result<Query<ActivityGroupQuery>, QueryRejection>,
) -> Result<Outcome<Vec<ActivityGroup>>, ApiError> {
    let Query(query) = query?;
    run_blocking(state, move |s| s.activity_groups.list(query.email.as_deref())).await
}

async fn get_activity_group(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Outcome<ActivityGroup>, ApiError> {
    let Path(id) = id?;
    run_blocking(state, move |s| s.activity_groups.get(id)).await
}

async fn create_activity_group(
    State(state): State<SharedState>,
    body: Result<Json<CreateActivityGroup>, JsonRejection>,
) -> Result<Outcome<ActivityGroup>, ApiError> {
    let request = body_or_default(body)?;
    run_blocking(state, move |s| s.activity_groups.create(request)).await
}

async fn update_activity_group(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateActivityGroup>, JsonRejection>,
) -> Result<Outcome<ActivityGroup>, ApiError> {
    let Path(id) = id?;
    let request = body_or_default(body)?;
    run_blocking(state, move |s| s.activity_groups.update(id, request)).await
}

async fn delete_activity_group(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Outcome<Empty>, ApiError> {
    let Path(id) = id?;
    run_blocking(state, move |s| s.activity_groups.delete(id)).await
}

async fn list_todo_items(
    State(state): State<SharedState>,
    query: Result<Query<TodoItemQuery>, QueryRejection>,
) -> Result<Outcome<Vec<TodoItem>>, ApiError> {
    let Query(query) = query?;
    run_blocking(state, move |s| s.todo_items.list(query.activity_group_id)).await
}

async fn get_todo_item(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Outcome<TodoItem>, ApiError> {
    let Path(id) = id?;
    run_blocking(state, move |s| s.todo_items.get(id)).await
}

async fn create_todo_item(
    State(state): State<SharedState>,
    body: Result<Json<CreateTodoItem>, JsonRejection>,
) -> Result<Outcome<TodoItem>, ApiError> {
    let request = body_or_default(body)?;
    run_blocking(state, move |s| s.todo_items.create(request)).await
}

async fn update_todo_item(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTodoItem>, JsonRejection>,
) -> Result<Outcome<TodoItem>, ApiError> {
    let Path(id) = id?;
    let request = body_or_default(body)?;
    run_blocking(state, move |s| s.todo_items.update(id, request)).await
}

async fn delete_todo_item(
    State(state): State<SharedState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Outcome<Empty>, ApiError> {
    let Path(id) = id?;
    run_blocking(state, move |s| s.todo_items.delete(id)).await
}

// ── Tests ─────────────────────────────────────────────────────────────
