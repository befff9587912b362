//! HTTP server for the task list.
//!
//! Handlers run the blocking load-modify-save cycle inline; the server is
//! started on a current-thread runtime so requests are handled one at a time.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::query::ListQuery;
use crate::storage::{self, TaskStore};
use crate::task::{local_now, NewTask, Task, TaskEdit};
use crate::urgency::calculate_urgency_score;
use crate::view;

/// Source of "now" for scoring, filtering and timestamps.
pub type Clock = fn() -> NaiveDateTime;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    /// Sort key used when a request has no `sort_by`.
    pub default_sort: String,
    pub clock: Clock,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, default_sort: impl Into<String>) -> Self {
        Self {
            store,
            default_sort: default_sort.into(),
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// Error that ends a request with a JSON body.
#[derive(Debug)]
pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "success": false, "error": self.0.to_string() }))).into_response()
    }
}

/// Integer task id from the `{task_id}` path segment.
///
/// A segment that is not an integer matches no task route, so it is a 404
/// rather than axum's default 400.
pub struct TaskId(pub u64);

impl<S> FromRequestParts<S> for TaskId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<u64>::from_request_parts(parts, state).await {
            Ok(Path(task_id)) => Ok(TaskId(task_id)),
            Err(rejection) => {
                debug!(error = %rejection, "non-integer task id");
                Err(StatusCode::NOT_FOUND)
            }
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add_task))
        .route("/complete/{task_id}", post(complete_task))
        .route("/edit/{task_id}", post(edit_task))
        .route("/delete/{task_id}", post(delete_task))
        .route("/api/tasks", get(list_tasks))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(
        addr = %listener.local_addr()?,
        store = %state.store.describe(),
        "taskboard listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("taskboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, AppError> {
    let now = (state.clock)();
    let tasks = state.store.load()?;
    let selected = query.resolve(&state.default_sort).run(tasks.tasks(), now);
    debug!(total = tasks.len(), shown = selected.len(), "rendering task list");
    Ok(Html(view::render_index(
        &selected,
        &query,
        &state.default_sort,
        now,
    )))
}

#[derive(Serialize)]
struct ScoredTask<'a> {
    #[serde(flatten)]
    task: &'a Task,
    urgency: f64,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let now = (state.clock)();
    let tasks = state.store.load()?;
    let scored: Vec<ScoredTask<'_>> = query
        .resolve(&state.default_sort)
        .run(tasks.tasks(), now)
        .into_iter()
        .map(|task| ScoredTask {
            task,
            urgency: calculate_urgency_score(task, now),
        })
        .collect();
    Ok(Json(serde_json::to_value(scored).map_err(Error::from)?))
}

async fn add_task(
    State(state): State<AppState>,
    Form(new_task): Form<NewTask>,
) -> Result<Redirect, AppError> {
    let now = (state.clock)();
    match storage::update(state.store.as_ref(), |tasks| {
        tasks.add(new_task, now).map(|task| task.id)
    }) {
        Ok(task_id) => info!(task_id, "task added"),
        Err(Error::EmptyDescription) => debug!("ignoring add with blank description"),
        Err(err) => return Err(err.into()),
    }
    Ok(Redirect::to("/"))
}

async fn complete_task(
    State(state): State<AppState>,
    TaskId(task_id): TaskId,
) -> Result<Redirect, AppError> {
    let now = (state.clock)();
    let completed = storage::update(state.store.as_ref(), |tasks| {
        Ok(tasks.toggle_complete(task_id, now).map(|task| task.completed))
    })?;
    match completed {
        Some(completed) => info!(task_id, completed, "task toggled"),
        None => debug!(task_id, "toggle for unknown task"),
    }
    Ok(Redirect::to("/"))
}

async fn edit_task(
    State(state): State<AppState>,
    TaskId(task_id): TaskId,
    Json(edit): Json<TaskEdit>,
) -> Response {
    let result = storage::update(state.store.as_ref(), |tasks| {
        tasks.edit(task_id, edit).map(|task| task.due_date.clone())
    });
    match result {
        Ok(due_date) => {
            info!(task_id, "task edited");
            Json(json!({ "success": true, "due_date": due_date })).into_response()
        }
        Err(err) => {
            debug!(task_id, error = %err, "edit rejected");
            AppError(err).into_response()
        }
    }
}

async fn delete_task(
    State(state): State<AppState>,
    TaskId(task_id): TaskId,
) -> Result<Redirect, AppError> {
    let removed = storage::update(state.store.as_ref(), |tasks| Ok(tasks.delete(task_id)))?;
    if removed {
        info!(task_id, "task deleted");
    } else {
        debug!(task_id, "delete for unknown task");
    }
    Ok(Redirect::to("/"))
}
