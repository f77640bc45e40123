/// Task endpoints
///
/// Tasks are created and listed through their owning project; detail,
/// update, and delete address the task directly. Dates travel as
/// ISO-8601 calendar dates (`YYYY-MM-DD`); the assignee list is a JSON
/// array of user ids in both directions.
///
/// # Endpoints
///
/// - `GET /api/projects/:id/tasks` - List a project's tasks
/// - `POST /api/projects/:id/tasks` - Create a task in a project
/// - `GET /api/tasks/:id` - Task detail
/// - `PUT /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use ganttrack_shared::models::{
    project::Project,
    task::{CreateTask, Task, UpdateTask},
};
use serde::Deserialize;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task name
    #[serde(default)]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// First day of the span, `YYYY-MM-DD`
    pub start_date: Option<String>,

    /// Last day of the span, `YYYY-MM-DD`
    pub end_date: Option<String>,

    /// Progress percentage (default 0)
    pub progress: Option<i32>,

    /// Milestone flag (default false)
    pub is_milestone: Option<bool>,

    /// Completed flag (default false)
    pub is_completed: Option<bool>,

    /// Assignee user ids (default empty)
    pub assignee_ids: Option<Vec<i64>>,

    /// Optional memo
    pub memo: Option<String>,
}

/// Update task request
///
/// All fields optional; only supplied fields are overwritten.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New start date, `YYYY-MM-DD`
    pub start_date: Option<String>,

    /// New end date, `YYYY-MM-DD`
    pub end_date: Option<String>,

    /// New progress percentage
    pub progress: Option<i32>,

    /// New milestone flag
    pub is_milestone: Option<bool>,

    /// New completed flag
    pub is_completed: Option<bool>,

    /// Replacement assignee list
    pub assignee_ids: Option<Vec<i64>>,

    /// New memo
    pub memo: Option<String>,
}

/// Parses an ISO-8601 calendar date from a request field
fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("Invalid date format: expected YYYY-MM-DD".to_string())
    })
}

/// List all tasks of a project
///
/// # Errors
///
/// - `404 Not Found`: Unknown project id
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project_id).await?;
    Ok(Json(tasks))
}

/// Create a task in a project
///
/// Name and both dates are required; everything else defaults
/// (progress 0, flags false, no assignees).
///
/// # Errors
///
/// - `400 Bad Request`: Missing name/dates or unparsable date
/// - `404 Not Found`: Unknown project id
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Task name is required".to_string()));
    }

    let (start_date, end_date) = match (req.start_date.as_deref(), req.end_date.as_deref()) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => {
            (parse_date(start)?, parse_date(end)?)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Start date and end date are required".to_string(),
            ));
        }
    };

    let task = Task::create(
        &state.db,
        CreateTask {
            name: req.name,
            description: req.description,
            start_date,
            end_date,
            progress: req.progress.unwrap_or(0),
            is_milestone: req.is_milestone.unwrap_or(false),
            is_completed: req.is_completed.unwrap_or(false),
            assignee_ids: req.assignee_ids.unwrap_or_default(),
            memo: req.memo,
            project_id,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, project_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Task detail
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Update a task
///
/// Partial update: date fields are re-parsed when present, the
/// assignee list is re-encoded when present.
///
/// # Errors
///
/// - `400 Bad Request`: Unparsable date
/// - `404 Not Found`: Unknown task id
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let start_date = req.start_date.as_deref().map(parse_date).transpose()?;
    let end_date = req.end_date.as_deref().map(parse_date).transpose()?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            name: req.name,
            description: req.description,
            start_date,
            end_date,
            progress: req.progress,
            is_milestone: req.is_milestone,
            is_completed: req.is_completed,
            assignee_ids: req.assignee_ids,
            memo: req.memo,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
