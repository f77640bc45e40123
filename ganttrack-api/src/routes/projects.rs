/// Project endpoints
///
/// Shared projects are visible and editable by every session; personal
/// projects are listed, edited, and deleted only by their owner. Every
/// project response embeds the project's full task collection.
///
/// # Endpoints
///
/// - `GET /api/projects` - List shared projects
/// - `GET /api/projects/personal` - List own personal projects
/// - `POST /api/projects` - Create project
/// - `GET /api/projects/:id` - Project detail with tasks
/// - `PUT /api/projects/:id` - Partial update (owner-gated when personal)
/// - `DELETE /api/projects/:id` - Delete project and its tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ganttrack_shared::{
    auth::middleware::AuthContext,
    models::project::{CreateProject, Project, ProjectWithTasks, UpdateProject},
};
use serde::Deserialize;

/// Create project request
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name
    #[serde(default)]
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Whether the project is personal to the creator
    #[serde(default)]
    pub is_personal: bool,
}

/// Update project request
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// List all shared projects, tasks embedded
pub async fn list_shared_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProjectWithTasks>>> {
    let projects = Project::list_shared(&state.db).await?;

    let mut result = Vec::with_capacity(projects.len());
    for project in projects {
        result.push(ProjectWithTasks::load(&state.db, project).await?);
    }

    Ok(Json(result))
}

/// List the caller's personal projects, tasks embedded
pub async fn list_personal_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ProjectWithTasks>>> {
    let projects = Project::list_personal(&state.db, auth.user_id).await?;

    let mut result = Vec::with_capacity(projects.len());
    for project in projects {
        result.push(ProjectWithTasks::load(&state.db, project).await?);
    }

    Ok(Json(result))
}

/// Create a project
///
/// A personal project is owned by its creator; shared projects carry
/// no owner.
///
/// # Errors
///
/// - `400 Bad Request`: Missing name
/// - `401 Unauthorized`: No valid session
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectWithTasks>)> {
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Project name is required".to_string()));
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            name: req.name,
            description: req.description,
            owner_id: req.is_personal.then_some(auth.user_id),
            is_personal: req.is_personal,
        },
    )
    .await?;

    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");

    // A fresh project has no tasks yet
    Ok((
        StatusCode::CREATED,
        Json(ProjectWithTasks {
            project,
            tasks: vec![],
        }),
    ))
}

/// Project detail with its full ordered task collection
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<ProjectWithTasks>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectWithTasks::load(&state.db, project).await?))
}

/// Update a project's name/description
///
/// # Errors
///
/// - `403 Forbidden`: Personal project, caller is not the owner
/// - `404 Not Found`: Unknown project id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectWithTasks>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !project.can_be_modified_by(auth.user_id) {
        return Err(ApiError::Forbidden(
            "You do not have permission to edit this project".to_string(),
        ));
    }

    let updated = Project::update(
        &state.db,
        project_id,
        UpdateProject {
            name: req.name,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectWithTasks::load(&state.db, updated).await?))
}

/// Delete a project and all of its tasks
///
/// # Errors
///
/// - `403 Forbidden`: Personal project, caller is not the owner
/// - `404 Not Found`: Unknown project id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<i64>,
) -> ApiResult<StatusCode> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    if !project.can_be_modified_by(auth.user_id) {
        return Err(ApiError::Forbidden(
            "You do not have permission to delete this project".to_string(),
        ));
    }

    Project::delete(&state.db, project_id).await?;

    tracing::info!(project_id, user_id = auth.user_id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}
