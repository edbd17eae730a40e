/// Project endpoints
///
/// Read-only: projects are provisioned by seeding, the app itself never
/// creates or edits them.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use taskify_shared::models::project::{Project, ProjectMember, ProjectWithCounts};
use taskify_shared::models::task::{Task, TaskWithAssignee};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectWithCounts>,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Serialize)]
pub struct ProjectTasksResponse {
    pub tasks: Vec<TaskWithAssignee>,
}

#[derive(Serialize)]
pub struct ProjectMembersResponse {
    pub members: Vec<ProjectMember>,
}

/// GET /api/projects
///
/// All projects with their per-column task counts.
pub async fn list_projects(
    State(state): State<AppState>,
) -> ApiResult<Json<ProjectListResponse>> {
    let projects = Project::list_with_counts(&state.db).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse { project }))
}

/// GET /api/projects/:id/tasks
///
/// The project's board, ordered by (status, orderIndex), ready to render
/// column by column.
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectTasksResponse>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_by_project(&state.db, project.id).await?;
    Ok(Json(ProjectTasksResponse { tasks }))
}

/// GET /api/projects/:id/members
pub async fn list_project_members(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectMembersResponse>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let members = ProjectMember::list_by_project(&state.db, project.id).await?;
    Ok(Json(ProjectMembersResponse { members }))
}
