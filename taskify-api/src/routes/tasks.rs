/// Task endpoints
///
/// `PATCH /api/tasks/:id` is the single entry point for every task
/// mutation the board makes: renames, description edits, assignment,
/// drag within a column and drag across columns. The handler validates
/// the body and hands the patch to the ordering engine.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskify_shared::models::comment::{Comment, CommentWithAuthor};
use taskify_shared::models::task::{Task, TaskPatch, TaskStatus, TaskWithAssignee};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

/// Distinguishes a field set to `null` from a field left out entirely
///
/// serde gives both cases `None` by default; wrapping the value in a
/// second `Option` keeps "clear this field" and "don't touch this field"
/// apart. Only runs when the key is present, so the outer layer is
/// always `Some`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// PATCH /api/tasks/:id request body
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<Uuid>>,

    pub order_index: Option<i32>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(request: UpdateTaskRequest) -> Self {
        TaskPatch {
            title: request.title,
            description: request.description,
            status: request.status,
            assigned_to: request.assigned_to,
            order_index: request.order_index,
        }
    }
}

#[derive(Serialize)]
pub struct TaskResponse {
    pub task: TaskWithAssignee,
}

/// Task with its comment thread, for the detail view
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskWithAssignee,

    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Serialize)]
pub struct TaskDetailResponse {
    pub task: TaskDetail,
}

/// GET /api/tasks/:id
///
/// Task with assignee and its full comment thread.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let task = Task::find_with_assignee(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comments = Comment::list_by_task(&state.db, id).await?;

    Ok(Json(TaskDetailResponse {
        task: TaskDetail { task, comments },
    }))
}

/// PATCH /api/tasks/:id
///
/// Applies a partial update through the ordering engine and returns the
/// task as committed. A `task:updated` event reaches the project's
/// subscribers independently of this response.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    request.validate()?;

    let updated = state.engine.update_task(id, request.into()).await?;

    tracing::info!(
        task_id = %updated.id,
        project_id = %updated.project_id,
        status = updated.status.as_str(),
        order_index = updated.order_index,
        "task updated"
    );

    let task = Task::find_with_assignee(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_field_is_untouched() {
        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "title": "New title" })).unwrap();

        assert_eq!(request.title.as_deref(), Some("New title"));
        assert_eq!(request.description, None);
        assert_eq!(request.assigned_to, None);
    }

    #[test]
    fn test_null_field_clears() {
        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "description": null, "assignedTo": null })).unwrap();

        assert_eq!(request.description, Some(None));
        assert_eq!(request.assigned_to, Some(None));
    }

    #[test]
    fn test_ordering_fields_deserialize() {
        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "status": "InProgress", "orderIndex": 0 })).unwrap();

        assert_eq!(request.status, Some(TaskStatus::InProgress));
        assert_eq!(request.order_index, Some(0));
    }

    #[test]
    fn test_empty_title_fails_validation() {
        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "title": "" })).unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_converts_to_patch() {
        let request: UpdateTaskRequest = serde_json::from_value(json!({
            "title": "T",
            "description": null,
            "status": "Done",
            "orderIndex": 3
        }))
        .unwrap();

        let patch: TaskPatch = request.into();
        assert_eq!(patch.title.as_deref(), Some("T"));
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.status, Some(TaskStatus::Done));
        assert_eq!(patch.order_index, Some(3));
        assert!(patch.has_field_changes());
    }
}
