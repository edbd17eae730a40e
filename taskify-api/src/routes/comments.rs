/// Comment endpoints
///
/// Comments hang off tasks. Creating, editing and deleting all broadcast
/// to the owning project's channel so open boards refresh the thread.
/// Broadcast is best effort, same contract as task events.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use taskify_shared::models::comment::{Comment, CommentWithAuthor, CreateComment};
use taskify_shared::models::task::Task;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentWithAuthor>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub comment: CommentWithAuthor,
}

#[derive(Serialize)]
pub struct DeleteCommentResponse {
    pub success: bool,
}

/// POST /api/comments/task/:taskId request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_id: Uuid,

    #[validate(length(min = 1, message = "Comment content must not be empty"))]
    pub content: String,
}

/// PATCH /api/comments/:commentId request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub author_id: Uuid,

    #[validate(length(min = 1, message = "Comment content must not be empty"))]
    pub content: String,
}

/// DELETE /api/comments/:commentId request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub author_id: Uuid,
}

/// GET /api/comments/task/:taskId
pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<CommentListResponse>> {
    let comments = Comment::list_by_task(&state.db, task_id).await?;
    Ok(Json(CommentListResponse { comments }))
}

/// POST /api/comments/task/:taskId
pub async fn create_comment(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    request.validate()?;

    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id: task.id,
            author_id: request.author_id,
            content: request.content,
        },
    )
    .await?;

    state
        .events
        .emit(
            task.project_id,
            "comment:added",
            json!({ "projectId": task.project_id, "comment": comment }),
        )
        .await;

    Ok(Json(CommentResponse { comment }))
}

/// PATCH /api/comments/:commentId
///
/// 403 when the caller is not the comment's author.
pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<UpdateCommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    request.validate()?;

    let comment =
        Comment::update(&state.db, comment_id, request.author_id, &request.content).await?;

    if let Some(task) = Task::find_by_id(&state.db, comment.comment.task_id).await? {
        state
            .events
            .emit(
                task.project_id,
                "comment:updated",
                json!({ "projectId": task.project_id, "comment": comment }),
            )
            .await;
    }

    Ok(Json(CommentResponse { comment }))
}

/// DELETE /api/comments/:commentId
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(request): Json<DeleteCommentRequest>,
) -> ApiResult<Json<DeleteCommentResponse>> {
    let deleted = Comment::delete(&state.db, comment_id, request.author_id).await?;

    if let Some(task) = Task::find_by_id(&state.db, deleted.task_id).await? {
        state
            .events
            .emit(
                task.project_id,
                "comment:deleted",
                json!({
                    "projectId": task.project_id,
                    "commentId": deleted.id,
                    "taskId": deleted.task_id,
                }),
            )
            .await;
    }

    Ok(Json(DeleteCommentResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_fails_validation() {
        let request = CreateCommentRequest {
            author_id: Uuid::nil(),
            content: String::new(),
        };
        assert!(request.validate().is_err());

        let request = UpdateCommentRequest {
            author_id: Uuid::nil(),
            content: "still here".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_bodies_are_camel_case() {
        let request: DeleteCommentRequest = serde_json::from_value(serde_json::json!({
            "authorId": "00000000-0000-0000-0000-000000000000"
        }))
        .unwrap();

        assert_eq!(request.author_id, Uuid::nil());
    }
}
