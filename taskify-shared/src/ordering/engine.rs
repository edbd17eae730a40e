/// Transactional task update engine
///
/// `OrderingEngine` is the single entry point for mutating an existing
/// task. It validates the patch, applies it atomically and broadcasts one
/// `task:updated` event per successful update.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::project::ProjectMember;
use crate::models::task::{Task, TaskPatch, TaskStatus};
use crate::ordering::plan;
use crate::realtime::{ProjectBroadcast, TaskUpdatedEvent};

/// Errors from applying a task update
#[derive(Error, Debug)]
pub enum TaskUpdateError {
    /// Task does not exist
    #[error("Task not found")]
    NotFound,

    /// Requested assignee is not a member of the task's project
    #[error("Cannot assign task to user who is not a project member")]
    AssigneeNotMember,

    /// Underlying database error
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Applies task patches and keeps column ordering consistent
///
/// Holds the database pool and a broadcast handle; the handle is injected
/// so tests can capture emissions without Redis.
#[derive(Clone)]
pub struct OrderingEngine {
    pool: PgPool,
    events: Arc<dyn ProjectBroadcast>,
}

impl OrderingEngine {
    /// Creates an engine over a pool and a broadcast handle
    pub fn new(pool: PgPool, events: Arc<dyn ProjectBroadcast>) -> Self {
        OrderingEngine { pool, events }
    }

    /// Applies a patch to a task
    ///
    /// Exactly one of three paths runs, chosen from the patch and the
    /// task's current state:
    ///
    /// 1. `status` differs from the current column: the task moves between
    ///    columns and both columns are renumbered.
    /// 2. `order_index` is present (same column): the column is renumbered
    ///    with the task at its new position.
    /// 3. otherwise: plain field update, ordering untouched.
    ///
    /// Field changes (title, description, assignee) riding along with a
    /// reorder or move are applied in the same transaction.
    ///
    /// On success the updated task is returned and a `task:updated` event
    /// is emitted to the project's channel. Emission is best effort; a
    /// failed broadcast never fails the update.
    pub async fn update_task(
        &self,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, TaskUpdateError> {
        let task = Task::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(TaskUpdateError::NotFound)?;

        if let Some(Some(user_id)) = patch.assigned_to {
            let member = ProjectMember::is_member(&self.pool, task.project_id, user_id).await?;
            if !member {
                return Err(TaskUpdateError::AssigneeNotMember);
            }
        }

        let updated = match patch.status {
            Some(status) if status != task.status => {
                self.move_across_columns(&task, status, &patch).await?
            }
            _ => match patch.order_index {
                Some(requested) => self.reorder_within_column(&task, requested, &patch).await?,
                None => self.update_fields_only(&task, &patch).await?,
            },
        };

        self.emit_task_updated(&updated).await;

        Ok(updated)
    }

    /// Path 3: plain field update, no ordering involved
    async fn update_fields_only(
        &self,
        task: &Task,
        patch: &TaskPatch,
    ) -> Result<Task, TaskUpdateError> {
        if !patch.has_field_changes() {
            return Ok(task.clone());
        }

        Task::update_fields(&self.pool, task.id, patch)
            .await?
            .ok_or(TaskUpdateError::NotFound)
    }

    /// Path 2: renumber the task's own column around its new position
    async fn reorder_within_column(
        &self,
        task: &Task,
        requested_index: i32,
        patch: &TaskPatch,
    ) -> Result<Task, TaskUpdateError> {
        let mut tx = self.pool.begin().await?;

        // Point-in-time read of the column. Two clients renumbering the
        // same column concurrently serialize on commit and the later one
        // wins; the invariant still holds afterwards because each plan
        // renumbers the whole column.
        let column = Task::column_ids(&mut *tx, task.project_id, task.status).await?;

        let writes = match plan::plan_reorder(&column, task.id, requested_index) {
            Some(writes) => writes,
            // Column snapshot no longer contains the task; a concurrent
            // move took it. Treat as gone.
            None => return Err(TaskUpdateError::NotFound),
        };

        for write in &writes {
            Task::set_order_index(&mut *tx, write.task_id, write.order_index).await?;
        }

        if patch.has_field_changes() {
            Task::update_fields(&mut *tx, task.id, patch).await?;
        }

        let updated = Task::find_by_id(&mut *tx, task.id)
            .await?
            .ok_or(TaskUpdateError::NotFound)?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Path 1: move the task to another column and renumber both columns
    async fn move_across_columns(
        &self,
        task: &Task,
        new_status: TaskStatus,
        patch: &TaskPatch,
    ) -> Result<Task, TaskUpdateError> {
        // Absent index on a cross-column move means "top of the column".
        let requested_index = patch.order_index.unwrap_or(0);

        let mut tx = self.pool.begin().await?;

        let source =
            Task::column_ids_excluding(&mut *tx, task.project_id, task.status, task.id).await?;
        let dest =
            Task::column_ids_excluding(&mut *tx, task.project_id, new_status, task.id).await?;

        let move_plan = plan::plan_move(&source, &dest, task.id, requested_index);

        Task::set_column(&mut *tx, task.id, new_status, move_plan.final_index).await?;

        for write in &move_plan.source {
            Task::set_order_index(&mut *tx, write.task_id, write.order_index).await?;
        }
        for write in move_plan.dest.iter().filter(|w| w.task_id != task.id) {
            Task::set_order_index(&mut *tx, write.task_id, write.order_index).await?;
        }

        if patch.has_field_changes() {
            Task::update_fields(&mut *tx, task.id, patch).await?;
        }

        let updated = Task::find_by_id(&mut *tx, task.id)
            .await?
            .ok_or(TaskUpdateError::NotFound)?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Broadcasts `task:updated` for a committed update
    ///
    /// Fire and forget: serialization or transport failures are logged and
    /// swallowed, the caller already has the committed task.
    async fn emit_task_updated(&self, task: &Task) {
        let event = TaskUpdatedEvent::new(task);

        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(task_id = %task.id, error = %e, "failed to serialize task event");
                return;
            }
        };

        self.events
            .emit(task.project_id, TaskUpdatedEvent::NAME, payload)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_update_error_display() {
        assert_eq!(TaskUpdateError::NotFound.to_string(), "Task not found");
        assert_eq!(
            TaskUpdateError::AssigneeNotMember.to_string(),
            "Cannot assign task to user who is not a project member"
        );
    }
}
