/// Kanban task ordering engine
///
/// This module owns the `status` and `order_index` fields of every task.
/// It keeps each column's `order_index` values contiguous (`0..count`, no
/// gaps, no duplicates) across reorders within a column and moves between
/// columns, and broadcasts the result to the owning project's subscribers.
///
/// # Modules
///
/// - `plan`: pure renumbering planner, no I/O, fully unit tested
/// - `engine`: validation, transactional apply, change notification
///
/// # Example
///
/// ```no_run
/// use taskify_shared::ordering::{OrderingEngine, TaskPatch};
/// use taskify_shared::models::task::TaskStatus;
/// use uuid::Uuid;
///
/// # async fn example(engine: OrderingEngine, task_id: Uuid) -> anyhow::Result<()> {
/// // Drag a card to the top of "In Progress".
/// let patch = TaskPatch {
///     status: Some(TaskStatus::InProgress),
///     order_index: Some(0),
///     ..Default::default()
/// };
///
/// let task = engine.update_task(task_id, patch).await?;
/// println!("{} is now at index {}", task.title, task.order_index);
/// # Ok(())
/// # }
/// ```

pub mod engine;
pub mod plan;

pub use engine::{OrderingEngine, TaskUpdateError};

// Re-exported so callers don't need to reach into models for the patch type.
pub use crate::models::task::TaskPatch;
