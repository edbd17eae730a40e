/// Database models for Taskify
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Workspace users (PMs and engineers)
/// - `project`: Projects and project memberships
/// - `task`: Kanban tasks with status and column position
/// - `comment`: Task comments
/// - `help_message`: AI help sidebar transcripts
///
/// # Example
///
/// ```no_run
/// use taskify_shared::models::task::Task;
/// use taskify_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// if let Some(task) = Task::find_by_id(&pool, Uuid::new_v4()).await? {
///     println!("{} is at index {}", task.title, task.order_index);
/// }
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod help_message;
pub mod project;
pub mod task;
pub mod user;
