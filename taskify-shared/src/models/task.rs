/// Task model and database operations
///
/// This module provides the Task model representing cards on a project's
/// Kanban board. A task lives in exactly one column, identified by its
/// `status`, and holds a zero-based `order_index` within that column.
///
/// Column membership (`status`) and position (`order_index`) are owned by
/// the ordering engine (`crate::ordering`); nothing else may write those
/// two fields once a task exists.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('ToDo', 'InProgress', 'InReview', 'Done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'ToDo',
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     order_index INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Invariant
///
/// Within each `(project_id, status)` pair the `order_index` values form
/// exactly the contiguous range `0..count`, with no duplicates and no gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

/// Kanban column a task belongs to
///
/// The four columns are fixed; their declaration order is the board's
/// left-to-right display order (Postgres sorts enum values the same way).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    /// Converts status to its wire/database label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "ToDo",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::InReview => "InReview",
            TaskStatus::Done => "Done",
        }
    }
}

/// Task model representing a Kanban card
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Project this task belongs to
    pub project_id: Uuid,

    /// Card title
    pub title: String,

    /// Optional long description
    pub description: Option<String>,

    /// Column the task is in
    pub status: TaskStatus,

    /// Assigned user (must be a member of the task's project)
    pub assigned_to: Option<Uuid>,

    /// Zero-based position within the column
    pub order_index: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Assignee summary embedded in task responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// Task together with its resolved assignee, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
}

/// Input for creating a new task
///
/// The task is appended at the end of its column; the insert computes the
/// next free `order_index` so the column invariant holds from birth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    /// Project ID
    pub project_id: Uuid,

    /// Card title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Column to create the task in
    pub status: TaskStatus,

    /// Optional assignee
    pub assigned_to: Option<Uuid>,
}

/// Partial update to a task
///
/// `None` means "leave the field alone"; the nested `Option` on
/// `description` and `assigned_to` distinguishes "set to null" from
/// "not mentioned".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,

    /// New description (`Some(None)` clears it)
    pub description: Option<Option<String>>,

    /// Target column
    pub status: Option<TaskStatus>,

    /// New assignee (`Some(None)` unassigns)
    pub assigned_to: Option<Option<Uuid>>,

    /// Requested position within the target column
    pub order_index: Option<i32>,
}

impl TaskPatch {
    /// True when the patch touches any non-ordering field
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.assigned_to.is_some()
    }
}

const TASK_COLUMNS: &str = "id, project_id, title, description, status, \
                            assigned_to, order_index, created_at, updated_at";

/// Flat row for task + assignee join queries
#[derive(sqlx::FromRow)]
struct TaskAssigneeRow {
    id: Uuid,
    project_id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    assigned_to: Option<Uuid>,
    order_index: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_name: Option<String>,
    assignee_avatar_url: Option<String>,
}

impl From<TaskAssigneeRow> for TaskWithAssignee {
    fn from(row: TaskAssigneeRow) -> Self {
        let assignee = match (row.assigned_to, row.assignee_name) {
            (Some(id), Some(name)) => Some(Assignee {
                id,
                name,
                avatar_url: row.assignee_avatar_url,
            }),
            _ => None,
        };

        TaskWithAssignee {
            task: Task {
                id: row.id,
                project_id: row.project_id,
                title: row.title,
                description: row.description,
                status: row.status,
                assigned_to: row.assigned_to,
                order_index: row.order_index,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            assignee,
        }
    }
}

impl Task {
    /// Creates a new task at the end of its column
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, assigned_to, order_index)
            VALUES ($1, $2, $3, $4, $5,
                    (SELECT COUNT(*) FROM tasks WHERE project_id = $1 AND status = $4))
            RETURNING id, project_id, title, description, status,
                      assigned_to, order_index, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with its assignee resolved
    pub async fn find_with_assignee(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithAssignee>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskAssigneeRow>(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status,
                   t.assigned_to, t.order_index, t.created_at, t.updated_at,
                   u.name AS assignee_name, u.avatar_url AS assignee_avatar_url
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(TaskWithAssignee::from))
    }

    /// Lists all tasks of a project in Kanban display order
    ///
    /// Ordered by (status, order_index) so the board can be rendered in a
    /// single pass.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<TaskWithAssignee>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TaskAssigneeRow>(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status,
                   t.assigned_to, t.order_index, t.created_at, t.updated_at,
                   u.name AS assignee_name, u.avatar_url AS assignee_avatar_url
            FROM tasks t
            LEFT JOIN users u ON u.id = t.assigned_to
            WHERE t.project_id = $1
            ORDER BY t.status ASC, t.order_index ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TaskWithAssignee::from).collect())
    }

    /// Task IDs of one column, ordered by position
    pub async fn column_ids<'e, E>(
        executor: E,
        project_id: Uuid,
        status: TaskStatus,
    ) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM tasks
            WHERE project_id = $1 AND status = $2
            ORDER BY order_index ASC
            "#,
        )
        .bind(project_id)
        .bind(status)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    /// Task IDs of one column with one task left out, ordered by position
    pub async fn column_ids_excluding<'e, E>(
        executor: E,
        project_id: Uuid,
        status: TaskStatus,
        excluded: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM tasks
            WHERE project_id = $1 AND status = $2 AND id <> $3
            ORDER BY order_index ASC
            "#,
        )
        .bind(project_id)
        .bind(status)
        .bind(excluded)
        .fetch_all(executor)
        .await?;

        Ok(ids)
    }

    /// Writes a single task's column position
    pub async fn set_order_index<'e, E>(
        executor: E,
        id: Uuid,
        order_index: i32,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE tasks SET order_index = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(order_index)
            .execute(executor)
            .await?;

        Ok(())
    }

    /// Moves a task to another column at the given position
    ///
    /// Only the moved row itself; the surrounding renumbering is the
    /// ordering engine's job.
    pub async fn set_column<'e, E>(
        executor: E,
        id: Uuid,
        status: TaskStatus,
        order_index: i32,
    ) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            "UPDATE tasks SET status = $2, order_index = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(order_index)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Applies the non-ordering fields of a patch (title, description, assignee)
    ///
    /// `status` and `order_index` are deliberately not handled here.
    pub async fn update_fields<'e, E>(
        executor: E,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = &patch.title {
            q = q.bind(title.clone());
        }
        if let Some(description) = &patch.description {
            q = q.bind(description.clone());
        }
        if let Some(assigned_to) = &patch.assigned_to {
            q = q.bind(*assigned_to);
        }

        let task = q.fetch_optional(executor).await?;

        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::ToDo.as_str(), "ToDo");
        assert_eq!(TaskStatus::InProgress.as_str(), "InProgress");
        assert_eq!(TaskStatus::InReview.as_str(), "InReview");
        assert_eq!(TaskStatus::Done.as_str(), "Done");
    }

    #[test]
    fn test_task_status_wire_format() {
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), json!("InProgress"));
        let status: TaskStatus = serde_json::from_value(json!("Done")).unwrap();
        assert_eq!(status, TaskStatus::Done);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: Uuid::nil(),
            project_id: Uuid::nil(),
            title: "Fix login".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            assigned_to: None,
            order_index: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("projectId").is_some());
        assert!(value.get("orderIndex").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("order_index").is_none());
    }

    #[test]
    fn test_task_patch_field_changes() {
        assert!(!TaskPatch::default().has_field_changes());

        let patch = TaskPatch {
            order_index: Some(3),
            ..Default::default()
        };
        assert!(!patch.has_field_changes());

        let patch = TaskPatch {
            assigned_to: Some(None),
            ..Default::default()
        };
        assert!(patch.has_field_changes());
    }

    #[test]
    fn test_task_with_assignee_flattens() {
        let with_assignee = TaskWithAssignee {
            task: Task {
                id: Uuid::nil(),
                project_id: Uuid::nil(),
                title: "T".to_string(),
                description: None,
                status: TaskStatus::Done,
                assigned_to: Some(Uuid::nil()),
                order_index: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            assignee: Some(Assignee {
                id: Uuid::nil(),
                name: "Alex Chen".to_string(),
                avatar_url: None,
            }),
        };

        let value = serde_json::to_value(&with_assignee).unwrap();
        assert_eq!(value["title"], "T");
        assert_eq!(value["assignee"]["name"], "Alex Chen");
    }
}
