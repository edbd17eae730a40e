/// Project and membership models
///
/// A project owns a set of tasks and a set of members. Membership is the
/// relation that makes a user assignable to the project's tasks; it is
/// checked at mutation time by the ordering engine, not enforced by the
/// schema.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::task::TaskStatus;

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Per-column task counts shown on the project list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub to_do: i64,
    pub in_progress: i64,
    pub in_review: i64,
    pub done: i64,
}

impl TaskCounts {
    fn add(&mut self, status: TaskStatus, count: i64) {
        match status {
            TaskStatus::ToDo => self.to_do += count,
            TaskStatus::InProgress => self.in_progress += count,
            TaskStatus::InReview => self.in_review += count,
            TaskStatus::Done => self.done += count,
        }
    }
}

/// Project with its per-column task counts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithCounts {
    #[serde(flatten)]
    pub project: Project,

    pub task_counts: TaskCounts,
}

/// Membership of a user in a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// Project ID
    pub project_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the user joined the project
    pub joined_at: DateTime<Utc>,
}

impl Project {
    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_at, updated_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists all projects with their per-column task counts
    ///
    /// Uses one grouped aggregate over `tasks` instead of loading every
    /// task row.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<ProjectWithCounts>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_at, updated_at FROM projects ORDER BY name ASC",
        )
        .fetch_all(pool)
        .await?;

        let grouped: Vec<(Uuid, TaskStatus, i64)> = sqlx::query_as(
            "SELECT project_id, status, COUNT(*) FROM tasks GROUP BY project_id, status",
        )
        .fetch_all(pool)
        .await?;

        let mut counts: HashMap<Uuid, TaskCounts> = HashMap::new();
        for (project_id, status, count) in grouped {
            counts.entry(project_id).or_default().add(status, count);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let task_counts = counts.remove(&project.id).unwrap_or_default();
                ProjectWithCounts {
                    project,
                    task_counts,
                }
            })
            .collect())
    }

    /// Creates a new project
    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }
}

impl ProjectMember {
    /// Adds a user to a project
    pub async fn add(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            RETURNING project_id, user_id, joined_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a user is a member of a project
    ///
    /// This is the membership validation used by the ordering engine before
    /// accepting an assignee.
    pub async fn is_member<'e, E>(
        executor: E,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_members
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(exists)
    }

    /// Lists all members of a project
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, ProjectMember>(
            r#"
            SELECT project_id, user_id, joined_at
            FROM project_members
            WHERE project_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_counts_add() {
        let mut counts = TaskCounts::default();
        counts.add(TaskStatus::ToDo, 3);
        counts.add(TaskStatus::Done, 1);
        counts.add(TaskStatus::ToDo, 2);

        assert_eq!(counts.to_do, 5);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.in_review, 0);
        assert_eq!(counts.done, 1);
    }

    #[test]
    fn test_task_counts_wire_format() {
        let counts = TaskCounts {
            to_do: 1,
            in_progress: 2,
            in_review: 3,
            done: 4,
        };

        let value = serde_json::to_value(&counts).unwrap();
        assert_eq!(value["toDo"], 1);
        assert_eq!(value["inProgress"], 2);
        assert_eq!(value["inReview"], 3);
        assert_eq!(value["done"], 4);
    }

    #[test]
    fn test_project_with_counts_flattens() {
        let item = ProjectWithCounts {
            project: Project {
                id: Uuid::nil(),
                name: "Website Refresh".to_string(),
                description: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            task_counts: TaskCounts::default(),
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["name"], "Website Refresh");
        assert!(value.get("taskCounts").is_some());
    }
}
