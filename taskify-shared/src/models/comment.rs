/// Comment model and database operations
///
/// Comments belong to a task and carry their author. Editing and deleting
/// are restricted to the author; there is no moderation concept.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     edited_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::task::Assignee;

/// Comment errors
#[derive(Error, Debug)]
pub enum CommentError {
    /// Comment does not exist
    #[error("Comment not found")]
    NotFound,

    /// Caller is not the comment's author
    #[error("Only the author may modify a comment")]
    NotAuthor,

    /// Underlying database error
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Author user ID
    pub author_id: Uuid,

    /// Comment body
    pub content: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment row was last updated
    pub updated_at: DateTime<Utc>,

    /// When the content was last edited (null if never)
    pub edited_at: Option<DateTime<Utc>>,
}

/// Comment together with its resolved author, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,

    pub author: Assignee,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

/// Flat row for comment + author join queries
#[derive(sqlx::FromRow)]
struct CommentAuthorRow {
    id: Uuid,
    task_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
    author_name: String,
    author_avatar_url: Option<String>,
}

impl From<CommentAuthorRow> for CommentWithAuthor {
    fn from(row: CommentAuthorRow) -> Self {
        CommentWithAuthor {
            comment: Comment {
                id: row.id,
                task_id: row.task_id,
                author_id: row.author_id,
                content: row.content,
                created_at: row.created_at,
                updated_at: row.updated_at,
                edited_at: row.edited_at,
            },
            author: Assignee {
                id: row.author_id,
                name: row.author_name,
                avatar_url: row.author_avatar_url,
            },
        }
    }
}

const COMMENT_JOIN: &str = r#"
    SELECT c.id, c.task_id, c.author_id, c.content,
           c.created_at, c.updated_at, c.edited_at,
           u.name AS author_name, u.avatar_url AS author_avatar_url
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

impl Comment {
    /// Lists all comments on a task, oldest first, with authors
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            "{COMMENT_JOIN} WHERE c.task_id = $1 ORDER BY c.created_at ASC"
        ))
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(CommentWithAuthor::from).collect())
    }

    /// Finds a comment with its author
    pub async fn find_with_author(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<CommentWithAuthor>, sqlx::Error> {
        let row = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            "{COMMENT_JOIN} WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(CommentWithAuthor::from))
    }

    /// Creates a comment and returns it with its author resolved
    pub async fn create(
        pool: &PgPool,
        data: CreateComment,
    ) -> Result<CommentWithAuthor, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at, updated_at, edited_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        // Author row must exist (FK), so this cannot be None.
        Self::find_with_author(pool, comment.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Edits a comment's content; only the author may edit
    ///
    /// Sets `edited_at` so clients can render an "edited" marker.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<CommentWithAuthor, CommentError> {
        let existing = sqlx::query_as::<_, Comment>(
            "SELECT id, task_id, author_id, content, created_at, updated_at, edited_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CommentError::NotFound)?;

        if existing.author_id != author_id {
            return Err(CommentError::NotAuthor);
        }

        sqlx::query(
            "UPDATE comments SET content = $2, edited_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(content)
        .execute(pool)
        .await?;

        Comment::find_with_author(pool, id)
            .await?
            .ok_or(CommentError::NotFound)
    }

    /// Deletes a comment; only the author may delete
    ///
    /// Returns the deleted comment so callers can broadcast which task it
    /// belonged to.
    pub async fn delete(pool: &PgPool, id: Uuid, author_id: Uuid) -> Result<Comment, CommentError> {
        let existing = sqlx::query_as::<_, Comment>(
            "SELECT id, task_id, author_id, content, created_at, updated_at, edited_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(CommentError::NotFound)?;

        if existing.author_id != author_id {
            return Err(CommentError::NotAuthor);
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(existing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_with_author_wire_format() {
        let item = CommentWithAuthor {
            comment: Comment {
                id: Uuid::nil(),
                task_id: Uuid::nil(),
                author_id: Uuid::nil(),
                content: "Looks good".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                edited_at: None,
            },
            author: Assignee {
                id: Uuid::nil(),
                name: "Jordan Lee".to_string(),
                avatar_url: None,
            },
        };

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["content"], "Looks good");
        assert_eq!(value["author"]["name"], "Jordan Lee");
        assert!(value.get("taskId").is_some());
        assert!(value["editedAt"].is_null());
    }

    #[test]
    fn test_comment_error_display() {
        assert_eq!(CommentError::NotFound.to_string(), "Comment not found");
        assert_eq!(
            CommentError::NotAuthor.to_string(),
            "Only the author may modify a comment"
        );
    }
}
