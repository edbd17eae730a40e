/// Help sidebar transcript model
///
/// Each help conversation is keyed by an opaque `session_id` chosen by the
/// client. Rows alternate between user questions and AI answers; the
/// optional `screen_context` records which screen the user was on.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE help_messages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     session_id TEXT NOT NULL,
///     sender VARCHAR(8) NOT NULL CHECK (sender IN ('user', 'ai')),
///     content TEXT NOT NULL,
///     screen_context TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Who wrote a help message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpSender {
    User,
    Ai,
}

impl HelpSender {
    /// Converts sender to its database label
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpSender::User => "user",
            HelpSender::Ai => "ai",
        }
    }
}

/// One message of a help conversation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HelpMessage {
    /// Unique message ID
    pub id: Uuid,

    /// Conversation this message belongs to
    pub session_id: String,

    /// "user" or "ai"
    pub sender: String,

    /// Message body
    pub content: String,

    /// Screen the user was on when asking
    pub screen_context: Option<String>,

    /// When the message was stored
    pub created_at: DateTime<Utc>,
}

impl HelpMessage {
    /// Stores a message in a session's transcript
    pub async fn insert(
        pool: &PgPool,
        session_id: &str,
        sender: HelpSender,
        content: &str,
        screen_context: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, HelpMessage>(
            r#"
            INSERT INTO help_messages (session_id, sender, content, screen_context)
            VALUES ($1, $2, $3, $4)
            RETURNING id, session_id, sender, content, screen_context, created_at
            "#,
        )
        .bind(session_id)
        .bind(sender.as_str())
        .bind(content)
        .bind(screen_context)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// Full transcript of a session, oldest first
    pub async fn list_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, HelpMessage>(
            r#"
            SELECT id, session_id, sender, content, screen_context, created_at
            FROM help_messages
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Most recent messages of a session, returned oldest first
    ///
    /// Used to give the AI a bounded conversation window.
    pub async fn recent_history(
        pool: &PgPool,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut messages = sqlx::query_as::<_, HelpMessage>(
            r#"
            SELECT id, session_id, sender, content, screen_context, created_at
            FROM help_messages
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }

    /// Deletes a session's transcript, returning the number of rows removed
    pub async fn clear_session(pool: &PgPool, session_id: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM help_messages WHERE session_id = $1")
            .bind(session_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_sender_as_str() {
        assert_eq!(HelpSender::User.as_str(), "user");
        assert_eq!(HelpSender::Ai.as_str(), "ai");
    }

    #[test]
    fn test_help_message_wire_format() {
        let message = HelpMessage {
            id: Uuid::nil(),
            session_id: "user-42".to_string(),
            sender: HelpSender::Ai.as_str().to_string(),
            content: "Drag the card to move it.".to_string(),
            screen_context: Some("kanban_board".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["sender"], "ai");
        assert_eq!(value["screenContext"], "kanban_board");
        assert!(value.get("sessionId").is_some());
    }
}
