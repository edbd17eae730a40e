/// Project event broadcast and subscription
///
/// Publishers and subscribers meet on one Redis channel per project. The
/// `ProjectBroadcast` trait is the seam between the ordering engine and
/// the transport; production wires in `RedisBroadcast`, tests substitute
/// a recording double.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Serialize;
use uuid::Uuid;

use crate::models::task::{Task, TaskStatus};
use crate::realtime::client::RedisClientError;

/// Redis channel carrying a project's events
pub fn project_channel(project_id: Uuid) -> String {
    format!("project:{}", project_id)
}

/// Outbound side of a project's event channel
///
/// Emission is fire and forget: implementations log failures and return
/// normally, callers never block on delivery.
#[async_trait]
pub trait ProjectBroadcast: Send + Sync {
    /// Publishes one event to a project's channel
    async fn emit(&self, project_id: Uuid, event: &str, payload: serde_json::Value);
}

/// Task fields included in a `task:updated` event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEventBody {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub assigned_to: Option<Uuid>,
    pub order_index: i32,
    pub updated_at: DateTime<Utc>,
}

/// Payload of the `task:updated` event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdatedEvent {
    pub event: String,
    pub project_id: Uuid,
    pub task: TaskEventBody,
}

impl TaskUpdatedEvent {
    /// Event name on the wire
    pub const NAME: &'static str = "task:updated";

    /// Builds the event for a freshly committed task state
    pub fn new(task: &Task) -> Self {
        TaskUpdatedEvent {
            event: Self::NAME.to_string(),
            project_id: task.project_id,
            task: TaskEventBody {
                id: task.id,
                project_id: task.project_id,
                title: task.title.clone(),
                status: task.status,
                assigned_to: task.assigned_to,
                order_index: task.order_index,
                updated_at: task.updated_at,
            },
        }
    }
}

/// Redis-backed broadcast
#[derive(Clone)]
pub struct RedisBroadcast {
    conn: ConnectionManager,
}

impl RedisBroadcast {
    /// Creates a broadcast over an existing connection handle
    pub fn new(conn: ConnectionManager) -> Self {
        RedisBroadcast { conn }
    }
}

#[async_trait]
impl ProjectBroadcast for RedisBroadcast {
    async fn emit(&self, project_id: Uuid, event: &str, mut payload: serde_json::Value) {
        // Subscribers dispatch on the "event" key; stamp it in if the
        // payload doesn't carry it already.
        if let Some(object) = payload.as_object_mut() {
            object
                .entry("event")
                .or_insert_with(|| serde_json::Value::String(event.to_string()));
        }

        let body = payload.to_string();
        let channel = project_channel(project_id);

        let mut conn = self.conn.clone();
        let result: Result<i64, redis::RedisError> = conn.publish(&channel, body).await;

        match result {
            Ok(receivers) => {
                tracing::debug!(%channel, event, receivers, "event published");
            }
            Err(e) => {
                tracing::warn!(%channel, event, error = %e, "failed to publish event");
            }
        }
    }
}

/// Inbound side of project event channels
///
/// Each WebSocket client gets its own pub/sub connection, opened when it
/// joins a project room.
#[derive(Clone)]
pub struct ProjectSubscriber {
    client: redis::Client,
}

impl ProjectSubscriber {
    /// Creates a subscriber; connections are opened per subscription
    pub fn new(client: redis::Client) -> Self {
        ProjectSubscriber { client }
    }

    /// Subscribes to a project's channel
    ///
    /// Yields raw JSON payloads as published. The subscription ends when
    /// the returned stream is dropped.
    pub async fn subscribe(
        &self,
        project_id: Uuid,
    ) -> Result<impl Stream<Item = String> + Send, RedisClientError> {
        let conn = self.client.get_async_connection().await.map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to open pub/sub connection: {}", e))
        })?;

        let mut pubsub = conn.into_pubsub();
        let channel = project_channel(project_id);
        pubsub.subscribe(&channel).await?;

        tracing::debug!(%channel, "subscribed to project channel");

        Ok(pubsub.into_on_message().filter_map(|msg| async move {
            match msg.get_payload::<String>() {
                Ok(payload) => Some(payload),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping non-text pub/sub message");
                    None
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_channel_format() {
        let id = Uuid::nil();
        assert_eq!(
            project_channel(id),
            "project:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_task_updated_event_payload_shape() {
        let task = Task {
            id: Uuid::nil(),
            project_id: Uuid::nil(),
            title: "Ship it".to_string(),
            description: Some("hidden from events".to_string()),
            status: TaskStatus::InReview,
            assigned_to: None,
            order_index: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(TaskUpdatedEvent::new(&task)).unwrap();

        assert_eq!(value["event"], "task:updated");
        assert_eq!(value["projectId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["task"]["title"], "Ship it");
        assert_eq!(value["task"]["status"], "InReview");
        assert_eq!(value["task"]["orderIndex"], 1);
        assert!(value["task"].get("description").is_none());
    }
}
