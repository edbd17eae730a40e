/// WebSocket event relay
///
/// A connected client joins at most one project room at a time. On
/// `join:project` the server subscribes to that project's Redis channel
/// and forwards every published event to the socket verbatim; on
/// `leave:project` or disconnect the subscription is dropped.
///
/// Client control messages:
///
/// ```json
/// { "type": "join:project", "projectId": "..." }
/// { "type": "leave:project" }
/// ```

use std::pin::Pin;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;

/// Control messages a client may send
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ControlMessage {
    #[serde(rename = "join:project")]
    Join {
        #[serde(rename = "projectId")]
        project_id: Uuid,
    },

    #[serde(rename = "leave:project")]
    Leave,
}

type EventStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut subscription: Option<EventStream> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ControlMessage>(&text) {
                            Ok(ControlMessage::Join { project_id }) => {
                                match state.subscriber.subscribe(project_id).await {
                                    Ok(stream) => {
                                        tracing::debug!(%project_id, "socket joined project room");
                                        subscription = Some(Box::pin(stream));
                                    }
                                    Err(e) => {
                                        tracing::warn!(%project_id, error = %e, "join failed");
                                    }
                                }
                            }
                            Ok(ControlMessage::Leave) => {
                                subscription = None;
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "ignoring malformed control message");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "socket receive error");
                        break;
                    }
                }
            }
            event = next_event(subscription.as_mut()) => {
                match event {
                    Some(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Upstream subscription ended, drop it; the client may
                    // rejoin.
                    None => subscription = None,
                }
            }
        }
    }
}

/// Next event from the current subscription, or pending forever when the
/// socket hasn't joined a room
async fn next_event(subscription: Option<&mut EventStream>) -> Option<String> {
    match subscription {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_message_join() {
        let msg: ControlMessage = serde_json::from_str(
            r#"{"type":"join:project","projectId":"00000000-0000-0000-0000-000000000000"}"#,
        )
        .unwrap();

        assert!(matches!(msg, ControlMessage::Join { project_id } if project_id == Uuid::nil()));
    }

    #[test]
    fn test_control_message_leave() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type":"leave:project"}"#).unwrap();
        assert!(matches!(msg, ControlMessage::Leave));
    }

    #[test]
    fn test_unknown_control_message_rejected() {
        assert!(serde_json::from_str::<ControlMessage>(r#"{"type":"emit:task"}"#).is_err());
    }
}
