/// AI help assistant endpoints
///
/// Conversations are keyed by a client-chosen session id and stored in
/// full. Sending a message calls the configured chat backend with the
/// last few turns as context; when the backend misbehaves the user still
/// gets a stored apology reply rather than an error page.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskify_shared::models::help_message::{HelpMessage, HelpSender};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::help::{ChatMessage, HelpClient};

/// How many prior messages accompany each question
const HISTORY_LIMIT: i64 = 10;

/// Reply stored and returned when the AI backend fails
const FALLBACK_REPLY: &str = "Sorry, I'm having trouble answering right now. \
     Please try again in a moment.";

#[derive(Serialize)]
pub struct SessionResponse {
    pub messages: Vec<HelpMessage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: HelpMessage,

    pub ai_message: HelpMessage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ContextHelpResponse {
    pub message: HelpMessage,
}

#[derive(Serialize)]
pub struct ClearSessionResponse {
    pub success: bool,
}

/// POST /api/help/session/:sessionId/message request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(length(min = 1, message = "Message content must not be empty"))]
    pub content: String,

    pub screen_context: Option<String>,
}

/// POST /api/help/session/:sessionId/context request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextHelpRequest {
    pub screen_context: Option<String>,
}

/// Canned opening question for each known screen
fn context_question(screen_context: &str) -> &'static str {
    match screen_context {
        "kanban_board" => "How can I work with tasks on this Kanban board?",
        "project_list" => "What can I do with my projects?",
        "task_detail" => "How do I manage this task?",
        _ => "How can you help me?",
    }
}

/// GET /api/help/session/:sessionId
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionResponse>> {
    let messages = HelpMessage::list_by_session(&state.db, &session_id).await?;
    Ok(Json(SessionResponse { messages }))
}

/// POST /api/help/session/:sessionId/message
///
/// Stores the user's question, asks the assistant and stores its reply.
/// The request succeeds even when the AI backend fails; the `error` field
/// tells the frontend the reply is a fallback.
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<SendMessageResponse>> {
    request.validate()?;

    let help = state.help.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Help assistant is not configured".to_string())
    })?;

    let user_message = HelpMessage::insert(
        &state.db,
        &session_id,
        HelpSender::User,
        &request.content,
        request.screen_context.as_deref(),
    )
    .await?;

    let history = HelpMessage::recent_history(&state.db, &session_id, HISTORY_LIMIT).await?;
    let reply = ask_assistant(help, &history, request.screen_context.as_deref()).await;

    let (content, error) = match reply {
        Ok(content) => (content, None),
        Err(e) => {
            tracing::warn!(%session_id, error = %e, "help backend failed, storing fallback reply");
            (
                FALLBACK_REPLY.to_string(),
                Some("AI assistant temporarily unavailable".to_string()),
            )
        }
    };

    let ai_message = HelpMessage::insert(
        &state.db,
        &session_id,
        HelpSender::Ai,
        &content,
        request.screen_context.as_deref(),
    )
    .await?;

    Ok(Json(SendMessageResponse {
        user_message,
        ai_message,
        error,
    }))
}

/// POST /api/help/session/:sessionId/context
///
/// Proactive help when the user opens a screen: the assistant answers a
/// canned question for that screen and the reply lands in the session
/// transcript as an AI message. 400 when `screenContext` is missing.
pub async fn get_context_help(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ContextHelpRequest>,
) -> ApiResult<Json<ContextHelpResponse>> {
    let screen_context = request
        .screen_context
        .as_deref()
        .filter(|screen| !screen.is_empty())
        .ok_or_else(|| ApiError::BadRequest("screenContext is required".to_string()))?;

    let help = state.help.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable("Help assistant is not configured".to_string())
    })?;

    let question = context_question(screen_context);
    let reply = help
        .complete(vec![ChatMessage::user(question)], Some(screen_context))
        .await
        .map_err(|e| {
            tracing::warn!(%session_id, screen_context, error = %e, "contextual help failed");
            ApiError::ServiceUnavailable("Help assistant is unavailable".to_string())
        })?;

    let message = HelpMessage::insert(
        &state.db,
        &session_id,
        HelpSender::Ai,
        &reply,
        Some(screen_context),
    )
    .await?;

    Ok(Json(ContextHelpResponse { message }))
}

/// DELETE /api/help/session/:sessionId
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ClearSessionResponse>> {
    let removed = HelpMessage::clear_session(&state.db, &session_id).await?;
    tracing::info!(%session_id, removed, "help session cleared");

    Ok(Json(ClearSessionResponse { success: true }))
}

/// Maps the stored transcript to chat turns and asks for the next reply
async fn ask_assistant(
    help: &HelpClient,
    history: &[HelpMessage],
    screen_context: Option<&str>,
) -> Result<String, crate::help::HelpClientError> {
    let turns: Vec<ChatMessage> = history
        .iter()
        .map(|message| {
            if message.sender == HelpSender::Ai.as_str() {
                ChatMessage::assistant(message.content.clone())
            } else {
                ChatMessage::user(message.content.clone())
            }
        })
        .collect();

    help.complete(turns, screen_context).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_fails_validation() {
        let request = SendMessageRequest {
            content: String::new(),
            screen_context: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_context_question_per_screen() {
        assert_eq!(
            context_question("kanban_board"),
            "How can I work with tasks on this Kanban board?"
        );
        assert_eq!(
            context_question("project_list"),
            "What can I do with my projects?"
        );
        assert_eq!(context_question("task_detail"), "How do I manage this task?");
        assert_eq!(context_question("settings"), "How can you help me?");
    }

    #[test]
    fn test_context_request_tolerates_missing_screen() {
        let request: ContextHelpRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(request.screen_context.is_none());

        let request: ContextHelpRequest = serde_json::from_value(serde_json::json!({
            "screenContext": "kanban_board"
        }))
        .unwrap();
        assert_eq!(request.screen_context.as_deref(), Some("kanban_board"));
    }

    #[test]
    fn test_send_request_accepts_screen_context() {
        let request: SendMessageRequest = serde_json::from_value(serde_json::json!({
            "content": "How do I assign a task?",
            "screenContext": "kanban_board"
        }))
        .unwrap();

        assert_eq!(request.screen_context.as_deref(), Some("kanban_board"));
        assert!(request.validate().is_ok());
    }
}
