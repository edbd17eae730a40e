/// Client for the AI help assistant backend
///
/// Talks to an OpenAI-compatible chat completions endpoint. The client is
/// cheap to clone; reqwest pools connections internally.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HelpConfig;

/// What the assistant knows about the product
const SYSTEM_PROMPT: &str = "You are the in-app help assistant for Taskify, a team task \
     tracking tool with Kanban boards. Boards have four columns: To Do, In Progress, \
     In Review and Done. Users drag cards between columns, assign them to project \
     members and discuss them in comments. Answer briefly and concretely, in terms \
     of what the user can do in the app. If a question is not about Taskify, say so \
     politely.";

/// Help client errors
#[derive(Error, Debug)]
pub enum HelpClientError {
    /// Transport or HTTP-level failure
    #[error("Help request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response did not contain a usable completion
    #[error("Help backend returned an unusable response: {0}")]
    BadResponse(String),
}

/// One turn of a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "system", "user" or "assistant"
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// AI help assistant client
#[derive(Clone)]
pub struct HelpClient {
    http: reqwest::Client,
    config: HelpConfig,
}

impl HelpClient {
    /// Creates a client for the configured backend
    pub fn new(config: HelpConfig) -> Self {
        HelpClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Asks the assistant for the next reply
    ///
    /// `history` is the prior conversation, oldest first, ending with the
    /// user's newest question. The screen context, when known, is appended
    /// to the system prompt so answers can reference what the user sees.
    pub async fn complete(
        &self,
        history: Vec<ChatMessage>,
        screen_context: Option<&str>,
    ) -> Result<String, HelpClientError> {
        let mut system = SYSTEM_PROMPT.to_string();
        if let Some(screen) = screen_context {
            system.push_str(&format!(" The user is currently on the {screen} screen."));
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system,
        });
        messages.extend(history);

        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = response.json().await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HelpClientError::BadResponse("no completion choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let msg = ChatMessage::user("How do I move a card?");
        assert_eq!(msg.role, "user");

        let msg = ChatMessage::assistant("Drag it to another column.");
        assert_eq!(msg.role, "assistant");
    }

    #[test]
    fn test_chat_request_wire_format() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage::user("hi")],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
    }
}
