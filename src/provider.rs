//! Model provider — synchronous chat-completions client.
//!
//! The conversation loop talks to the model through the [`ChatModel`]
//! trait; [`OpenAiClient`] is the production implementation against an
//! OpenAI-compatible `/v1/chat/completions` endpoint. Tests substitute a
//! scripted implementation.
//!
//! Every request carries a `response_format` JSON-schema constraint
//! requiring the step-object shape, so a well-behaved endpoint can only
//! answer with one step per turn.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::protocol::step_schema;

/// Who produced a message in the conversation.
///
/// `Observation` is produced only by the loop itself (tool results); on
/// the chat wire it is sent as the `developer` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    #[serde(rename = "developer")]
    Observation,
}

/// One entry in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The seam between the conversation loop and the language model.
pub trait ChatModel {
    /// Send the full conversation and return the raw assistant text.
    ///
    /// # Errors
    ///
    /// Any failure here (network, auth, quota, malformed response body) is
    /// a transport error: the loop terminates the run without retrying.
    fn complete(&self, messages: &[Message]) -> anyhow::Result<String>;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Request timeout. The loop itself enforces no deadline, so the client
/// does: a hung model call would otherwise block the run forever.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);
const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible chat-completions API.
pub struct OpenAiClient {
    /// Pre-computed `"Bearer <key>"` header value.
    auth_header: String,
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OpenAiClient {
    /// Create a client from a ready-to-use credential.
    ///
    /// The core does not validate key format; the service boundary that
    /// accepted the request already did.
    #[must_use]
    pub fn new(api_key: &str, model: Option<&str>) -> Self {
        Self {
            auth_header: format!("Bearer {api_key}"),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            model: model.unwrap_or(DEFAULT_MODEL).to_owned(),
            client: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
        }
    }

    /// Override the endpoint URL (self-hosted OpenAI-compatible servers).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn response_format() -> serde_json::Value {
        serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": "StepRecord",
                "schema": step_schema()
            }
        })
    }
}

impl ChatModel for OpenAiClient {
    fn complete(&self, messages: &[Message]) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            response_format: Self::response_format(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .context("chat-completions request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            anyhow::bail!("chat-completions API returned {status}: {body}");
        }

        let chat_response: ChatResponse = response
            .json()
            .context("chat-completions response JSON decode failed")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("chat-completions response contained no message content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_serializes_as_developer_role() {
        let msg = Message::new(Role::Observation, "tool output");
        let json = serde_json::to_string(&msg).expect("serialize");
        assert!(json.contains(r#""role":"developer""#));
    }

    #[test]
    fn standard_roles_serialize_lowercase() {
        for (role, expected) in [
            (Role::System, r#""system""#),
            (Role::User, r#""user""#),
            (Role::Assistant, r#""assistant""#),
        ] {
            let json = serde_json::to_string(&role).expect("serialize");
            assert_eq!(json, expected);
        }
    }
}
