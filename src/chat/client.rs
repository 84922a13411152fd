//! Core `ChatModel` trait and `ApiChatModel` implementation.
//!
//! `ApiChatModel` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint.  All connection details come from [`ChatConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ChatConfig;

use super::message::{ConversationTurn, ToolCall};

// ---------------------------------------------------------------------------
// ChatError
// ---------------------------------------------------------------------------

/// Errors that can occur during a chat-completion call.
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("chat request timed out")]
    Timeout,

    /// The endpoint answered with a non-success HTTP status.
    #[error("chat endpoint returned status {0}")]
    Status(u16),

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse chat response: {0}")]
    Parse(String),

    /// The model returned neither text content nor tool calls.
    #[error("model returned an empty reply")]
    EmptyReply,

    /// A tool-call token was left unanswered before the follow-up call.
    #[error("unanswered tool call: {0}")]
    UnansweredToolCall(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AssistantReply
// ---------------------------------------------------------------------------

/// One model reply: either a direct answer, tool-call requests, or both.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    /// Text content, absent when the model only requested tools.
    pub content: Option<String>,
    /// Requested tool invocations, empty for a direct answer.
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantReply {
    /// Returns `true` when the reply requests at least one tool invocation.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert the reply into the assistant [`ConversationTurn`] that must be
    /// appended to the history (and echoed back on the follow-up call when
    /// tools were requested).
    pub fn into_turn(self) -> ConversationTurn {
        if self.tool_calls.is_empty() {
            ConversationTurn::assistant(self.content.unwrap_or_default())
        } else {
            ConversationTurn::assistant_tool_calls(self.content, self.tool_calls)
        }
    }
}

// ---------------------------------------------------------------------------
// ChatModel trait
// ---------------------------------------------------------------------------

/// Async trait for tool-calling chat models.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn ChatModel>`).
///
/// # Arguments
/// * `messages` – Full message list for this call, system turn included.
/// * `tools`    – Tool schemas to offer, or `None` for the follow-up call
///                that must produce the final answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ConversationTurn],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<AssistantReply, ChatError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

impl WireMessage {
    fn into_reply(self) -> Result<AssistantReply, ChatError> {
        let tool_calls = self.tool_calls.unwrap_or_default();
        if tool_calls.is_empty() && self.content.as_deref().unwrap_or("").trim().is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(AssistantReply {
            content: self.content,
            tool_calls,
        })
    }
}

// ---------------------------------------------------------------------------
// ApiChatModel
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The `Authorization: Bearer …` header is attached **only** when
/// `config.api_key` is `Some(key)` and `key` is non-empty — safe for local
/// providers that require no authentication.
pub struct ApiChatModel {
    client: reqwest::Client,
    config: ChatConfig,
}

impl ApiChatModel {
    /// Build an `ApiChatModel` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &ChatConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ChatModel for ApiChatModel {
    async fn complete(
        &self,
        messages: &[ConversationTurn],
        tools: Option<&[serde_json::Value]>,
    ) -> Result<AssistantReply, ChatError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let mut body = serde_json::json!({
            "model":       self.config.model,
            "messages":    messages,
            "temperature": self.config.temperature,
            "stream":      false,
        });
        if let Some(tools) = tools {
            body["tools"] = serde_json::Value::Array(tools.to_vec());
            body["tool_choice"] = serde_json::Value::String("auto".into());
        }

        let mut req = self.client.post(&url).json(&body);

        // Attach Authorization header only when api_key is a non-empty string.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::EmptyReply)?;

        choice.message.into_reply()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
