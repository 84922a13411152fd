//! Conversation turn types — serialized directly as chat-completion messages.
//!
//! A [`ConversationTurn`] is one entry in the conversation history.  The
//! struct mirrors the wire format of OpenAI-style chat endpoints so the
//! history can be sent verbatim: optional fields are skipped when absent,
//! and an assistant turn that requested tools carries its [`ToolCall`]s so
//! they echo back to the model on the follow-up call.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Fixed per-call instruction; never stored in the session history.
    System,
    /// The user's utterance.
    User,
    /// A model reply — either a direct answer or a tool-call request.
    Assistant,
    /// The result of one tool invocation, correlated by `tool_call_id`.
    Tool,
}

// ---------------------------------------------------------------------------
// ToolCall
// ---------------------------------------------------------------------------

/// One tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque correlation token.  The matching tool-result turn must carry
    /// the same token in its `tool_call_id` field.
    pub id: String,
    /// Always `"function"` for the endpoints this crate talks to.
    #[serde(rename = "type")]
    pub kind: String,
    /// The requested function and its JSON-encoded arguments.
    pub function: ToolFunction,
}

/// Function name + arguments of a [`ToolCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    pub name: String,
    /// JSON object encoded as a string, per the wire format.
    pub arguments: String,
}

// ---------------------------------------------------------------------------
// ConversationTurn
// ---------------------------------------------------------------------------

/// One entry of the conversation history.
///
/// Constructed through the role-specific helpers ([`ConversationTurn::user`]
/// etc.) so each turn carries exactly the fields its role requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,

    /// Text content.  `None` on assistant turns that only request tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool invocations requested by an assistant turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Correlation token of the tool call this turn answers (tool role only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Name of the invoked tool (tool role only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConversationTurn {
    /// The per-call system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// A user utterance.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// A final (plain-text) assistant answer.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// An assistant turn that requests tool invocations.
    ///
    /// `content` is usually `None`; some models attach text alongside the
    /// calls, which must be preserved when echoing the turn back.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        }
    }

    /// The result of one tool invocation, correlated by `tool_call_id`.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    /// Returns `true` when this assistant turn requests at least one tool.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_serializes_minimal() {
        let turn = ConversationTurn::user("이 문서 내용 요약해줘");
        let json = serde_json::to_value(&turn).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "이 문서 내용 요약해줘");
        // Absent fields must be skipped entirely, not serialized as null.
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
        assert!(json.get("name").is_none());
    }

    #[test]
    fn tool_result_carries_correlation_token() {
        let turn = ConversationTurn::tool_result("call_abc", "analyze_document", "{}");
        let json = serde_json::to_value(&turn).unwrap();

        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_abc");
        assert_eq!(json["name"], "analyze_document");
    }

    #[test]
    fn assistant_tool_call_turn_round_trips() {
        let call = ToolCall {
            id: "call_1".into(),
            kind: "function".into(),
            function: ToolFunction {
                name: "analyze_document".into(),
                arguments: "{}".into(),
            },
        };
        let turn = ConversationTurn::assistant_tool_calls(None, vec![call]);
        assert!(turn.has_tool_calls());

        let json = serde_json::to_string(&turn).unwrap();
        let back: ConversationTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turn);
        assert_eq!(
            serde_json::to_value(&back).unwrap()["tool_calls"][0]["type"],
            "function"
        );
    }

    #[test]
    fn plain_assistant_turn_has_no_tool_calls() {
        let turn = ConversationTurn::assistant("요약 결과입니다.");
        assert!(!turn.has_tool_calls());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
        assert_eq!(serde_json::to_value(Role::Tool).unwrap(), "tool");
    }
}
