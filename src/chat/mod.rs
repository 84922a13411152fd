//! Chat-model module for the document assistant.
//!
//! This module provides:
//! * [`ChatModel`] — async trait implemented by all chat backends.
//! * [`ApiChatModel`] — OpenAI-compatible REST API backend.
//! * [`AssistantReply`] — parsed model output (answer and/or tool calls).
//! * [`ConversationTurn`] / [`Role`] / [`ToolCall`] — history entries in
//!   chat-completion wire shape.
//! * [`tools`] — the `analyze_document` schema and system instruction.
//! * [`ChatError`] — error variants for chat operations.

pub mod client;
pub mod message;
pub mod tools;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiChatModel, AssistantReply, ChatError, ChatModel};
pub use message::{ConversationTurn, Role, ToolCall, ToolFunction};
pub use tools::{tool_schemas, ANALYZE_DOCUMENT, SYSTEM_PROMPT};
