//! Tool schema and system instruction offered to the chat model.
//!
//! The assistant exposes exactly one callable capability: `analyze_document`
//! (no arguments).  The model decides per utterance whether the current
//! question needs the document's text before it can answer.

/// Name of the single tool the orchestrator can dispatch.
pub const ANALYZE_DOCUMENT: &str = "analyze_document";

/// Fixed system instruction sent on every first model call of a turn.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for a user \
wearing a camera headset. The user is looking at a physical document. If \
the user asks about the document content, use the 'analyze_document' tool. \
Answer and summarize document content in Korean.";

/// The tool schema list for the first model call of a turn.
///
/// `analyze_document` takes no arguments — the orchestrator always analyzes
/// the currently captured image.
pub fn tool_schemas() -> Vec<serde_json::Value> {
    vec![serde_json::json!({
        "type": "function",
        "function": {
            "name": ANALYZE_DOCUMENT,
            "description": "Analyze the document in the current view/image to extract text and data.",
            "parameters": {
                "type": "object",
                "properties": {},
                "required": []
            }
        }
    })]
}
