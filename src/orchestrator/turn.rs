//! One conversation turn, from utterance resolution to the spoken answer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::chat::{tool_schemas, ChatError, ConversationTurn, ToolCall, ANALYZE_DOCUMENT, SYSTEM_PROMPT};
use crate::imaging;
use crate::speech::{recognize_or_sentinel, STT_FAILURE_SENTINEL};

use super::images::{ImageStage, ImageTrail};
use super::Orchestrator;

// ---------------------------------------------------------------------------
// TurnInput / TurnOutcome
// ---------------------------------------------------------------------------

/// Everything the session surface captured for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    /// Recorded voice clip, if any.
    pub audio: Option<PathBuf>,
    /// Captured camera frame, if any.
    pub image: Option<PathBuf>,
    /// Transcript already produced by the live-feedback STT pass, if any.
    pub transcript: Option<String>,
}

/// Result of one turn, handed back to the session surface.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Updated conversation history (unchanged when the turn was a no-op).
    pub history: Vec<ConversationTurn>,
    /// Synthesized answer clip; `None` when TTS failed or no answer exists.
    pub audio: Option<PathBuf>,
    /// Latest image variant to display (annotated when analysis ran).
    pub image: Option<PathBuf>,
    /// The resolved utterance; empty when the turn was a no-op.
    pub transcript: String,
}

// ---------------------------------------------------------------------------
// Turn processing
// ---------------------------------------------------------------------------

impl Orchestrator {
    /// Run one complete turn.
    ///
    /// When neither audio nor a usable transcript is given, the turn is a
    /// no-op: the history comes back unchanged and no remote call is made.
    /// Every other failure degrades per subsystem; the returned outcome is
    /// always usable.
    pub async fn process_interaction(
        &self,
        input: TurnInput,
        mut history: Vec<ConversationTurn>,
    ) -> TurnOutcome {
        let mut trail = ImageTrail::new(input.image.clone());

        // ── 1. Resolve the utterance ─────────────────────────────────────
        let utterance = match self.resolve_utterance(&input).await {
            Some(text) => text,
            None => {
                log::debug!("turn: no audio and no transcript, skipping");
                return TurnOutcome {
                    history,
                    audio: None,
                    image: trail.into_latest(),
                    transcript: String::new(),
                };
            }
        };
        log::info!("turn: utterance = {utterance:?}");

        // ── 2. Mirror-correct the captured frame ─────────────────────────
        if let Some(original) = trail.latest().map(Path::to_path_buf) {
            match imaging::mirror(&original) {
                Ok(flipped) => trail.push(ImageStage::Mirrored, flipped),
                Err(e) => {
                    // Non-fatal: keep working with the unflipped frame.
                    log::warn!("turn: mirror correction failed ({e}), keeping original frame");
                }
            }
        }

        history.push(ConversationTurn::user(utterance.clone()));

        // ── 3-5. Model consultation (with optional tool dispatch) ────────
        let answer = match self.consult_model(&mut history, &mut trail).await {
            Ok(answer) => answer,
            Err(e) => {
                // Recorded in the history so the conversation stays
                // consistent and inspectable; the turn still completes.
                log::error!("turn: model consultation failed: {e}");
                history.push(ConversationTurn::assistant(format!("Error: {e}")));
                return TurnOutcome {
                    history,
                    audio: None,
                    image: trail.into_latest(),
                    transcript: utterance,
                };
            }
        };

        // ── 6. Best-effort speech synthesis ──────────────────────────────
        let audio = match self.tts.synthesize(&answer).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("turn: speech synthesis failed ({e}), answering without audio");
                None
            }
        };

        if let Some(stage) = trail.latest_stage() {
            log::debug!("turn: displaying the {stage:?} image variant");
        }

        TurnOutcome {
            history,
            audio,
            image: trail.into_latest(),
            transcript: utterance,
        }
    }

    /// Resolve the user's utterance for this turn.
    ///
    /// A non-empty precomputed transcript that is not the failure sentinel
    /// wins; otherwise the audio clip is transcribed (failure → sentinel,
    /// which still reaches the model as a visible marker).  `None` means
    /// there is nothing to process at all.
    async fn resolve_utterance(&self, input: &TurnInput) -> Option<String> {
        match input.transcript.as_deref() {
            Some(t) if !t.trim().is_empty() && t != STT_FAILURE_SENTINEL => Some(t.to_string()),
            _ => {
                let audio = input.audio.as_deref()?;
                Some(recognize_or_sentinel(self.stt.as_ref(), Some(audio)).await)
            }
        }
    }

    /// First model call, optional tool dispatch, optional follow-up call.
    ///
    /// Appends the assistant tool-call turn, one tool-result turn per call,
    /// and the final answer turn to `history`.  Returns the answer text.
    async fn consult_model(
        &self,
        history: &mut Vec<ConversationTurn>,
        trail: &mut ImageTrail,
    ) -> Result<String, ChatError> {
        let tools = tool_schemas();
        let reply = self
            .chat
            .complete(&with_system(history), Some(tools.as_slice()))
            .await?;

        let answer = if reply.has_tool_calls() {
            let tool_calls = reply.tool_calls.clone();
            // The tool-call turn must echo back verbatim on the next call.
            history.push(reply.into_turn());

            // Every correlation token must be answered exactly once before
            // the follow-up call.
            let mut pending: HashSet<String> =
                tool_calls.iter().map(|c| c.id.clone()).collect();

            for call in &tool_calls {
                let payload = self.dispatch_tool(call, trail).await;
                pending.remove(&call.id);
                history.push(ConversationTurn::tool_result(
                    &call.id,
                    &call.function.name,
                    payload,
                ));
            }

            if let Some(id) = pending.into_iter().next() {
                return Err(ChatError::UnansweredToolCall(id));
            }

            // Follow-up call: no tools offered, the model must answer now.
            let follow_up = self.chat.complete(&with_system(history), None).await?;
            follow_up.content.unwrap_or_default()
        } else {
            reply.content.unwrap_or_default()
        };

        history.push(ConversationTurn::assistant(answer.clone()));
        Ok(answer)
    }

    /// Execute one tool call and return its JSON result payload.
    ///
    /// Never fails: analysis errors become an empty extracted text, a
    /// missing image or unknown tool becomes an error payload, so the
    /// correlation invariant always holds.
    async fn dispatch_tool(&self, call: &ToolCall, trail: &mut ImageTrail) -> String {
        if call.function.name != ANALYZE_DOCUMENT {
            log::warn!("turn: model requested unknown tool {:?}", call.function.name);
            return serde_json::json!({
                "error": format!("Unknown tool '{}'.", call.function.name)
            })
            .to_string();
        }

        let Some(image) = trail.latest().map(Path::to_path_buf) else {
            log::warn!("turn: analyze_document requested but no image was captured");
            return serde_json::json!({ "error": "No image available to analyze." }).to_string();
        };

        let analysis = match self.analyzer.analyze(&image).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                log::warn!("turn: document analysis failed: {e}");
                None
            }
        };

        // Visual confirmation for the surface; passthrough on failure.
        let rendered = imaging::render(&image, analysis.as_ref(), &self.image_out_dir);
        if rendered != image {
            trail.push(ImageStage::Annotated, rendered);
        }

        let content = analysis.map(|a| a.full_text).unwrap_or_default();
        serde_json::json!({ "content": content }).to_string()
    }
}

/// Prepend the fixed system instruction to the history for one model call.
///
/// The system turn is never stored in the session history itself.
fn with_system(history: &[ConversationTurn]) -> Vec<ConversationTurn> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ConversationTurn::system(SYSTEM_PROMPT));
    messages.extend_from_slice(history);
    messages
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
