//! Dialogue orchestrator — drives one user-utterance-to-answer turn.
//!
//! [`Orchestrator`] holds the four remote adapters behind trait objects and
//! exposes [`process_interaction`](Orchestrator::process_interaction), the
//! single entry point the session surface calls per turn.
//!
//! # Turn flow
//!
//! ```text
//! TurnInput {audio?, image?, transcript?}
//!   └─▶ resolve utterance (precomputed transcript, else STT, else no-op)
//!   └─▶ mirror-correct the captured frame            [ImageTrail]
//!   └─▶ chat model, tools offered
//!         ├─ direct answer ──────────────────────────▶ finalize
//!         └─ tool calls → analyze_document → render
//!              └─▶ chat model again, no tools ───────▶ finalize
//!   └─▶ finalize: append answer, best-effort TTS, return TurnOutcome
//! ```
//!
//! All adapter failures degrade locally (sentinel, error payload, missing
//! audio, passthrough image); a chat failure is recorded as an
//! assistant-authored error turn.  A turn never panics the session.

pub mod images;
pub mod turn;

use std::path::PathBuf;
use std::sync::Arc;

use crate::chat::ChatModel;
use crate::docint::DocumentAnalyzer;
use crate::speech::{SpeechToText, TextToSpeech};

pub use images::{ImageStage, ImageTrail};
pub use turn::{TurnInput, TurnOutcome};

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives the complete voice → analysis → answer turn.
///
/// One orchestrator serves one session; independent sessions own
/// independent instances and never share mutable state.  The adapters are
/// `Arc<dyn …>` seams so tests run the full turn against in-process mocks.
pub struct Orchestrator {
    pub(crate) stt: Arc<dyn SpeechToText>,
    pub(crate) tts: Arc<dyn TextToSpeech>,
    pub(crate) analyzer: Arc<dyn DocumentAnalyzer>,
    pub(crate) chat: Arc<dyn ChatModel>,
    /// Directory where annotated result images are written.
    pub(crate) image_out_dir: PathBuf,
}

impl Orchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `stt`           — speech-to-text adapter.
    /// * `tts`           — text-to-speech adapter.
    /// * `analyzer`      — document layout-analysis adapter.
    /// * `chat`          — tool-calling chat model.
    /// * `image_out_dir` — where annotated images are written.
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        tts: Arc<dyn TextToSpeech>,
        analyzer: Arc<dyn DocumentAnalyzer>,
        chat: Arc<dyn ChatModel>,
        image_out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stt,
            tts,
            analyzer,
            chat,
            image_out_dir: image_out_dir.into(),
        }
    }
}
