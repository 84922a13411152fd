//! Voice-driven document assistant — library crate.
//!
//! Point a camera at a physical document, ask a spoken question, get a
//! spoken answer.  The crate is a thin orchestration layer over four remote
//! HTTP services:
//!
//! * [`speech`] — speech-to-text and text-to-speech adapters.
//! * [`docint`] — asynchronous document layout analysis (submit + poll).
//! * [`chat`]   — a tool-calling chat model that decides per utterance
//!   whether the document must be analyzed before answering.
//! * [`imaging`] — local mirror correction and best-effort polygon overlay.
//! * [`orchestrator`] — the per-turn state machine tying it all together.
//! * [`config`] — TOML settings with environment-variable overrides.
//!
//! Every adapter sits behind an `Arc<dyn …>` trait so the orchestrator can
//! be exercised end-to-end with in-process mocks.

pub mod chat;
pub mod config;
pub mod docint;
pub mod imaging;
pub mod orchestrator;
pub mod speech;
