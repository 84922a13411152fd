//! Speech module — remote STT and TTS adapters.
//!
//! This module provides:
//! * [`SpeechToText`] / [`ApiSpeechToText`] — transcription of recorded clips.
//! * [`recognize_or_sentinel`] — never-failing transcription for live feedback.
//! * [`TextToSpeech`] / [`ApiTextToSpeech`] — synthesis of spoken answers.
//! * [`STT_FAILURE_SENTINEL`] — visible "could not understand" marker.
//! * [`SpeechError`] — error variants shared by both adapters.

pub mod stt;
pub mod tts;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use stt::{
    recognize_or_sentinel, ApiSpeechToText, SpeechError, SpeechToText, STT_FAILURE_SENTINEL,
};
pub use tts::{build_ssml, ApiTextToSpeech, TextToSpeech};

#[cfg(test)]
pub use stt::MockSpeechToText;
#[cfg(test)]
pub use tts::MockTextToSpeech;
