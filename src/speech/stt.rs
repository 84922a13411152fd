//! Core `SpeechToText` trait and `ApiSpeechToText` implementation.
//!
//! The adapter POSTs raw WAV bytes to the configured recognition endpoint
//! and reads the `DisplayText` field of the JSON reply.  [`SpeechError`] is
//! shared with the TTS adapter, which talks to the same speech service.
//!
//! Callers that need a never-failing surface (live transcription feedback
//! before submission) use [`recognize_or_sentinel`], which maps any failure
//! onto the visible [`STT_FAILURE_SENTINEL`] instead of an error.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SpeechConfig;

/// Header carrying the subscription key on every speech request.
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Visible marker for "speech could not be recognized".
///
/// Distinct from the empty string, which means "no audio was given".
/// The orchestrator also checks precomputed transcripts against this value
/// so a failed live transcription is never treated as a real utterance.
pub const STT_FAILURE_SENTINEL: &str = "(음성 인식 실패)";

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors that can occur in the speech subsystem (STT and TTS).
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The audio file could not be read or the clip could not be written.
    #[error("speech I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("speech request timed out")]
    Timeout,

    /// The endpoint answered with a non-success HTTP status.
    #[error("speech endpoint returned status {0}")]
    Status(u16),

    /// The JSON reply is missing an expected field.
    #[error("speech response is missing field {0:?}")]
    MissingField(&'static str),

    /// Synthesis was requested for empty text.
    #[error("no text to synthesize")]
    EmptyText,
}

impl From<reqwest::Error> for SpeechError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechToText trait
// ---------------------------------------------------------------------------

/// Async trait for speech-to-text backends.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn SpeechToText>`).
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the mono WAV clip at `audio` and return the transcript.
    async fn transcribe(&self, audio: &Path) -> Result<String, SpeechError>;
}

// ---------------------------------------------------------------------------
// ApiSpeechToText
// ---------------------------------------------------------------------------

/// Production adapter for the remote recognition endpoint.
pub struct ApiSpeechToText {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl ApiSpeechToText {
    /// Build an `ApiSpeechToText` from application config.
    pub fn from_config(config: &SpeechConfig) -> Self {
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
impl SpeechToText for ApiSpeechToText {
    async fn transcribe(&self, audio: &Path) -> Result<String, SpeechError> {
        let audio_bytes = tokio::fs::read(audio).await?;

        let response = self
            .client
            .post(&self.config.stt_endpoint)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .body(audio_bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status.as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SpeechError::Request(e.to_string()))?;

        json.get("DisplayText")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or(SpeechError::MissingField("DisplayText"))
    }
}

// ---------------------------------------------------------------------------
// recognize_or_sentinel
// ---------------------------------------------------------------------------

/// Resolve an optional audio clip into display text that never fails.
///
/// - No audio              → empty string (no input given).
/// - Transcription error   → [`STT_FAILURE_SENTINEL`].
/// - Empty transcript      → [`STT_FAILURE_SENTINEL`] (nothing recognized).
pub async fn recognize_or_sentinel(stt: &dyn SpeechToText, audio: Option<&Path>) -> String {
    let Some(audio) = audio else {
        return String::new();
    };

    match stt.transcribe(audio).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => STT_FAILURE_SENTINEL.to_string(),
        Err(e) => {
            log::warn!("stt: transcription failed: {e}");
            STT_FAILURE_SENTINEL.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// MockSpeechToText  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network.
#[cfg(test)]
pub struct MockSpeechToText {
    response: Result<String, &'static str>,
}

#[cfg(test)]
impl MockSpeechToText {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    /// Create a mock that always fails with a request error.
    pub fn err(message: &'static str) -> Self {
        Self {
            response: Err(message),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechToText for MockSpeechToText {
    async fn transcribe(&self, _audio: &Path) -> Result<String, SpeechError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(SpeechError::Request((*msg).to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
