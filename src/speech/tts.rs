//! Core `TextToSpeech` trait and `ApiTextToSpeech` implementation.
//!
//! The adapter wraps the answer text in an SSML envelope for the configured
//! Korean voice profile, POSTs it to the synthesis endpoint, and persists
//! the returned audio bytes to a timestamp-qualified `.mp3` file.  Failures
//! are consumed as absence by the orchestrator — a turn never aborts
//! because synthesis failed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::SpeechConfig;

use super::stt::{SpeechError, SUBSCRIPTION_KEY_HEADER};

// ---------------------------------------------------------------------------
// TextToSpeech trait
// ---------------------------------------------------------------------------

/// Async trait for text-to-speech backends.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn TextToSpeech>`).
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` and return the path of the persisted audio clip.
    async fn synthesize(&self, text: &str) -> Result<PathBuf, SpeechError>;
}

// ---------------------------------------------------------------------------
// SSML envelope
// ---------------------------------------------------------------------------

/// Build the SSML request body for one synthesis call.
///
/// Reserved XML characters in `text` are escaped so a literal `<` or `&` in
/// the answer cannot break the envelope.
pub fn build_ssml(text: &str, language: &str, voice_name: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='{language}'>\
<voice xml:lang='{language}' name='{voice_name}'>{}</voice>\
</speak>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

// ---------------------------------------------------------------------------
// ApiTextToSpeech
// ---------------------------------------------------------------------------

/// Production adapter for the remote synthesis endpoint.
pub struct ApiTextToSpeech {
    client: reqwest::Client,
    config: SpeechConfig,
    output_dir: PathBuf,
}

impl ApiTextToSpeech {
    /// Build an `ApiTextToSpeech` that writes clips into `output_dir`.
    pub fn from_config(config: &SpeechConfig, output_dir: impl Into<PathBuf>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            output_dir: output_dir.into(),
        }
    }

    /// File name for the next clip, unique at second resolution plus a
    /// millisecond suffix so consecutive turns never collide.
    fn clip_name() -> String {
        format!(
            "tts_{}.mp3",
            chrono::Local::now().format("%Y%m%d_%H%M%S%3f")
        )
    }
}

#[async_trait]
impl TextToSpeech for ApiTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<PathBuf, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let body = build_ssml(text, &self.config.voice_language, &self.config.voice_name);

        let response = self
            .client
            .post(&self.config.tts_endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.config.output_format)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.api_key)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Status(status.as_u16()));
        }

        let audio = response.bytes().await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(Self::clip_name());
        tokio::fs::write(&path, &audio).await?;

        log::debug!("tts: wrote {} ({} bytes)", path.display(), audio.len());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// MockTextToSpeech  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network.
#[cfg(test)]
pub struct MockTextToSpeech {
    response: Result<PathBuf, u16>,
}

#[cfg(test)]
impl MockTextToSpeech {
    /// Create a mock that always succeeds with `path`.
    pub fn ok(path: impl Into<PathBuf>) -> Self {
        Self {
            response: Ok(path.into()),
        }
    }

    /// Create a mock that always fails with the given HTTP status.
    pub fn err(status: u16) -> Self {
        Self {
            response: Err(status),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl TextToSpeech for MockTextToSpeech {
    async fn synthesize(&self, _text: &str) -> Result<PathBuf, SpeechError> {
        match &self.response {
            Ok(path) => Ok(path.clone()),
            Err(status) => Err(SpeechError::Status(*status)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpeechConfig;

    #[test]
    fn ssml_carries_voice_and_text() {
        let ssml = build_ssml("안녕하세요", "ko-KR", "ko-KR-InJoonNeural");
        assert!(ssml.contains("xml:lang='ko-KR'"));
        assert!(ssml.contains("name='ko-KR-InJoonNeural'"));
        assert!(ssml.contains("안녕하세요"));
        assert!(ssml.starts_with("<speak"));
        assert!(ssml.ends_with("</speak>"));
    }

    #[test]
    fn ssml_escapes_reserved_characters() {
        let ssml = build_ssml("A < B & C > D", "ko-KR", "voice");
        assert!(ssml.contains("A &lt; B &amp; C &gt; D"));
        assert!(!ssml.contains("A < B"));
    }

    #[test]
    fn escape_leaves_plain_text_untouched() {
        assert_eq!(escape_xml("요약 결과입니다."), "요약 결과입니다.");
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_network() {
        let tts = ApiTextToSpeech::from_config(&SpeechConfig::default(), "/tmp");
        let err = tts.synthesize("  ").await.unwrap_err();
        assert!(matches!(err, SpeechError::EmptyText));
    }

    #[test]
    fn clip_names_are_timestamped() {
        let name = ApiTextToSpeech::clip_name();
        assert!(name.starts_with("tts_"));
        assert!(name.ends_with(".mp3"));
    }

    #[tokio::test]
    async fn mock_err_reports_status() {
        let tts = MockTextToSpeech::err(500);
        let err = tts.synthesize("text").await.unwrap_err();
        assert!(matches!(err, SpeechError::Status(500)));
    }

    #[test]
    fn tts_is_object_safe() {
        let tts: Box<dyn TextToSpeech> =
            Box::new(ApiTextToSpeech::from_config(&SpeechConfig::default(), "."));
        drop(tts);
    }
}
