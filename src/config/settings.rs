//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Endpoints and keys can also be supplied through environment variables
//! (the deployment convention of the hosted services); see
//! [`AppConfig::apply_env_overrides`].

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech services (STT + TTS share one subscription key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Full URL of the speech-to-text recognition endpoint.
    pub stt_endpoint: String,
    /// Full URL of the text-to-speech synthesis endpoint.
    pub tts_endpoint: String,
    /// Subscription key sent as `Ocp-Apim-Subscription-Key` on both calls.
    pub api_key: String,
    /// Synthesis voice name (e.g. `"ko-KR-InJoonNeural"`).
    pub voice_name: String,
    /// Voice language tag used in the SSML envelope (e.g. `"ko-KR"`).
    pub voice_language: String,
    /// Requested audio output format header value.
    pub output_format: String,
    /// Maximum seconds to wait for either speech call.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            stt_endpoint: String::new(),
            tts_endpoint: String::new(),
            api_key: String::new(),
            voice_name: "ko-KR-InJoonNeural".into(),
            voice_language: "ko-KR".into(),
            output_format: "audio-16khz-128kbitrate-mono-mp3".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// DocIntConfig
// ---------------------------------------------------------------------------

/// Settings for the document layout-analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocIntConfig {
    /// Full URL of the analysis submission endpoint.
    pub endpoint: String,
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`.
    pub api_key: String,
    /// Interval between job polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of polls before the job is abandoned as timed out.
    pub max_polls: u32,
    /// Maximum seconds to wait for any single HTTP request.
    pub timeout_secs: u64,
}

impl Default for DocIntConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            poll_interval_ms: 1_000,
            max_polls: 60,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatConfig
// ---------------------------------------------------------------------------

/// Settings for the tool-calling chat model.
///
/// Targets any OpenAI-compatible `/v1/chat/completions` endpoint; all
/// connection details come from this struct, nothing is hardcoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Base URL of the API endpoint (e.g. `"https://api.openai.com"`).
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a chat response before timing out.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use doc_assistant::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let mut config = AppConfig::load().unwrap();
/// config.apply_env_overrides();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech services (STT + TTS).
    pub speech: SpeechConfig,
    /// Document layout-analysis service.
    pub document: DocIntConfig,
    /// Tool-calling chat model.
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay endpoint/key settings from environment variables.
    ///
    /// Variable names follow the deployment convention of the hosted
    /// services; a variable that is unset or empty leaves the corresponding
    /// field untouched:
    ///
    /// | Variable                          | Field                    |
    /// |-----------------------------------|--------------------------|
    /// | `STT_KR_ENDPOINT`                 | `speech.stt_endpoint`    |
    /// | `TTS_KR_ENDPOINT`                 | `speech.tts_endpoint`    |
    /// | `SPEECH_STUDIO_API_KEY`           | `speech.api_key`         |
    /// | `DOCUMENT_INTELLIGENCE_ENDPOINT`  | `document.endpoint`      |
    /// | `DOCUMENT_INTELLIGENCE_API_KEY`   | `document.api_key`       |
    /// | `AZURE_OPENAI_ENDPOINT`           | `chat.base_url`          |
    /// | `AZURE_OPENAI_API_KEY`            | `chat.api_key`           |
    pub fn apply_env_overrides(&mut self) {
        fn non_empty(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        if let Some(v) = non_empty("STT_KR_ENDPOINT") {
            self.speech.stt_endpoint = v;
        }
        if let Some(v) = non_empty("TTS_KR_ENDPOINT") {
            self.speech.tts_endpoint = v;
        }
        if let Some(v) = non_empty("SPEECH_STUDIO_API_KEY") {
            self.speech.api_key = v;
        }
        if let Some(v) = non_empty("DOCUMENT_INTELLIGENCE_ENDPOINT") {
            self.document.endpoint = v;
        }
        if let Some(v) = non_empty("DOCUMENT_INTELLIGENCE_API_KEY") {
            self.document.api_key = v;
        }
        if let Some(v) = non_empty("AZURE_OPENAI_ENDPOINT") {
            self.chat.base_url = v;
        }
        if let Some(v) = non_empty("AZURE_OPENAI_API_KEY") {
            self.chat.api_key = Some(v);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    /// Verify the documented default values.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.speech.stt_endpoint.is_empty());
        assert_eq!(cfg.speech.voice_name, "ko-KR-InJoonNeural");
        assert_eq!(cfg.speech.voice_language, "ko-KR");
        assert_eq!(cfg.speech.output_format, "audio-16khz-128kbitrate-mono-mp3");
        assert_eq!(cfg.document.poll_interval_ms, 1_000);
        assert_eq!(cfg.document.max_polls, 60);
        assert_eq!(cfg.chat.model, "gpt-4o-mini");
        assert!(cfg.chat.api_key.is_none());
        assert_eq!(cfg.chat.timeout_secs, 60);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.speech.stt_endpoint = "https://koreacentral.stt.example/recognize".into();
        cfg.speech.api_key = "speech-key".into();
        cfg.document.endpoint = "https://docint.example/analyze".into();
        cfg.document.max_polls = 10;
        cfg.chat.base_url = "https://api.openai.com".into();
        cfg.chat.api_key = Some("sk-test".into());
        cfg.chat.timeout_secs = 30;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    /// Env overrides must replace only the fields whose variables are set.
    #[test]
    fn env_overrides_replace_set_fields_only() {
        std::env::set_var("STT_KR_ENDPOINT", "https://env.stt.example");
        std::env::set_var("AZURE_OPENAI_API_KEY", "env-chat-key");
        std::env::remove_var("TTS_KR_ENDPOINT");

        let mut cfg = AppConfig::default();
        cfg.speech.tts_endpoint = "https://file.tts.example".into();
        cfg.apply_env_overrides();

        assert_eq!(cfg.speech.stt_endpoint, "https://env.stt.example");
        assert_eq!(cfg.chat.api_key.as_deref(), Some("env-chat-key"));
        // Untouched: no env var set for the TTS endpoint.
        assert_eq!(cfg.speech.tts_endpoint, "https://file.tts.example");

        std::env::remove_var("STT_KR_ENDPOINT");
        std::env::remove_var("AZURE_OPENAI_API_KEY");
    }
}
