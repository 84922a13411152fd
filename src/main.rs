//! Application entry point — interactive document-assistant session.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run) and
//!    overlay environment variables.
//! 3. Build the four remote adapters and the [`Orchestrator`].
//! 4. Run a line-oriented session loop on stdin.
//!
//! # Session commands
//!
//! ```text
//! :image <path>   set the captured frame for the next turns
//! :audio <path>   set the voice clip and show its live transcript
//! :send           submit the pending voice clip (transcription runs in the turn)
//! :reset          clear the conversation history
//! :quit           exit
//! <anything else> a typed utterance (used as the precomputed transcript)
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use doc_assistant::chat::{ApiChatModel, ChatModel, Role};
use doc_assistant::config::{AppConfig, AppPaths};
use doc_assistant::docint::{ApiDocumentAnalyzer, DocumentAnalyzer};
use doc_assistant::orchestrator::{Orchestrator, TurnInput};
use doc_assistant::speech::{
    recognize_or_sentinel, ApiSpeechToText, ApiTextToSpeech, SpeechToText, TextToSpeech,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("document assistant starting up");

    // 2. Configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env_overrides();

    if config.chat.base_url.is_empty() {
        log::warn!("chat.base_url is not configured — model calls will fail");
    }

    let paths = AppPaths::new();

    // 3. Adapters + orchestrator
    let stt: Arc<dyn SpeechToText> = Arc::new(ApiSpeechToText::from_config(&config.speech));
    let tts: Arc<dyn TextToSpeech> =
        Arc::new(ApiTextToSpeech::from_config(&config.speech, &paths.audio_dir));
    let analyzer: Arc<dyn DocumentAnalyzer> =
        Arc::new(ApiDocumentAnalyzer::from_config(&config.document));
    let chat: Arc<dyn ChatModel> = Arc::new(ApiChatModel::from_config(&config.chat));

    let orchestrator = Orchestrator::new(Arc::clone(&stt), tts, analyzer, chat, &paths.image_dir);

    // 4. Session loop
    run_session(&orchestrator, stt).await
}

/// Line-oriented session loop: owns the history and the active capture
/// state, one turn at a time.
///
/// Setting an audio clip transcribes it immediately so the user sees what
/// was understood before submitting; `:send` submits the clip without a
/// precomputed transcript, routing the turn through the STT adapter.
async fn run_session(orchestrator: &Orchestrator, stt: Arc<dyn SpeechToText>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    let mut history = Vec::new();
    let mut image: Option<PathBuf> = None;
    let mut audio: Option<PathBuf> = None;

    println!("문서를 카메라에 비추고 질문하세요. (예: '이 문서 내용 요약해줘')");
    println!("commands: :image <path>, :audio <path>, :send, :reset, :quit");

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(":image ") {
            image = Some(PathBuf::from(rest.trim()));
            println!("image set: {}", rest.trim());
            continue;
        }
        if let Some(rest) = line.strip_prefix(":audio ") {
            let path = PathBuf::from(rest.trim());
            // Live feedback: show what was understood before submission.
            let preview = recognize_or_sentinel(stt.as_ref(), Some(&path)).await;
            println!("transcript: {preview}");
            audio = Some(path);
            continue;
        }
        match line {
            ":reset" => {
                history.clear();
                println!("history cleared");
                continue;
            }
            ":quit" | ":q" => break,
            _ => {}
        }

        let input = if line == ":send" {
            if audio.is_none() {
                println!("no audio set");
                continue;
            }
            TurnInput {
                audio: audio.take(),
                image: image.clone(),
                transcript: None,
            }
        } else {
            TurnInput {
                audio: audio.take(),
                image: image.clone(),
                transcript: Some(line.to_string()),
            }
        };

        let outcome = orchestrator.process_interaction(input, history).await;
        history = outcome.history;

        if let Some(answer) = history
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant && t.content.is_some())
            .and_then(|t| t.content.as_deref())
        {
            println!("assistant: {answer}");
        }
        if let Some(path) = &outcome.image {
            println!("image: {}", path.display());
        }
        if let Some(path) = &outcome.audio {
            println!("audio: {}", path.display());
        }
    }

    log::info!("session ended ({} turns in history)", history.len());
    Ok(())
}
