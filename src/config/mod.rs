//! Configuration module for the document assistant.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each remote
//! service, `AppPaths` for cross-platform data directories, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, ChatConfig, DocIntConfig, SpeechConfig};
