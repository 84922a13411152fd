//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\doc-assistant\
//!   macOS:   ~/Library/Application Support/doc-assistant/
//!   Linux:   ~/.config/doc-assistant/
//!
//! Data dir (synthesized audio clips, annotated images):
//!   Windows: %LOCALAPPDATA%\doc-assistant\
//!   macOS:   ~/Library/Application Support/doc-assistant/
//!   Linux:   ~/.local/share/doc-assistant/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory where synthesized TTS clips are written.
    pub audio_dir: PathBuf,
    /// Directory where annotated result images are written.
    pub image_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "doc-assistant";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let audio_dir = data_dir.join("audio");
        let image_dir = data_dir.join("images");

        Self {
            config_dir,
            settings_file,
            audio_dir,
            image_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
