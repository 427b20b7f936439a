//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-journal\
//!   macOS:   ~/Library/Application Support/voice-journal/
//!   Linux:   ~/.config/voice-journal/
//!
//! Data dir (records + audio clips + models):
//!   Windows: %LOCALAPPDATA%\voice-journal\
//!   macOS:   ~/Library/Application Support/voice-journal/
//!   Linux:   ~/.local/share/voice-journal/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
///
/// Records reference their audio clip by bare file name; the data directory
/// may move between process runs, so references are joined against
/// `clips_dir` at access time rather than stored as absolute paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the serialised record collection.
    pub records_file: PathBuf,
    /// Directory for finished audio clips.
    pub clips_dir: PathBuf,
    /// Directory for downloaded GGML model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-journal";

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
        let records_file = data_dir.join("records.json");
        let clips_dir = data_dir.join("clips");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            records_file,
            clips_dir,
            models_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
