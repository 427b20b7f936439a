//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// TranscribeStrategy
// ---------------------------------------------------------------------------

/// Selects how speech is turned into text.
///
/// | Variant  | Behaviour                                             |
/// |----------|-------------------------------------------------------|
/// | OneShot  | Transcribe the finished clip file after recording ends |
/// | Live     | Decode the live sample stream; keep only the final pass |
///
/// Both strategies expose the same [`crate::stt::Transcriber`] contract to
/// the pipeline, so they are freely interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TranscribeStrategy {
    /// Whole-file transcription of the finished clip.
    OneShot,
    /// Streaming transcription concurrent with capture; partial results are
    /// discarded, only the final result is kept.
    Live,
}

impl Default for TranscribeStrategy {
    fn default() -> Self {
        Self::OneShot
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper speech-to-text engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    /// GGML model name / file stem (e.g. `"ggml-small"`).
    pub model: String,
    /// Primary speech language as an ISO-639-1 code, or `"auto"` for
    /// Whisper's built-in language detection.
    pub language: String,
    /// Which transcription strategy the pipeline uses.
    pub strategy: TranscribeStrategy,
    /// Hard per-transcription timeout in seconds; the task is abandoned once
    /// it elapses.
    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "ggml-small".into(),
            language: "ja".into(),
            strategy: TranscribeStrategy::default(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// CommentConfig
// ---------------------------------------------------------------------------

/// Settings for the generative comment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Whether the remote service is called at all.  When `false` every
    /// comment comes from the local fallback pools.
    pub enabled: bool,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"qwen2.5:3b"`, `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
    /// Maximum seconds to wait for a comment before falling back locally.
    pub timeout_secs: u64,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "qwen2.5:3b".into(),
            temperature: 0.7,
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio capture and the live level meter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate of the stored clip in Hz (speech services want 16 000).
    pub sample_rate: u32,
    /// Number of recent level samples kept for the live meter; oldest entries
    /// drop as new ones arrive.
    pub level_history: usize,
    /// Maximum recording length in seconds; recording stops automatically.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            level_history: 40,
            max_recording_secs: 120.0,
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
/// use voice_journal::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio capture settings.
    pub audio: AudioConfig,
    /// Speech-to-text settings.
    pub stt: SttConfig,
    /// Generative comment settings.
    pub comment: CommentConfig,
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
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
