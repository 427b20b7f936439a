//! Blocking speech-to-text engine.
//!
//! # Overview
//!
//! [`SpeechEngine`] is the low-level, blocking decode interface.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn SpeechEngine>` and shared by both transcriber strategies.
//!
//! [`WhisperSpeechEngine`] is the production implementation that wraps a
//! `whisper_rs::WhisperContext`.  Construct it with
//! [`WhisperSpeechEngine::load`].
//!
//! [`MockSpeechEngine`] (available under `#[cfg(test)]`) is a
//! zero-dependency stub that returns a pre-configured response — useful for
//! unit-testing the pipeline without a real GGML model file.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the speech-to-text subsystem.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// The GGML model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a context or state.
    #[error("Speech engine initialisation failed: {0}")]
    ContextInit(String),

    /// An error occurred during the decode pass.
    #[error("Transcription error: {0}")]
    Decode(String),

    /// The clip file could not be read back for decoding.
    #[error("Could not read clip: {0}")]
    ClipRead(String),

    /// The decode did not finish within the configured timeout; the task
    /// was abandoned.
    #[error("Transcription timed out")]
    Timeout,
}

// ---------------------------------------------------------------------------
// SamplingStrategy / DecodeParams
// ---------------------------------------------------------------------------

/// Mirrors `whisper_rs::SamplingStrategy` but is owned and `Clone`.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    /// Greedy (single-pass) decoding — lowest latency.
    Greedy { best_of: i32 },
    /// Beam-search decoding — slightly better accuracy, 2-4× slower.
    BeamSearch { beam_size: i32, patience: f32 },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Greedy { best_of: 1 }
    }
}

/// All parameters for a single decode run.
#[derive(Debug, Clone)]
pub struct DecodeParams {
    /// ISO-639-1 language code (e.g. `"ja"`, `"en"`), or `"auto"` to let
    /// Whisper detect the language automatically.
    pub language: String,

    /// Decoding strategy.
    pub strategy: SamplingStrategy,

    /// Number of CPU threads handed to Whisper.  Defaults to
    /// [`optimal_threads()`], capped at 8.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            language: "ja".into(),
            strategy: SamplingStrategy::default(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

/// Returns the number of CPU threads to use for inference, capped at 8 to
/// avoid diminishing returns on Whisper.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// SpeechEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe blocking decode interface.
///
/// # Contract
///
/// - `audio` must be **16 kHz, mono, f32** PCM samples.
/// - An empty input decodes to an empty string — "inaudible" is a *valid*
///   success value, distinct from failure.
pub trait SpeechEngine: Send + Sync {
    /// Decode `audio` and return the transcript text.
    fn decode(&self, audio: &[f32]) -> Result<String, SttError>;

    /// Whether the engine is ready to decode.  The transcriber caches this
    /// as its one-time authorization answer.
    fn is_ready(&self) -> bool {
        true
    }
}

// Compile-time assertion: Box<dyn SpeechEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechEngine>) {}
};

// ---------------------------------------------------------------------------
// WhisperSpeechEngine
// ---------------------------------------------------------------------------

/// Production engine that wraps a `whisper_rs::WhisperContext`.
///
/// A new `WhisperState` is created for every [`decode`] call so the engine
/// can be shared across threads without any locking.
///
/// [`decode`]: SpeechEngine::decode
pub struct WhisperSpeechEngine {
    ctx: WhisperContext,
    params: DecodeParams,
}

impl std::fmt::Debug for WhisperSpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperSpeechEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` and `unsafe impl Sync` in whisper-rs — the model
// weights are read-only after loading.  `DecodeParams` is fully owned and
// trivially Send+Sync.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperSpeechEngine {}
unsafe impl Sync for WhisperSpeechEngine {}

impl WhisperSpeechEngine {
    /// Load a GGML model from `model_path` and prepare it for inference.
    ///
    /// # Errors
    ///
    /// - [`SttError::ModelNotFound`] — `model_path` does not exist.
    /// - [`SttError::ContextInit`]  — whisper-rs failed to load the file.
    pub fn load(model_path: impl AsRef<Path>, params: DecodeParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx_params = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        Ok(Self { ctx, params })
    }
}

impl SpeechEngine for WhisperSpeechEngine {
    fn decode(&self, audio: &[f32]) -> Result<String, SttError> {
        // An inaudible/empty capture is a valid empty transcript, not an
        // error — the pipeline's empty-transcript policy handles it.
        if audio.is_empty() {
            return Ok(String::new());
        }

        use whisper_rs::SamplingStrategy as WS;
        let ws = match self.params.strategy {
            SamplingStrategy::Greedy { best_of } => WS::Greedy { best_of },
            SamplingStrategy::BeamSearch { beam_size, patience } => {
                WS::BeamSearch { beam_size, patience }
            }
        };

        let mut fp = FullParams::new(ws);

        let lang: Option<&str> = if self.params.language == "auto" {
            None
        } else {
            Some(self.params.language.as_str())
        };
        fp.set_language(lang);
        fp.set_n_threads(self.params.n_threads);

        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        state
            .full(fp, audio)
            .map_err(|e| SttError::Decode(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Decode(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let seg_text = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Decode(format!("segment {i}: {e}")))?;
            text.push_str(&seg_text);
        }

        Ok(text.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// MockSpeechEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without loading any
/// model file.
#[cfg(test)]
pub struct MockSpeechEngine {
    response: Result<String, SttError>,
    ready: bool,
    delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl MockSpeechEngine {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            ready: true,
            delay: None,
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            ready: true,
            delay: None,
        }
    }

    /// Create a mock that reports itself unavailable (authorization denied).
    pub fn unavailable() -> Self {
        Self {
            response: Ok(String::new()),
            ready: false,
            delay: None,
        }
    }

    /// Sleep this long inside `decode` before answering — used to exercise
    /// the transcriber timeout.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[cfg(test)]
impl SpeechEngine for MockSpeechEngine {
    fn decode(&self, _audio: &[f32]) -> Result<String, SttError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.response.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- MockSpeechEngine ---

    #[test]
    fn mock_ok_returns_configured_text() {
        let engine = MockSpeechEngine::ok("こんにちは");
        assert_eq!(engine.decode(&[0.0; 160]).unwrap(), "こんにちは");
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let engine = MockSpeechEngine::err(SttError::Decode("boom".into()));
        let err = engine.decode(&[0.0; 160]).unwrap_err();
        assert!(matches!(err, SttError::Decode(_)));
    }

    #[test]
    fn mock_unavailable_reports_not_ready() {
        let engine = MockSpeechEngine::unavailable();
        assert!(!engine.is_ready());
    }

    // --- WhisperSpeechEngine::load missing path ---

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let params = DecodeParams::default();
        let result = WhisperSpeechEngine::load("/nonexistent/model.bin", params);
        assert!(
            matches!(result, Err(SttError::ModelNotFound(_))),
            "expected ModelNotFound, got an unexpected variant"
        );
    }

    // --- SpeechEngine object safety ---

    #[test]
    fn box_dyn_speech_engine_compiles() {
        // If this test compiles, the trait is object-safe.
        let engine: Box<dyn SpeechEngine> = Box::new(MockSpeechEngine::ok("ok"));
        let _ = engine.decode(&[0.0; 160]);
    }

    // --- SttError display ---

    #[test]
    fn stt_error_display_model_not_found() {
        let e = SttError::ModelNotFound("/some/path.bin".into());
        assert!(e.to_string().contains("/some/path.bin"));
    }

    #[test]
    fn stt_error_display_timeout() {
        let e = SttError::Timeout;
        assert!(e.to_string().contains("timed out"));
    }

    // --- optimal_threads sanity check ---

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!(t >= 1 && t <= 8);
    }
}
