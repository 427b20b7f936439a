//! Async transcriber strategies over a blocking [`SpeechEngine`].
//!
//! [`Transcriber`] is the contract the pipeline sees: a one-time cached
//! authorization check and a single awaitable, time-bounded `transcribe`
//! call.  Two interchangeable strategies implement it:
//!
//! * [`FileTranscriber`] — one-shot: reads the finished clip file back and
//!   decodes it whole after recording ends.
//! * [`LiveTranscriber`] — streaming: the capture path [`feed`]s samples
//!   while recording; intermediate partial decodes are discarded and only
//!   the final decode at `transcribe` time is kept.
//!
//! Both push the blocking decode onto `tokio::task::spawn_blocking` and wrap
//! it in `tokio::time::timeout`; on expiry the task is abandoned and the
//! call fails with [`SttError::Timeout`].
//!
//! [`feed`]: LiveTranscriber::feed

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::store::Clip;

use super::engine::{SpeechEngine, SttError};

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for clip transcription.
///
/// # Contract
///
/// - [`authorize`](Self::authorize) performs a one-time permission /
///   availability check; the answer is cached for the process lifetime.
/// - [`transcribe`](Self::transcribe) is bounded by a hard timeout and
///   returns [`SttError::Timeout`] once it elapses.
/// - An empty transcript is a **valid** success value meaning
///   "inaudible/unintelligible", distinct from failure.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// One-time cached permission / availability check.
    async fn authorize(&self) -> bool;

    /// Convert the referenced clip into text.
    async fn transcribe(&self, clip: &Clip) -> Result<String, SttError>;
}

// ---------------------------------------------------------------------------
// Shared decode helper
// ---------------------------------------------------------------------------

/// Run one blocking decode on the thread pool, bounded by `timeout`.
async fn decode_with_timeout(
    engine: Arc<dyn SpeechEngine>,
    audio: Vec<f32>,
    timeout: Duration,
) -> Result<String, SttError> {
    let decode = tokio::task::spawn_blocking(move || engine.decode(&audio));

    match tokio::time::timeout(timeout, decode).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(SttError::Decode(join_err.to_string())),
        Err(_elapsed) => {
            log::warn!("stt: decode exceeded {timeout:?}, abandoning task");
            Err(SttError::Timeout)
        }
    }
}

// ---------------------------------------------------------------------------
// FileTranscriber
// ---------------------------------------------------------------------------

/// One-shot, whole-file transcription after recording ends.
///
/// Reads the finished 16 kHz mono WAV from the clips directory and decodes
/// it in a single pass.
pub struct FileTranscriber {
    engine: Arc<dyn SpeechEngine>,
    clips_dir: PathBuf,
    timeout: Duration,
    authorized: OnceCell<bool>,
}

impl FileTranscriber {
    pub fn new(engine: Arc<dyn SpeechEngine>, clips_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            engine,
            clips_dir,
            timeout,
            authorized: OnceCell::new(),
        }
    }

    /// Read a 16-bit PCM WAV back into normalised f32 samples.
    fn read_clip(&self, file_name: &str) -> Result<Vec<f32>, SttError> {
        let path = self.clips_dir.join(file_name);
        let mut reader =
            hound::WavReader::open(&path).map_err(|e| SttError::ClipRead(e.to_string()))?;

        reader
            .samples::<i16>()
            .map(|s| {
                s.map(|v| v as f32 / i16::MAX as f32)
                    .map_err(|e| SttError::ClipRead(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl Transcriber for FileTranscriber {
    async fn authorize(&self) -> bool {
        *self
            .authorized
            .get_or_init(|| async { self.engine.is_ready() })
            .await
    }

    async fn transcribe(&self, clip: &Clip) -> Result<String, SttError> {
        let audio = self.read_clip(&clip.file_name)?;
        log::debug!(
            "stt: one-shot decode of {} ({} samples)",
            clip.file_name,
            audio.len()
        );
        decode_with_timeout(Arc::clone(&self.engine), audio, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// LiveTranscriber
// ---------------------------------------------------------------------------

/// Streaming transcription concurrent with capture.
///
/// The capture path calls [`feed`](Self::feed) with resampled mono samples
/// while recording is active.  [`decode_partial`](Self::decode_partial) may
/// be polled for a provisional transcript; partials are discarded when the
/// final decode runs.  `transcribe` ignores the clip file and decodes the
/// accumulated live buffer.
pub struct LiveTranscriber {
    engine: Arc<dyn SpeechEngine>,
    buffer: Mutex<Vec<f32>>,
    partial: Mutex<Option<String>>,
    timeout: Duration,
    authorized: OnceCell<bool>,
}

impl LiveTranscriber {
    pub fn new(engine: Arc<dyn SpeechEngine>, timeout: Duration) -> Self {
        Self {
            engine,
            buffer: Mutex::new(Vec::new()),
            partial: Mutex::new(None),
            timeout,
            authorized: OnceCell::new(),
        }
    }

    /// Accumulate live samples (16 kHz mono) during capture.
    pub fn feed(&self, samples: &[f32]) {
        self.buffer.lock().unwrap().extend_from_slice(samples);
    }

    /// Decode the buffer accumulated so far and cache it as the current
    /// partial result.  The partial is display-only and never persisted.
    pub async fn decode_partial(&self) -> Result<String, SttError> {
        let audio = self.buffer.lock().unwrap().clone();
        let text = decode_with_timeout(Arc::clone(&self.engine), audio, self.timeout).await?;
        *self.partial.lock().unwrap() = Some(text.clone());
        Ok(text)
    }

    /// The most recent partial decode, if any.
    pub fn partial(&self) -> Option<String> {
        self.partial.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for LiveTranscriber {
    async fn authorize(&self) -> bool {
        *self
            .authorized
            .get_or_init(|| async { self.engine.is_ready() })
            .await
    }

    async fn transcribe(&self, clip: &Clip) -> Result<String, SttError> {
        // The clip parameter identifies the session; the audio itself comes
        // from the live buffer.
        let audio = std::mem::take(&mut *self.buffer.lock().unwrap());
        self.partial.lock().unwrap().take();

        log::debug!(
            "stt: final live decode for {} ({} samples)",
            clip.file_name,
            audio.len()
        );
        decode_with_timeout(Arc::clone(&self.engine), audio, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// A test double answering with a pre-configured transcript or error.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, SttError>,
    authorized: bool,
    delay: Option<Duration>,
}

#[cfg(test)]
impl MockTranscriber {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            authorized: true,
            delay: None,
        }
    }

    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            authorized: true,
            delay: None,
        }
    }

    pub fn denied() -> Self {
        Self {
            response: Ok(String::new()),
            authorized: false,
            delay: None,
        }
    }

    /// Delay the transcription answer — lets tests observe the
    /// `Transcribing` state and exercise cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn authorize(&self) -> bool {
        self.authorized
    }

    async fn transcribe(&self, _clip: &Clip) -> Result<String, SttError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
