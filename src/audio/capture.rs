//! Microphone capture via `cpal`.
//!
//! [`CpalRecorder`] owns the capture session: [`Recorder::start`] arms
//! recording, the cpal callback streams buffers to a dedicated ingest thread
//! (downmix → 16 kHz → sample accumulation + level metering), and
//! [`Recorder::stop`] finalises one WAV file per session and returns a
//! [`Clip`] handle.
//!
//! The underlying `cpal::Stream` is not `Send`, so [`CpalRecorder::open`]
//! returns it separately as a [`CaptureStream`] RAII guard which the caller
//! keeps on its own thread — dropping it stops the hardware stream.

use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AudioConfig;
use crate::store::Clip;

use super::buffer::RingBuffer;
use super::level::chunk_level;
use super::resample::{downmix_to_mono, resample_to_16k};

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No usable input device — missing hardware or the OS denied access to
    /// the microphone.  No clip is produced; the caller surfaces this to the
    /// user.
    #[error("microphone unavailable or access denied")]
    PermissionDenied,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// A session is already active; capture is strictly one-at-a-time.
    #[error("a recording session is already active")]
    AlreadyRecording,

    #[error("capture setup failed: {0}")]
    Setup(String),

    #[error("failed to write clip file: {0}")]
    ClipWrite(String),
}

// ---------------------------------------------------------------------------
// Recorder trait
// ---------------------------------------------------------------------------

/// Object-safe interface to the microphone session.
///
/// Implementations must be `Send + Sync` so the pipeline can hold them behind
/// an `Arc<dyn Recorder>` and call them from any task.
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Begin capturing.  Fails with [`CaptureError::PermissionDenied`] when
    /// the microphone cannot be acquired, in which case no clip is produced.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Finalise the session and return its [`Clip`].
    ///
    /// Calling `stop` while not recording is a no-op returning `None`.
    fn stop(&self) -> Result<Option<Clip>, CaptureError>;

    /// Snapshot of the recent normalised amplitude history (oldest first).
    fn levels(&self) -> Vec<f32>;

    /// Whether a capture session is currently active.
    fn is_recording(&self) -> bool;
}

/// Observer of the live resampled sample stream (e.g. a streaming
/// transcriber's `feed`).  Called from the ingest thread only while
/// recording is active.
pub type SampleTap = Arc<dyn Fn(&[f32]) + Send + Sync>;

// ---------------------------------------------------------------------------
// CaptureStream
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// Dropping this value stops the underlying hardware stream.  It is kept by
/// the caller (not inside [`CpalRecorder`]) because `cpal::Stream` is not
/// `Send` on all platforms.
pub struct CaptureStream {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CpalRecorder
// ---------------------------------------------------------------------------

/// Shared between the ingest thread and the recorder handle.
struct CaptureShared {
    recording: bool,
    samples: Vec<f32>,
    levels: RingBuffer<f32>,
    started_at: chrono::DateTime<Utc>,
}

/// Microphone recorder built on top of `cpal`.
///
/// The hardware stream runs for the lifetime of the [`CaptureStream`]; the
/// `recording` flag decides whether delivered buffers are kept.  One 16 kHz
/// mono WAV file is written to the clips directory per completed session.
///
/// # Example
///
/// ```rust,no_run
/// use voice_journal::audio::{CpalRecorder, Recorder};
/// use voice_journal::config::AudioConfig;
///
/// # async fn example() {
/// let (recorder, _stream) =
///     CpalRecorder::open("/tmp/clips".into(), &AudioConfig::default()).unwrap();
/// recorder.start().await.unwrap();
/// // … speak …
/// let clip = recorder.stop().unwrap();
/// # }
/// ```
pub struct CpalRecorder {
    clips_dir: PathBuf,
    shared: Arc<Mutex<CaptureShared>>,
}

impl CpalRecorder {
    /// Open the default input device and start the ingest thread.
    ///
    /// # Errors
    ///
    /// [`CaptureError::PermissionDenied`] when no input device is available;
    /// stream-setup errors otherwise.
    pub fn open(
        clips_dir: PathBuf,
        config: &AudioConfig,
    ) -> Result<(Self, CaptureStream), CaptureError> {
        Self::open_with_tap(clips_dir, config, None)
    }

    /// Like [`open`](Self::open), but additionally forwards the live
    /// resampled samples to `tap` while recording — used to drive the
    /// streaming transcription strategy.
    pub fn open_with_tap(
        clips_dir: PathBuf,
        config: &AudioConfig,
        tap: Option<SampleTap>,
    ) -> Result<(Self, CaptureStream), CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::PermissionDenied)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let source_rate = supported.sample_rate().0;
        let stream_config: cpal::StreamConfig = supported.into();

        let shared = Arc::new(Mutex::new(CaptureShared {
            recording: false,
            samples: Vec::new(),
            levels: RingBuffer::new(config.level_history.max(1)),
            started_at: Utc::now(),
        }));

        let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>();

        // Ingest thread: downmix → resample → accumulate + meter.  Buffers
        // arriving while not recording are discarded.
        let ingest_shared = Arc::clone(&shared);
        let max_samples = (config.max_recording_secs * 16_000.0) as usize;
        std::thread::Builder::new()
            .name("audio-ingest".into())
            .spawn(move || {
                while let Ok(raw) = chunk_rx.recv() {
                    // Check the flag under a brief lock; do the conversion
                    // work outside it.
                    if !ingest_shared.lock().unwrap().recording {
                        continue;
                    }

                    let mono = downmix_to_mono(&raw, channels);
                    let resampled = resample_to_16k(&mono, source_rate);
                    let level = chunk_level(&resampled);

                    {
                        let mut st = ingest_shared.lock().unwrap();
                        st.levels.push(level);
                        // Stop accumulating past the configured maximum length.
                        let room = max_samples.saturating_sub(st.samples.len());
                        let take = resampled.len().min(room);
                        st.samples.extend_from_slice(&resampled[..take]);
                    }

                    if let Some(tap) = &tap {
                        tap(&resampled);
                    }
                }
            })
            .map_err(|e| CaptureError::Setup(e.to_string()))?;

        // The cpal callback runs on a dedicated audio thread; send errors
        // (receiver dropped) are ignored so it never panics.
        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = chunk_tx.send(data.to_vec());
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;

        Ok((
            Self { clips_dir, shared },
            CaptureStream { _stream: stream },
        ))
    }

    /// Write `samples` (16 kHz mono f32) as a 16-bit PCM WAV file.
    fn write_clip(&self, file_name: &str, samples: &[f32]) -> Result<(), CaptureError> {
        std::fs::create_dir_all(&self.clips_dir)
            .map_err(|e| CaptureError::ClipWrite(e.to_string()))?;

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let path = self.clips_dir.join(file_name);
        let mut writer =
            hound::WavWriter::create(&path, spec).map_err(|e| CaptureError::ClipWrite(e.to_string()))?;

        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(v)
                .map_err(|e| CaptureError::ClipWrite(e.to_string()))?;
        }

        writer
            .finalize()
            .map_err(|e| CaptureError::ClipWrite(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Recorder for CpalRecorder {
    async fn start(&self) -> Result<(), CaptureError> {
        let mut st = self.shared.lock().unwrap();
        if st.recording {
            return Err(CaptureError::AlreadyRecording);
        }

        st.samples.clear();
        st.levels.clear();
        st.started_at = Utc::now();
        st.recording = true;

        log::debug!("capture: recording started");
        Ok(())
    }

    fn stop(&self) -> Result<Option<Clip>, CaptureError> {
        let (samples, started_at) = {
            let mut st = self.shared.lock().unwrap();
            if !st.recording {
                return Ok(None);
            }
            st.recording = false;
            (std::mem::take(&mut st.samples), st.started_at)
        };

        let id = Uuid::new_v4();
        let file_name = format!("{id}.wav");
        self.write_clip(&file_name, &samples)?;

        let duration_secs = samples.len() as f32 / 16_000.0;
        log::info!("capture: clip {file_name} finalised ({duration_secs:.1} s)");

        Ok(Some(Clip {
            id,
            file_name,
            duration_secs,
            created_at: started_at,
        }))
    }

    fn levels(&self) -> Vec<f32> {
        self.shared.lock().unwrap().levels.snapshot()
    }

    fn is_recording(&self) -> bool {
        self.shared.lock().unwrap().recording
    }
}

// ---------------------------------------------------------------------------
// MockRecorder  (test-only)
// ---------------------------------------------------------------------------

/// A test double that yields a pre-configured [`Clip`] without touching any
/// audio hardware.
#[cfg(test)]
pub struct MockRecorder {
    clip: Mutex<Option<Clip>>,
    deny_permission: bool,
    recording: Mutex<bool>,
}

#[cfg(test)]
impl MockRecorder {
    /// Create a mock whose `stop` returns the given clip.
    pub fn with_clip(clip: Clip) -> Self {
        Self {
            clip: Mutex::new(Some(clip)),
            deny_permission: false,
            recording: Mutex::new(false),
        }
    }

    /// Create a mock whose `start` always fails with `PermissionDenied`.
    pub fn denied() -> Self {
        Self {
            clip: Mutex::new(None),
            deny_permission: true,
            recording: Mutex::new(false),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Recorder for MockRecorder {
    async fn start(&self) -> Result<(), CaptureError> {
        if self.deny_permission {
            return Err(CaptureError::PermissionDenied);
        }
        *self.recording.lock().unwrap() = true;
        Ok(())
    }

    fn stop(&self) -> Result<Option<Clip>, CaptureError> {
        let mut rec = self.recording.lock().unwrap();
        if !*rec {
            return Ok(None);
        }
        *rec = false;
        Ok(self.clip.lock().unwrap().take())
    }

    fn levels(&self) -> Vec<f32> {
        vec![0.0; 4]
    }

    fn is_recording(&self) -> bool {
        *self.recording.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
