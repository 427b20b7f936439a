//! Audio pipeline — microphone capture → downmix/resample → clip file + level meter.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → ingest thread → downmix_to_mono
//!           → resample_to_16k → sample accumulator → WAV clip (stop)
//!                             → chunk_level → RingBuffer (live meter)
//! ```

pub mod buffer;
pub mod capture;
pub mod level;
pub mod resample;

pub use buffer::RingBuffer;
pub use capture::{CaptureError, CaptureStream, CpalRecorder, Recorder, SampleTap};
pub use level::chunk_level;
pub use resample::{downmix_to_mono, resample_to_16k};

#[cfg(test)]
pub use capture::MockRecorder;
