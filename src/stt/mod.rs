//! Speech-to-text — blocking engine plus async transcriber strategies.
//!
//! [`SpeechEngine`] is the low-level blocking decode seam (whisper in
//! production, a stub in tests).  [`Transcriber`] is what the pipeline
//! consumes: an awaitable, cancellable, time-bounded operation with a
//! cached authorization check.  [`FileTranscriber`] (one-shot) and
//! [`LiveTranscriber`] (streaming, partials discarded) are interchangeable
//! strategies behind the same contract.

pub mod engine;
pub mod transcriber;

pub use engine::{DecodeParams, SamplingStrategy, SpeechEngine, SttError, WhisperSpeechEngine};
pub use transcriber::{FileTranscriber, LiveTranscriber, Transcriber};

#[cfg(test)]
pub use engine::MockSpeechEngine;
#[cfg(test)]
pub use transcriber::MockTranscriber;
