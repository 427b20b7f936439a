//! Voice Journal — recording-to-enriched-record pipeline.
//!
//! A user records a short speech clip; the pipeline transcribes it, derives a
//! mood score and emotion label from the text, asks a generative-text service
//! for a one-sentence empathetic comment (with a local fallback when the
//! service is unreachable), and persists the enriched record for the history
//! feed, calendar and trend views.
//!
//! # Architecture
//!
//! ```text
//! PipelineOrchestrator::start()
//!   └─▶ Recorder (cpal → mono 16 kHz → WAV clip, live level meter)
//!
//! PipelineOrchestrator::stop()
//!   └─▶ Transcriber (whisper, 30 s timeout)        [Transcribing]
//!         ├─ "" → session aborted, nothing persisted
//!         └─ text → provisional Record appended     [Classifying]
//!               └─▶ EmotionClassifier (keywords → score band)
//!                     └─▶ CommentGenerator (API + fallback) [CommentPending]
//!                           └─▶ Record completed           [Done]
//! ```
//!
//! The [`store::RecordStore`] is the only shared mutable resource; every
//! mutation re-serialises the whole collection to `records.json`.

pub mod audio;
pub mod comment;
pub mod config;
pub mod emotion;
pub mod pipeline;
pub mod store;
pub mod stt;
