//! Pipeline orchestration for the voice journal.
//!
//! This module wires capture → transcription → classification → comment →
//! store and exposes the shared state observers read.
//!
//! # Architecture
//!
//! ```text
//! PipelineOrchestrator::start()          ← caller (UI / CLI)
//!        │
//!        ├─ Recorder::start (mic permission)      → Recording
//!        │
//! PipelineOrchestrator::stop()
//!        │
//!        ├─ Recorder::stop → Clip                 → Transcribing
//!        └─ analysis task (tokio::spawn)
//!              ├─ Transcriber::transcribe (timeout)
//!              ├─ RecordStore::append_provisional  → Classifying
//!              ├─ EmotionClassifier::classify      → CommentPending
//!              └─ CommentGenerator::generate       → Done
//!
//! SharedState (Arc<Mutex<PipelineSnapshot>>) ←── read by observers
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_journal::emotion::EmotionClassifier;
//! use voice_journal::pipeline::{new_shared_state, PipelineOrchestrator};
//! use voice_journal::store::RecordStore;
//!
//! # use voice_journal::audio::Recorder;
//! # use voice_journal::comment::CommentGenerator;
//! # use voice_journal::stt::Transcriber;
//! # fn make_recorder() -> Arc<dyn Recorder> { unimplemented!() }
//! # fn make_transcriber() -> Arc<dyn Transcriber> { unimplemented!() }
//! # fn make_generator() -> Arc<dyn CommentGenerator> { unimplemented!() }
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(
//!         RecordStore::open("records.json".into(), "clips".into()).unwrap(),
//!     );
//!     let orchestrator = PipelineOrchestrator::new(
//!         new_shared_state(),
//!         make_recorder(),
//!         make_transcriber(),
//!         make_generator(),
//!         Arc::new(EmotionClassifier::new()),
//!         store,
//!     );
//!
//!     orchestrator.start().await.unwrap();
//!     // … speak …
//!     orchestrator.stop().unwrap();
//!     orchestrator.await_analysis().await;
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{PipelineError, PipelineOrchestrator};
pub use state::{new_shared_state, PipelineSnapshot, SessionState, SharedState};
