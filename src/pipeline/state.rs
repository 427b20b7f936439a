//! Session state machine and shared observer state.
//!
//! [`SessionState`] drives the orchestrator's state machine.  Observers (the
//! UI) read it via [`SharedState`] to render the appropriate view: the live
//! meter while `Recording`, a "processing" indicator from `Transcribing`
//! through `CommentPending`, and the finished record on `Done`.
//!
//! [`PipelineSnapshot`] is the single source of truth published to
//! observers: current session phase, the provisional record in flight, the
//! most-recently completed record, and any user-visible error message.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<PipelineSnapshot>>` —
//! cheap to clone and safe to share across tasks.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// States of one recording session.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──start──▶ Recording ──stop──▶ Transcribing
///   Transcribing ──empty transcript──▶ Aborted   (nothing persisted)
///   Transcribing ──non-empty─────────▶ Classifying   (provisional record)
///   Classifying ──always─────────────▶ CommentPending
///   CommentPending ──resolved────────▶ Done
/// any state ──cancel──▶ Aborted
/// Transcribing ──auth denied / timeout──▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the caller to start a session.
    Idle,

    /// Microphone is active; levels stream to the live meter.
    Recording,

    /// Clip finalised; the transcriber is running under its timeout.
    Transcribing,

    /// Transcript persisted provisionally; classification is running.
    Classifying,

    /// Mood fields final; the comment generator is running.
    CommentPending,

    /// The record is complete and persisted.
    Done,

    /// The session was cancelled, or the transcript was empty.  Nothing of
    /// it remains persisted.
    Aborted,

    /// Authorization was denied or transcription failed/timed out.  Nothing
    /// persisted; the user may retry immediately.
    Failed,
}

impl SessionState {
    /// Returns `true` while a session is in flight.
    ///
    /// The orchestrator rejects a new `start` while this holds — sessions
    /// are never queued.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Recording
                | SessionState::Transcribing
                | SessionState::Classifying
                | SessionState::CommentPending
        )
    }

    /// A short human-readable label suitable for display in a status line.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Recording => "Recording",
            SessionState::Transcribing => "Transcribing",
            SessionState::Classifying => "Classifying",
            SessionState::CommentPending => "Generating comment",
            SessionState::Done => "Done",
            SessionState::Aborted => "Aborted",
            SessionState::Failed => "Failed",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle
    }
}

// ---------------------------------------------------------------------------
// PipelineSnapshot
// ---------------------------------------------------------------------------

/// Observer-facing pipeline state.
///
/// Held behind [`SharedState`].  The orchestrator mutates it; observers read
/// it whenever they refresh.
#[derive(Debug, Default)]
pub struct PipelineSnapshot {
    /// Current phase of the session state machine.
    pub session: SessionState,

    /// Id of the provisional record currently in flight, if any.  Cleared
    /// when the record completes or the session is cancelled.
    pub provisional: Option<Uuid>,

    /// Id of the most-recently completed record — observers use this to
    /// auto-scroll/highlight the new entry.
    pub latest_completed: Option<Uuid>,

    /// User-visible message when `session == Failed`.
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`PipelineSnapshot`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<PipelineSnapshot>>;

/// Construct a new [`SharedState`] in the `Idle` state.
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(PipelineSnapshot::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
