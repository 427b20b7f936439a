//! Journal record model.
//!
//! [`Clip`] is the ephemeral handle to one finished audio capture; it exists
//! only between `stop()` and the moment it is attached to a [`Record`].
//! [`Record`] is the durable unit of journal history: transcript plus the
//! emotion analysis and generated comment filled in by later pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::emotion::DisplayCategory;

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

/// Ephemeral handle to a captured audio asset.
///
/// `file_name` is a bare file name (never an absolute path): the clips
/// directory may move between process runs, so the path is resolved against
/// the current storage root at access time.  Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    /// Location-independent file name inside the clips directory.
    pub file_name: String,
    pub duration_secs: f32,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One enriched journal entry.
///
/// A record is appended as *provisional* (transcript filled, analysis fields
/// `None`) as soon as transcription succeeds, then completed in place by the
/// classification and comment stages.  Analysis fields progress monotonically
/// from pending (`None`) to final (`Some`) — they are written once and never
/// regress; see [`super::RecordStore::fill_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity, unique for the process lifetime.
    pub id: Uuid,

    /// 1-based monotonic sequence number, assigned once by the store at
    /// creation and never reassigned.  Drives ordering/pairing in the UI.
    pub seq: u64,

    /// Display bucket driving which mascot/icon renders.  Starts at the
    /// neutral bucket and is finalised by classification.
    pub category: DisplayCategory,

    /// Clip file name; `None` if capture failed.
    pub audio_file: Option<String>,

    /// Transcript text.  May legitimately be long; see
    /// [`transcript_preview`](Self::transcript_preview) for list views.
    pub transcript: String,

    /// When the recording was made.
    pub recorded_at: DateTime<Utc>,

    /// Mood score 1–100; `None` until classified.
    pub score: Option<u8>,

    /// Emotion label (e.g. 喜び); `None` until classified.
    pub emotion: Option<String>,

    /// Generated empathetic comment; `None` until generated.
    pub comment: Option<String>,
}

impl Record {
    /// Whether every analysis stage has completed for this record.
    pub fn is_complete(&self) -> bool {
        self.score.is_some() && self.emotion.is_some() && self.comment.is_some()
    }

    /// First 50 characters of the transcript for list views, with an
    /// ellipsis appended when truncated.
    pub fn transcript_preview(&self) -> String {
        const MAX_CHARS: usize = 50;
        let count = self.transcript.chars().count();
        if count <= MAX_CHARS {
            return self.transcript.clone();
        }
        let head: String = self.transcript.chars().take(MAX_CHARS).collect();
        format!("{head}...")
    }
}

// ---------------------------------------------------------------------------
// EmotionPoint
// ---------------------------------------------------------------------------

/// One point of the derived (date, score, emotion) time series consumed by
/// the trend chart collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionPoint {
    pub date: DateTime<Utc>,
    pub score: u8,
    pub emotion: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
