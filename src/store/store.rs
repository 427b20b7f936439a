//! The append-mostly record collection and its persistence.
//!
//! [`RecordStore`] exclusively owns the journal history.  There is exactly
//! one instance per process, constructed at application start (which loads
//! any persisted records) and injected by reference into the pipeline and
//! the read-only observers — no global state.
//!
//! Every mutation (append, in-place fill, delete) re-serialises the entire
//! collection to `records.json`.  There is no partial or incremental
//! persistence; collection sizes are small (a personal journal), so the
//! whole-file write stays cheap and keeps the on-disk snapshot trivially
//! consistent.  All access is serialised through one internal `Mutex`
//! (single-writer discipline) so concurrent unserialised writes can never
//! race the snapshot.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::emotion::DisplayCategory;

use super::record::{Clip, EmotionPoint, Record};

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read record file: {0}")]
    Read(String),

    #[error("failed to parse record file: {0}")]
    Parse(String),

    #[error("failed to write record file: {0}")]
    Write(String),

    /// The referenced record does not exist (it may have been deleted).
    #[error("no record with id {0}")]
    UnknownRecord(Uuid),
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Process-wide owner of the journal records.
///
/// # Example
///
/// ```rust,no_run
/// use voice_journal::store::RecordStore;
///
/// let store = RecordStore::open(
///     "/data/records.json".into(),
///     "/data/clips".into(),
/// ).unwrap();
/// println!("{} records", store.len());
/// ```
#[derive(Debug)]
pub struct RecordStore {
    records_file: PathBuf,
    clips_dir: PathBuf,
    inner: Mutex<Vec<Record>>,
}

impl RecordStore {
    /// Open the store, loading any previously persisted collection.
    ///
    /// A missing file is the first-run case and yields an empty store; an
    /// unreadable or unparseable file is an error (the caller decides
    /// whether to start fresh).
    pub fn open(records_file: PathBuf, clips_dir: PathBuf) -> Result<Self, StoreError> {
        let records = if records_file.exists() {
            let content = std::fs::read_to_string(&records_file)
                .map_err(|e| StoreError::Read(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| StoreError::Parse(e.to_string()))?
        } else {
            Vec::new()
        };

        log::info!("store: loaded {} records", records.len());

        Ok(Self {
            records_file,
            clips_dir,
            inner: Mutex::new(records),
        })
    }

    // -----------------------------------------------------------------------
    // Mutations (each re-serialises the whole collection)
    // -----------------------------------------------------------------------

    /// Append a provisional record: transcript filled, analysis fields
    /// pending.  The sequence number is assigned here, exactly once.
    pub fn append_provisional(
        &self,
        clip: Option<&Clip>,
        transcript: String,
        recorded_at: DateTime<Utc>,
    ) -> Result<Record, StoreError> {
        let mut records = self.inner.lock().unwrap();

        // Monotonic even after deletions: never reuse a sequence number.
        let seq = records.iter().map(|r| r.seq).max().unwrap_or(0) + 1;

        let record = Record {
            id: Uuid::new_v4(),
            seq,
            category: DisplayCategory::Neutral,
            audio_file: clip.map(|c| c.file_name.clone()),
            transcript,
            recorded_at,
            score: None,
            emotion: None,
            comment: None,
        };

        records.push(record.clone());
        self.persist(&records)?;

        log::debug!("store: appended provisional record seq={seq}");
        Ok(record)
    }

    /// Fill the mood fields of a record.
    ///
    /// Analysis fields progress pending → final exactly once: when the score
    /// is already final the call is a no-op (no field ever regresses).
    pub fn fill_analysis(
        &self,
        id: Uuid,
        score: u8,
        emotion: &str,
        category: DisplayCategory,
    ) -> Result<(), StoreError> {
        let mut records = self.inner.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::UnknownRecord(id))?;

        if record.score.is_some() {
            log::warn!("store: analysis for {id} already final, ignoring");
            return Ok(());
        }

        record.score = Some(score);
        record.emotion = Some(emotion.to_string());
        record.category = category;
        self.persist(&records)
    }

    /// Fill the generated comment of a record (pending → final, once).
    pub fn fill_comment(&self, id: Uuid, comment: &str) -> Result<(), StoreError> {
        let mut records = self.inner.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::UnknownRecord(id))?;

        if record.comment.is_some() {
            log::warn!("store: comment for {id} already final, ignoring");
            return Ok(());
        }

        record.comment = Some(comment.to_string());
        self.persist(&records)
    }

    /// Delete a record and its audio clip file.
    ///
    /// Returns `true` when a record was removed.  Clip-file removal failures
    /// are logged and ignored — the record itself is gone either way.
    pub fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.inner.lock().unwrap();
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        let removed = records.remove(pos);
        if let Some(path) = self.resolve_audio(&removed) {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("store: could not remove clip {}: {e}", path.display());
            }
        }

        self.persist(&records)?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Read API (UI collaborators)
    // -----------------------------------------------------------------------

    /// All records in insertion order.
    pub fn records(&self) -> Vec<Record> {
        self.inner.lock().unwrap().clone()
    }

    /// Look up one record by id.
    pub fn get(&self, id: Uuid) -> Option<Record> {
        self.inner.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    /// Look up the record owning the given clip file.  Each record is owned
    /// by exactly one session, identified by its audio reference.
    pub fn find_by_audio(&self, file_name: &str) -> Option<Record> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.audio_file.as_deref() == Some(file_name))
            .cloned()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Returns `true` when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Id of the earliest record on the given calendar day (UTC), or `None`
    /// for a day with no records.  The calendar view uses this to jump to
    /// the day's first entry.
    pub fn find_earliest_for_date(&self, day: NaiveDate) -> Option<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.recorded_at.date_naive() == day)
            .min_by_key(|r| r.recorded_at)
            .map(|r| r.id)
    }

    /// Derived (date, score, emotion) series for the trend chart, sorted by
    /// date.  Records that have not been classified yet contribute a neutral
    /// placeholder (score 50, label 不明).
    pub fn emotion_series(&self) -> Vec<EmotionPoint> {
        let mut points: Vec<EmotionPoint> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .map(|r| EmotionPoint {
                date: r.recorded_at,
                score: r.score.unwrap_or(50),
                emotion: r.emotion.clone().unwrap_or_else(|| "不明".into()),
            })
            .collect();
        points.sort_by_key(|p| p.date);
        points
    }

    /// Resolve a record's audio reference against the *current* clips
    /// directory.  Returns `None` when capture failed for that record.
    pub fn resolve_audio(&self, record: &Record) -> Option<PathBuf> {
        record
            .audio_file
            .as_ref()
            .map(|name| self.clips_dir.join(name))
    }

    /// The directory clips are resolved against.
    pub fn clips_dir(&self) -> &Path {
        &self.clips_dir
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the whole collection to `records.json`, creating parent
    /// directories as needed.  Called with the lock held.
    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        if let Some(parent) = self.records_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Write(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        std::fs::write(&self.records_file, json).map_err(|e| StoreError::Write(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn open_store(dir: &Path) -> RecordStore {
        RecordStore::open(dir.join("records.json"), dir.join("clips")).unwrap()
    }

    fn clip_named(name: &str) -> Clip {
        Clip {
            id: Uuid::new_v4(),
            file_name: name.into(),
            duration_secs: 2.0,
            created_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    // ---- append / sequence numbers -----------------------------------------

    #[test]
    fn append_assigns_one_based_monotonic_seq() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let a = store
            .append_provisional(None, "one".into(), Utc::now())
            .unwrap();
        let b = store
            .append_provisional(None, "two".into(), Utc::now())
            .unwrap();

        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
    }

    #[test]
    fn seq_stays_monotonic_after_delete() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let a = store
            .append_provisional(None, "one".into(), Utc::now())
            .unwrap();
        let b = store
            .append_provisional(None, "two".into(), Utc::now())
            .unwrap();
        assert_eq!(b.seq, 2);

        store.delete(a.id).unwrap();
        let c = store
            .append_provisional(None, "three".into(), Utc::now())
            .unwrap();

        // New records always take a number above every surviving one.
        assert_eq!(c.seq, 3);
        let surviving: Vec<u64> = store.records().iter().map(|r| r.seq).collect();
        assert_eq!(surviving, vec![2, 3]);
    }

    #[test]
    fn provisional_record_has_pending_analysis_fields() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let rec = store
            .append_provisional(Some(&clip_named("a.wav")), "text".into(), Utc::now())
            .unwrap();

        assert_eq!(rec.audio_file.as_deref(), Some("a.wav"));
        assert!(rec.score.is_none());
        assert!(rec.emotion.is_none());
        assert!(rec.comment.is_none());
    }

    // ---- fill (monotonic progression) --------------------------------------

    #[test]
    fn fill_analysis_then_comment_completes_record() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let rec = store
            .append_provisional(None, "text".into(), Utc::now())
            .unwrap();

        store
            .fill_analysis(rec.id, 88, "喜び", DisplayCategory::Joy)
            .unwrap();
        store.fill_comment(rec.id, "よかったね！").unwrap();

        let rec = store.get(rec.id).unwrap();
        assert!(rec.is_complete());
        assert_eq!(rec.score, Some(88));
        assert_eq!(rec.emotion.as_deref(), Some("喜び"));
        assert_eq!(rec.category, DisplayCategory::Joy);
        assert_eq!(rec.comment.as_deref(), Some("よかったね！"));
    }

    #[test]
    fn final_analysis_fields_never_regress() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let rec = store
            .append_provisional(None, "text".into(), Utc::now())
            .unwrap();
        store
            .fill_analysis(rec.id, 88, "喜び", DisplayCategory::Joy)
            .unwrap();

        // A second write must be a no-op, not an overwrite.
        store
            .fill_analysis(rec.id, 10, "怒り", DisplayCategory::Anger)
            .unwrap();

        let rec = store.get(rec.id).unwrap();
        assert_eq!(rec.score, Some(88));
        assert_eq!(rec.emotion.as_deref(), Some("喜び"));
        assert_eq!(rec.category, DisplayCategory::Joy);
    }

    #[test]
    fn final_comment_never_regresses() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let rec = store
            .append_provisional(None, "text".into(), Utc::now())
            .unwrap();
        store.fill_comment(rec.id, "first").unwrap();
        store.fill_comment(rec.id, "second").unwrap();

        assert_eq!(store.get(rec.id).unwrap().comment.as_deref(), Some("first"));
    }

    #[test]
    fn fill_on_unknown_record_errors() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let err = store
            .fill_analysis(Uuid::new_v4(), 50, "普通", DisplayCategory::Neutral)
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRecord(_)));
    }

    // ---- persistence round trip --------------------------------------------

    #[test]
    fn round_trip_preserves_identity_and_pending_fields() {
        let dir = tempdir().unwrap();
        let ts = at(2025, 3, 10, 9);

        let originals: Vec<Record> = {
            let store = open_store(dir.path());
            let a = store
                .append_provisional(Some(&clip_named("a.wav")), "朝の記録".into(), ts)
                .unwrap();
            store
                .fill_analysis(a.id, 90, "喜び", DisplayCategory::Joy)
                .unwrap();
            let _b = store
                .append_provisional(None, "昼の記録".into(), ts)
                .unwrap();
            store.records()
        };

        // Re-open against the same file — a fresh process start.
        let store = open_store(dir.path());
        let loaded = store.records();

        assert_eq!(loaded.len(), originals.len());
        for (orig, back) in originals.iter().zip(loaded.iter()) {
            assert_eq!(orig.id, back.id);
            assert_eq!(orig.seq, back.seq);
            assert_eq!(orig.transcript, back.transcript);
            assert_eq!(orig.recorded_at, back.recorded_at);
        }

        // Fields pending before analysis stay null after the round trip and
        // are only filled once the corresponding stage runs.
        let b = &loaded[1];
        assert!(b.score.is_none());
        assert!(b.comment.is_none());
        store.fill_comment(b.id, "うん、聞けてよかったよ。").unwrap();
        assert!(store.get(b.id).unwrap().comment.is_some());
    }

    #[test]
    fn open_missing_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn open_corrupt_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = RecordStore::open(path, dir.path().join("clips")).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    // ---- delete ------------------------------------------------------------

    #[test]
    fn delete_removes_record_and_clip_file() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let clip = clip_named("gone.wav");
        std::fs::create_dir_all(store.clips_dir()).unwrap();
        std::fs::write(store.clips_dir().join("gone.wav"), b"riff").unwrap();

        let rec = store
            .append_provisional(Some(&clip), "text".into(), Utc::now())
            .unwrap();

        assert!(store.delete(rec.id).unwrap());
        assert!(store.is_empty());
        assert!(!store.clips_dir().join("gone.wav").exists());
    }

    #[test]
    fn find_by_audio_matches_owning_record() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let clip = clip_named("owned.wav");
        let rec = store
            .append_provisional(Some(&clip), "text".into(), Utc::now())
            .unwrap();

        assert_eq!(store.find_by_audio("owned.wav").map(|r| r.id), Some(rec.id));
        assert!(store.find_by_audio("other.wav").is_none());
    }

    #[test]
    fn delete_unknown_id_returns_false() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        assert!(!store.delete(Uuid::new_v4()).unwrap());
    }

    // ---- calendar lookup ---------------------------------------------------

    #[test]
    fn earliest_record_for_day_wins() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let later = store
            .append_provisional(None, "afternoon".into(), at(2025, 6, 1, 15))
            .unwrap();
        let earlier = store
            .append_provisional(None, "morning".into(), at(2025, 6, 1, 8))
            .unwrap();
        let _other_day = store
            .append_provisional(None, "next day".into(), at(2025, 6, 2, 7))
            .unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let found = store.find_earliest_for_date(day);
        assert_eq!(found, Some(earlier.id));
        assert_ne!(found, Some(later.id));
    }

    #[test]
    fn day_with_no_records_returns_none() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        store
            .append_provisional(None, "entry".into(), at(2025, 6, 1, 8))
            .unwrap();

        let empty_day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(store.find_earliest_for_date(empty_day), None);
    }

    // ---- emotion series ----------------------------------------------------

    #[test]
    fn emotion_series_is_date_sorted_with_placeholders() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());

        let newer = store
            .append_provisional(None, "b".into(), at(2025, 6, 2, 9))
            .unwrap();
        store
            .fill_analysis(newer.id, 80, "喜び", DisplayCategory::Joy)
            .unwrap();
        let _older_unclassified = store
            .append_provisional(None, "a".into(), at(2025, 6, 1, 9))
            .unwrap();

        let series = store.emotion_series();
        assert_eq!(series.len(), 2);
        // sorted by date: unclassified older record first, with placeholders
        assert_eq!(series[0].score, 50);
        assert_eq!(series[0].emotion, "不明");
        assert_eq!(series[1].score, 80);
        assert_eq!(series[1].emotion, "喜び");
    }

    // ---- audio resolution --------------------------------------------------

    #[test]
    fn audio_resolves_against_current_clips_dir() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let rec = store
            .append_provisional(Some(&clip_named("x.wav")), "t".into(), Utc::now())
            .unwrap();

        let resolved = store.resolve_audio(&rec).unwrap();
        assert_eq!(resolved, dir.path().join("clips").join("x.wav"));
    }

    #[test]
    fn audio_resolution_is_none_when_capture_failed() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path());
        let rec = store
            .append_provisional(None, "t".into(), Utc::now())
            .unwrap();
        assert!(store.resolve_audio(&rec).is_none());
    }
}
