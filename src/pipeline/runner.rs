//! Pipeline orchestrator — drives capture → transcription → classification →
//! comment → store.
//!
//! [`PipelineOrchestrator`] owns one session at a time and publishes its
//! progress through [`SharedState`] for observers.
//!
//! # Pipeline flow
//!
//! ```text
//! start()
//!   └─▶ Recorder::start (permission check)          [Recording]
//!
//! stop()
//!   └─▶ Recorder::stop → Clip, spawn analysis task  [Transcribing]
//!         ├─ authorize() == false → Failed
//!         ├─ transcribe timeout/error → Failed
//!         ├─ transcript "" → Aborted (nothing persisted)
//!         └─ transcript → provisional Record        [Classifying]
//!               └─ classify → fill_analysis         [CommentPending]
//!                     └─ generate (fallback-wrapped) → fill_comment [Done]
//! cancel()
//!   └─▶ abort analysis, discard recording, delete provisional  [Aborted]
//! ```
//!
//! At most one session is in flight per orchestrator: `start` while a
//! session is active is rejected immediately, never queued.  The comment
//! stage runs on a spawned task so the caller is free as soon as `stop`
//! returns; per-record writes stay ordered (transcript → mood → comment)
//! because that one task performs them sequentially through the
//! single-writer store.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::audio::{CaptureError, Recorder};
use crate::comment::CommentGenerator;
use crate::emotion::{fallback_comment, EmotionClassifier};
use crate::store::{Clip, RecordStore};
use crate::stt::{SttError, Transcriber};

use super::state::{SessionState, SharedState};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors surfaced directly to the caller of `start` / `stop`.
///
/// All variants carry a human-readable description so the UI can display
/// them without knowing the internal cause.  Failures inside the spawned
/// analysis stage are published via [`SharedState`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A session is already in flight; new sessions are rejected, not queued.
    #[error("a recording session is already in progress")]
    SessionActive,

    /// Microphone permission was refused — no clip is produced.
    #[error("microphone unavailable or access denied")]
    MicPermission,

    /// Capture failed to start or to produce a clip.
    #[error("audio capture failed: {0}")]
    Capture(String),
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives a recording session through the full enrichment pipeline.
///
/// Construct with [`PipelineOrchestrator::new`]; every collaborator is
/// injected so tests can swap in mocks and the application root keeps
/// single-instance ownership of the store.
pub struct PipelineOrchestrator {
    shared: SharedState,
    recorder: Arc<dyn Recorder>,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn CommentGenerator>,
    classifier: Arc<EmotionClassifier>,
    store: Arc<RecordStore>,
    analysis: Mutex<Option<JoinHandle<()>>>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `shared`      — observer state (also read by the UI).
    /// * `recorder`    — microphone session owner.
    /// * `transcriber` — one of the [`crate::stt`] strategies.
    /// * `generator`   — comment backend, normally fallback-wrapped.
    /// * `classifier`  — keyword classifier (seed injectable).
    /// * `store`       — the process-wide record store.
    pub fn new(
        shared: SharedState,
        recorder: Arc<dyn Recorder>,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn CommentGenerator>,
        classifier: Arc<EmotionClassifier>,
        store: Arc<RecordStore>,
    ) -> Self {
        Self {
            shared,
            recorder,
            transcriber,
            generator,
            classifier,
            store,
            analysis: Mutex::new(None),
        }
    }

    /// Observer handle to the pipeline state.
    pub fn shared(&self) -> SharedState {
        Arc::clone(&self.shared)
    }

    /// Live level meter passthrough for the recording view.
    pub fn levels(&self) -> Vec<f32> {
        self.recorder.levels()
    }

    // -----------------------------------------------------------------------
    // Session control
    // -----------------------------------------------------------------------

    /// Begin a new recording session.
    ///
    /// Rejected with [`PipelineError::SessionActive`] while a session is in
    /// flight — the running session's state is left untouched.  Permission
    /// refusal surfaces as [`PipelineError::MicPermission`]; the state
    /// machine stays in `Idle` so the user may retry immediately.
    pub async fn start(&self) -> Result<(), PipelineError> {
        {
            let mut st = self.shared.lock().unwrap();
            if st.session.is_active() {
                log::warn!("pipeline: start rejected, session already active");
                return Err(PipelineError::SessionActive);
            }
            // Reserve the slot before the (suspending) permission check so a
            // concurrent start cannot slip in between.
            st.session = SessionState::Recording;
            st.error_message = None;
            st.provisional = None;
        }

        match self.recorder.start().await {
            Ok(()) => {
                log::debug!("pipeline: session started → Recording");
                Ok(())
            }
            Err(CaptureError::PermissionDenied) => {
                let mut st = self.shared.lock().unwrap();
                st.session = SessionState::Idle;
                st.error_message = Some(PipelineError::MicPermission.to_string());
                Err(PipelineError::MicPermission)
            }
            Err(e) => {
                let mut st = self.shared.lock().unwrap();
                st.session = SessionState::Idle;
                st.error_message = Some(e.to_string());
                Err(PipelineError::Capture(e.to_string()))
            }
        }
    }

    /// End the recording and hand the clip to the analysis stages.
    ///
    /// A no-op unless the session is `Recording`.  Returns as soon as the
    /// analysis task is spawned; observe progress via [`Self::shared`] or
    /// await it with [`Self::await_analysis`].
    pub fn stop(&self) -> Result<(), PipelineError> {
        {
            let st = self.shared.lock().unwrap();
            if st.session != SessionState::Recording {
                log::debug!("pipeline: stop ignored, not recording");
                return Ok(());
            }
        }

        let clip = match self.recorder.stop() {
            Ok(Some(clip)) => clip,
            Ok(None) => {
                self.fail("recording produced no clip");
                return Err(PipelineError::Capture("no clip produced".into()));
            }
            Err(e) => {
                self.fail(&e.to_string());
                return Err(PipelineError::Capture(e.to_string()));
            }
        };

        self.shared.lock().unwrap().session = SessionState::Transcribing;
        log::debug!("pipeline: stop → Transcribing ({})", clip.file_name);

        let handle = tokio::spawn(run_analysis(
            Arc::clone(&self.shared),
            Arc::clone(&self.transcriber),
            Arc::clone(&self.generator),
            Arc::clone(&self.classifier),
            Arc::clone(&self.store),
            clip,
        ));
        *self.analysis.lock().unwrap() = Some(handle);

        Ok(())
    }

    /// Cancel the in-flight session.
    ///
    /// Outstanding transcription/comment work is aborted, an active
    /// recording is stopped and discarded, and a provisional record that
    /// was already appended mid-pipeline is deleted — persisted records are
    /// eventually complete, never stuck pending.
    pub fn cancel(&self) {
        if let Some(handle) = self.analysis.lock().unwrap().take() {
            handle.abort();
        }

        if self.recorder.is_recording() {
            if let Err(e) = self.recorder.stop() {
                log::warn!("pipeline: discard-stop failed: {e}");
            }
        }

        let provisional = {
            let mut st = self.shared.lock().unwrap();
            st.session = SessionState::Aborted;
            st.provisional.take()
        };

        if let Some(id) = provisional {
            match self.store.delete(id) {
                Ok(true) => log::info!("pipeline: cancelled, provisional record {id} deleted"),
                Ok(false) => {}
                Err(e) => log::warn!("pipeline: could not delete provisional record: {e}"),
            }
        }

        log::info!("pipeline: session cancelled → Aborted");
    }

    /// Wait for the current analysis task (if any) to finish.
    pub async fn await_analysis(&self) {
        let handle = self.analysis.lock().unwrap().take();
        if let Some(handle) = handle {
            // Abort errors only occur after cancel(), which already settled
            // the state machine.
            let _ = handle.await;
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn fail(&self, message: &str) {
        fail(&self.shared, message);
    }
}

/// Publish a failure: state machine → `Failed`, message for the UI.
fn fail(shared: &SharedState, message: &str) {
    let mut st = shared.lock().unwrap();
    st.session = SessionState::Failed;
    st.error_message = Some(message.to_string());
    log::error!("pipeline error: {message}");
}

// ---------------------------------------------------------------------------
// Analysis task
// ---------------------------------------------------------------------------

/// The post-stop stage chain.  Runs on its own task so `stop` returns
/// immediately and `cancel` can abort the whole chain at any await point.
async fn run_analysis(
    shared: SharedState,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn CommentGenerator>,
    classifier: Arc<EmotionClassifier>,
    store: Arc<RecordStore>,
    clip: Clip,
) {
    // ── 1. Authorization (one-time, cached) ──────────────────────────────
    if !transcriber.authorize().await {
        fail(&shared, "speech recognition not authorized");
        return;
    }

    // ── 2. Transcription (bounded by the strategy's timeout) ─────────────
    let transcript = match transcriber.transcribe(&clip).await {
        Ok(text) => text,
        Err(SttError::Timeout) => {
            fail(&shared, "transcription timed out");
            return;
        }
        Err(e) => {
            fail(&shared, &format!("transcription failed: {e}"));
            return;
        }
    };

    let transcript = transcript.trim().to_string();
    if transcript.is_empty() {
        // An inaudible recording has no journal value: abort silently,
        // nothing persisted.
        log::info!("pipeline: empty transcript, session aborted");
        shared.lock().unwrap().session = SessionState::Aborted;
        return;
    }

    // ── 3. Provisional record (observers can show "processing") ──────────
    let record = match store.append_provisional(Some(&clip), transcript.clone(), clip.created_at)
    {
        Ok(record) => record,
        Err(e) => {
            fail(&shared, &format!("could not persist record: {e}"));
            return;
        }
    };

    {
        let mut st = shared.lock().unwrap();
        st.provisional = Some(record.id);
        st.session = SessionState::Classifying;
    }

    // ── 4. Classification (synchronous) ──────────────────────────────────
    let classification = classifier.classify(&transcript);
    if let Err(e) = store.fill_analysis(
        record.id,
        classification.score,
        classification.label,
        classification.category,
    ) {
        fail(&shared, &format!("could not persist analysis: {e}"));
        return;
    }

    shared.lock().unwrap().session = SessionState::CommentPending;
    log::debug!(
        "pipeline: classified score={} label={} → CommentPending",
        classification.score,
        classification.label
    );

    // ── 5. Comment (time-bounded; the wrapper already falls back) ────────
    let comment = match generator
        .generate(&transcript, classification.label, classification.score)
        .await
    {
        Ok(comment) => comment,
        Err(e) => {
            // Absorbed even if the injected generator is not fallback-wrapped:
            // a record never completes without a comment.
            log::warn!("pipeline: comment generation failed ({e}), using band pool");
            let mut rng = StdRng::from_entropy();
            fallback_comment(classification.score, &mut rng).to_string()
        }
    };

    if let Err(e) = store.fill_comment(record.id, &comment) {
        fail(&shared, &format!("could not persist comment: {e}"));
        return;
    }

    // ── 6. Done — publish for auto-scroll/highlight ──────────────────────
    {
        let mut st = shared.lock().unwrap();
        st.session = SessionState::Done;
        st.latest_completed = Some(record.id);
        st.provisional = None;
    }
    log::info!("pipeline: record {} complete (seq {})", record.id, record.seq);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MockRecorder;
    use crate::comment::{CommentError, FallbackGenerator};
    use crate::emotion::{DisplayCategory, EmotionBand};
    use crate::pipeline::state::new_shared_state;
    use crate::stt::MockTranscriber;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;
    use uuid::Uuid;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Comment generator that always succeeds with a fixed string.
    struct OkGenerator(String);

    #[async_trait]
    impl CommentGenerator for OkGenerator {
        async fn generate(&self, _t: &str, _e: &str, _s: u8) -> Result<String, CommentError> {
            Ok(self.0.clone())
        }
    }

    /// Comment generator that always fails with a transport error.
    struct FailGenerator;

    #[async_trait]
    impl CommentGenerator for FailGenerator {
        async fn generate(&self, _t: &str, _e: &str, _s: u8) -> Result<String, CommentError> {
            Err(CommentError::Request("connection refused".into()))
        }
    }

    /// Comment generator that never answers within a test's patience.
    struct SlowGenerator;

    #[async_trait]
    impl CommentGenerator for SlowGenerator {
        async fn generate(&self, _t: &str, _e: &str, _s: u8) -> Result<String, CommentError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".into())
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn test_clip() -> Clip {
        Clip {
            id: Uuid::new_v4(),
            file_name: format!("{}.wav", Uuid::new_v4()),
            duration_secs: 2.0,
            created_at: Utc::now(),
        }
    }

    fn make_store(dir: &std::path::Path) -> Arc<RecordStore> {
        Arc::new(
            RecordStore::open(dir.join("records.json"), dir.join("clips")).unwrap(),
        )
    }

    fn make_orchestrator(
        dir: &std::path::Path,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn CommentGenerator>,
    ) -> (PipelineOrchestrator, SharedState, Arc<RecordStore>) {
        let shared = new_shared_state();
        let store = make_store(dir);
        let recorder: Arc<dyn Recorder> = Arc::new(MockRecorder::with_clip(test_clip()));

        let orc = PipelineOrchestrator::new(
            Arc::clone(&shared),
            recorder,
            transcriber,
            generator,
            Arc::new(EmotionClassifier::with_seed(7)),
            Arc::clone(&store),
        );
        (orc, shared, store)
    }

    async fn wait_for_state(shared: &SharedState, target: SessionState) {
        for _ in 0..400 {
            if shared.lock().unwrap().session == target {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("state {target:?} not reached");
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// Full happy path: joy transcript → one record with score in the joy
    /// band, joy bucket, and eventually a non-empty comment.
    #[tokio::test]
    async fn joy_session_produces_complete_record() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("今日は楽しかった")),
            Arc::new(OkGenerator("その気持ち、大事にしてね。".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        assert_eq!(shared.lock().unwrap().session, SessionState::Done);
        assert_eq!(store.len(), 1);

        let record = &store.records()[0];
        assert_eq!(record.transcript, "今日は楽しかった");
        assert!((76..=100).contains(&record.score.unwrap()));
        assert_eq!(record.category, DisplayCategory::Joy);
        assert_eq!(record.emotion.as_deref(), Some("喜び"));
        assert_eq!(record.comment.as_deref(), Some("その気持ち、大事にしてね。"));
        assert!(record.audio_file.is_some());

        // Completion is published for auto-scroll.
        assert_eq!(shared.lock().unwrap().latest_completed, Some(record.id));
    }

    /// Empty transcript → session aborted, zero records persisted.
    #[tokio::test]
    async fn empty_transcript_aborts_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("")),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        assert_eq!(shared.lock().unwrap().session, SessionState::Aborted);
        assert!(store.is_empty());
    }

    /// Whitespace-only transcripts count as empty.
    #[tokio::test]
    async fn whitespace_transcript_aborts_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("   \n")),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        assert_eq!(shared.lock().unwrap().session, SessionState::Aborted);
        assert!(store.is_empty());
    }

    /// Generator failure is absorbed: the comment is filled from the band's
    /// fixed pool, never left null, and nothing propagates to the caller.
    #[tokio::test]
    async fn failed_generator_falls_back_to_band_pool() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("今日は楽しかった")),
            Arc::new(FallbackGenerator::with_seed(FailGenerator, 3)),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        assert_eq!(shared.lock().unwrap().session, SessionState::Done);
        let record = &store.records()[0];
        let comment = record.comment.as_deref().expect("comment must be filled");
        assert!(EmotionBand::Joy.comment_pool().contains(&comment));
    }

    /// Even an unwrapped failing generator cannot leave the comment null.
    #[tokio::test]
    async fn unwrapped_failing_generator_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("今日は楽しかった")),
            Arc::new(FailGenerator),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        assert_eq!(shared.lock().unwrap().session, SessionState::Done);
        assert!(store.records()[0].comment.is_some());
    }

    /// Starting a second session while one is `Transcribing` is rejected
    /// immediately and leaves the state machine untouched.
    #[tokio::test]
    async fn concurrent_start_is_rejected_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, _store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("ゆっくり").with_delay(Duration::from_millis(200))),
            Arc::new(OkGenerator("ok".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        assert_eq!(shared.lock().unwrap().session, SessionState::Transcribing);

        let err = orc.start().await.unwrap_err();
        assert!(matches!(err, PipelineError::SessionActive));
        assert_eq!(shared.lock().unwrap().session, SessionState::Transcribing);

        orc.await_analysis().await;
    }

    /// Microphone permission refusal surfaces and leaves the machine in
    /// `Idle` so the user can retry immediately.
    #[tokio::test]
    async fn mic_permission_denied_surfaces_and_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let shared = new_shared_state();
        let store = make_store(dir.path());
        let recorder: Arc<dyn Recorder> = Arc::new(MockRecorder::denied());

        let orc = PipelineOrchestrator::new(
            Arc::clone(&shared),
            recorder,
            Arc::new(MockTranscriber::ok("unused")),
            Arc::new(OkGenerator("unused".into())),
            Arc::new(EmotionClassifier::with_seed(7)),
            Arc::clone(&store),
        );

        let err = orc.start().await.unwrap_err();
        assert!(matches!(err, PipelineError::MicPermission));

        let st = shared.lock().unwrap();
        assert_eq!(st.session, SessionState::Idle);
        assert!(st.error_message.is_some());
        assert!(store.is_empty());
    }

    /// Speech authorization denial fails the session; nothing persisted.
    #[tokio::test]
    async fn speech_authorization_denied_fails_session() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::denied()),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        let st = shared.lock().unwrap();
        assert_eq!(st.session, SessionState::Failed);
        assert!(st.error_message.as_deref().unwrap().contains("authorized"));
        assert!(store.is_empty());
    }

    /// Transcription timeout fails the session; nothing persisted.
    #[tokio::test]
    async fn transcription_timeout_fails_session() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::err(SttError::Timeout)),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;

        let st = shared.lock().unwrap();
        assert_eq!(st.session, SessionState::Failed);
        assert!(st.error_message.as_deref().unwrap().contains("timed out"));
        assert!(store.is_empty());
    }

    /// A failed session can be retried immediately.
    #[tokio::test]
    async fn session_can_restart_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, _store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::err(SttError::Timeout)),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.await_analysis().await;
        assert_eq!(shared.lock().unwrap().session, SessionState::Failed);

        // Mock recorder's clip was consumed; a fresh start is still accepted.
        orc.start().await.unwrap();
        assert_eq!(shared.lock().unwrap().session, SessionState::Recording);
    }

    /// `stop` without an active recording is a no-op.
    #[tokio::test]
    async fn stop_while_idle_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("unused")),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.stop().unwrap();
        assert_eq!(shared.lock().unwrap().session, SessionState::Idle);
        assert!(store.is_empty());
    }

    /// Cancel during transcription aborts the task and persists nothing.
    #[tokio::test]
    async fn cancel_during_transcription_aborts_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("遅い結果").with_delay(Duration::from_secs(30))),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();
        orc.cancel();

        assert_eq!(shared.lock().unwrap().session, SessionState::Aborted);
        assert!(store.is_empty());
    }

    /// Cancel during comment generation deletes the provisional record —
    /// persisted records are eventually complete, never stuck pending.
    #[tokio::test]
    async fn cancel_during_comment_deletes_provisional_record() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("今日は楽しかった")),
            Arc::new(SlowGenerator),
        );

        orc.start().await.unwrap();
        orc.stop().unwrap();

        wait_for_state(&shared, SessionState::CommentPending).await;
        assert_eq!(store.len(), 1);

        orc.cancel();

        assert_eq!(shared.lock().unwrap().session, SessionState::Aborted);
        assert!(store.is_empty());
        assert!(shared.lock().unwrap().provisional.is_none());
    }

    /// Cancel while recording discards the clip.
    #[tokio::test]
    async fn cancel_while_recording_discards_session() {
        let dir = tempfile::tempdir().unwrap();
        let (orc, shared, store) = make_orchestrator(
            dir.path(),
            Arc::new(MockTranscriber::ok("unused")),
            Arc::new(OkGenerator("unused".into())),
        );

        orc.start().await.unwrap();
        orc.cancel();

        assert_eq!(shared.lock().unwrap().session, SessionState::Aborted);
        assert!(store.is_empty());
    }
}
