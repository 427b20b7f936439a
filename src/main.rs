//! Application entry point — Voice Journal.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Open the [`RecordStore`] (loads any persisted records).
//! 4. Open the microphone ([`CpalRecorder`]); the stream guard stays on the
//!    main task.
//! 5. Build the speech engine (degrades to an explanatory stub when the
//!    model file is missing) and the configured transcriber strategy.
//! 6. Build the comment generator ([`ApiCommentGenerator`] wrapped in
//!    [`FallbackGenerator`]).
//! 7. Wire the [`PipelineOrchestrator`] and run the line-driven journal loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use voice_journal::{
    audio::{CpalRecorder, Recorder, SampleTap},
    comment::{ApiCommentGenerator, CommentGenerator, FallbackGenerator},
    config::{AppConfig, AppPaths, TranscribeStrategy},
    emotion::EmotionClassifier,
    pipeline::{new_shared_state, PipelineOrchestrator, SessionState},
    store::RecordStore,
    stt::{
        DecodeParams, FileTranscriber, LiveTranscriber, SpeechEngine, SttError, Transcriber,
        WhisperSpeechEngine,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Journal starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();

    // 3. Record store — the single process-wide instance, injected below.
    let store = Arc::new(
        RecordStore::open(paths.records_file.clone(), paths.clips_dir.clone())
            .context("could not open record store")?,
    );

    // 4. Speech engine (may fail if model not present — degrade gracefully)
    let model_path = paths.models_dir.join(format!("{}.bin", config.stt.model));
    let decode_params = DecodeParams {
        language: config.stt.language.clone(),
        ..DecodeParams::default()
    };

    let engine: Arc<dyn SpeechEngine> = match WhisperSpeechEngine::load(&model_path, decode_params)
    {
        Ok(engine) => {
            log::info!("Whisper model loaded: {}", model_path.display());
            Arc::new(engine)
        }
        Err(e) => {
            log::warn!(
                "Could not load Whisper model ({}): {e}. Transcription will return an error.",
                model_path.display()
            );
            // Use a stub that always returns an explanatory error so the app
            // still launches without a model file present.
            Arc::new(NoModelEngine {
                path: model_path.display().to_string(),
            })
        }
    };

    // 5. Transcriber strategy + microphone.  The Live strategy taps the
    //    resampled capture stream; OneShot reads the finished clip back.
    let stt_timeout = std::time::Duration::from_secs(config.stt.timeout_secs);
    let (transcriber, tap): (Arc<dyn Transcriber>, Option<SampleTap>) = match config.stt.strategy
    {
        TranscribeStrategy::OneShot => (
            Arc::new(FileTranscriber::new(
                Arc::clone(&engine),
                paths.clips_dir.clone(),
                stt_timeout,
            )),
            None,
        ),
        TranscribeStrategy::Live => {
            let live = Arc::new(LiveTranscriber::new(Arc::clone(&engine), stt_timeout));
            let feed = Arc::clone(&live);
            let tap: SampleTap = Arc::new(move |samples: &[f32]| feed.feed(samples));
            (live, Some(tap))
        }
    };

    let (recorder, _stream) =
        CpalRecorder::open_with_tap(paths.clips_dir.clone(), &config.audio, tap)
            .context("could not open microphone")?;
    let recorder: Arc<dyn Recorder> = Arc::new(recorder);

    // 6. Comment generator — never fails thanks to the fallback wrapper.
    let generator: Arc<dyn CommentGenerator> = Arc::new(FallbackGenerator::new(
        ApiCommentGenerator::from_config(&config.comment),
    ));

    // 7. Orchestrator + journal loop
    let shared = new_shared_state();
    let orchestrator = PipelineOrchestrator::new(
        Arc::clone(&shared),
        recorder,
        transcriber,
        generator,
        Arc::new(EmotionClassifier::new()),
        Arc::clone(&store),
    );

    println!("Voice Journal — {} entries on record", store.len());
    println!("[Enter] start/stop recording   [h] history   [c] cancel   [q] quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "q" => break,
            "c" => {
                orchestrator.cancel();
                println!("session cancelled");
            }
            "h" => print_history(&store),
            _ => {
                let recording = { shared.lock().unwrap().session == SessionState::Recording };
                if !recording {
                    match orchestrator.start().await {
                        Ok(()) => println!("recording… press Enter to stop"),
                        Err(e) => println!("cannot start: {e}"),
                    }
                } else {
                    if let Err(e) = orchestrator.stop() {
                        println!("stop failed: {e}");
                        continue;
                    }
                    println!("analyzing…");
                    orchestrator.await_analysis().await;
                    report_outcome(&shared, &store);
                }
            }
        }
    }

    log::info!("Voice Journal shutting down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Console output helpers
// ---------------------------------------------------------------------------

fn report_outcome(
    shared: &voice_journal::pipeline::SharedState,
    store: &RecordStore,
) {
    let (session, latest, error) = {
        let st = shared.lock().unwrap();
        (st.session, st.latest_completed, st.error_message.clone())
    };

    match session {
        SessionState::Done => {
            if let Some(record) = latest.and_then(|id| store.get(id)) {
                println!("#{} {}", record.seq, record.recorded_at.format("%Y-%m-%d %H:%M"));
                println!("  {}", record.transcript_preview());
                if let (Some(score), Some(emotion)) = (record.score, &record.emotion) {
                    println!("  score {score} ({emotion})");
                }
                if let Some(comment) = &record.comment {
                    println!("  » {comment}");
                }
            }
        }
        SessionState::Aborted => println!("nothing to keep (empty or cancelled)"),
        SessionState::Failed => {
            println!("{}", error.unwrap_or_else(|| "session failed".into()));
        }
        other => println!("session ended in state {}", other.label()),
    }
}

fn print_history(store: &RecordStore) {
    let records = store.records();
    if records.is_empty() {
        println!("no entries yet");
        return;
    }
    for record in records.iter().rev() {
        let score = record
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "…".into());
        println!(
            "#{:<3} {}  [{score}] {}",
            record.seq,
            record.recorded_at.format("%Y-%m-%d %H:%M"),
            record.transcript_preview()
        );
    }
}

// ---------------------------------------------------------------------------
// NoModelEngine — fallback SpeechEngine when the model file is not present
// ---------------------------------------------------------------------------

struct NoModelEngine {
    path: String,
}

impl SpeechEngine for NoModelEngine {
    fn decode(&self, _audio: &[f32]) -> Result<String, SttError> {
        Err(SttError::ModelNotFound(self.path.clone()))
    }

    fn is_ready(&self) -> bool {
        false
    }
}
