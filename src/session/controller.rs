use super::config::{CaptureMode, SessionConfig};
use super::stats::SessionStats;
use super::transcript::{NullTranscript, TranscriptEntry, TranscriptSink};
use crate::audio::AudioSource;
use crate::capture::{AudioClip, ClipRecorder};
use crate::classify::{ClassificationResult, Classifier, DebounceFilter};
use crate::error::{CaptureError, ClassificationError, SessionError};
use crate::monitor::{
    HapticActuator, HapticController, LevelSink, LoudnessMonitor, NullActuator, NullLevelSink,
};
use crate::speech::SpeechRecognizer;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Instant;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Session lifecycle state. Exactly one per controller; only the
/// controller writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Starting,
    Running,
    Stopping,
}

impl SessionState {
    fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Starting => "Starting",
            SessionState::Running => "Running",
            SessionState::Stopping => "Stopping",
        }
    }
}

/// Supervises the monitoring session: owns the audio source, the lifecycle
/// state, and the concurrently-running lanes (loudness monitor, clip
/// capture, classification, optional speech recognition).
pub struct SessionController {
    config: SessionConfig,

    /// The audio device handle; held for the controller's whole lifetime
    source: Mutex<Box<dyn AudioSource>>,

    actuator: Arc<dyn HapticActuator>,
    level_sink: Arc<dyn LevelSink>,
    transcript: Arc<dyn TranscriptSink>,
    classifier: Option<Arc<dyn Classifier>>,
    speech: Option<Arc<dyn SpeechRecognizer>>,

    /// Serializes start/stop so transitions never interleave
    op_lock: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
    /// Retained so the watch channel always has a live receiver; without
    /// it `state_tx.send` would fail (and drop the value) whenever no one
    /// is subscribed, leaving transitions silently unapplied.
    _state_rx: watch::Receiver<SessionState>,

    started_at: StdMutex<Option<DateTime<Utc>>>,
    clips_submitted: Arc<AtomicUsize>,
    events_emitted: Arc<AtomicUsize>,

    shutdown_tx: StdMutex<Option<watch::Sender<bool>>>,

    /// Handle for the loudness monitor task
    monitor_task: Mutex<Option<JoinHandle<()>>>,
    /// Handle for the clip recorder task
    capture_task: Mutex<Option<JoinHandle<()>>>,
    /// Handle for the classification lane task
    classify_task: Mutex<Option<JoinHandle<()>>>,
    /// Handle for the speech-recognition supervisor task
    speech_task: Mutex<Option<JoinHandle<()>>>,

    /// On-demand latch: set before triggering, cleared by the recorder
    capture_busy: Arc<AtomicBool>,
    capture_trigger: StdMutex<Option<mpsc::Sender<()>>>,
}

impl SessionController {
    pub fn new(config: SessionConfig, source: Box<dyn AudioSource>) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        Self {
            config,
            source: Mutex::new(source),
            actuator: Arc::new(NullActuator),
            level_sink: Arc::new(NullLevelSink),
            transcript: Arc::new(NullTranscript),
            classifier: None,
            speech: None,
            op_lock: Mutex::new(()),
            state_tx,
            _state_rx: state_rx,
            started_at: StdMutex::new(None),
            clips_submitted: Arc::new(AtomicUsize::new(0)),
            events_emitted: Arc::new(AtomicUsize::new(0)),
            shutdown_tx: StdMutex::new(None),
            monitor_task: Mutex::new(None),
            capture_task: Mutex::new(None),
            classify_task: Mutex::new(None),
            speech_task: Mutex::new(None),
            capture_busy: Arc::new(AtomicBool::new(false)),
            capture_trigger: StdMutex::new(None),
        }
    }

    pub fn with_actuator(mut self, actuator: Arc<dyn HapticActuator>) -> Self {
        self.actuator = actuator;
        self
    }

    pub fn with_level_sink(mut self, level_sink: Arc<dyn LevelSink>) -> Self {
        self.level_sink = level_sink;
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptSink>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_speech_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.speech = Some(recognizer);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Current session statistics.
    pub fn stats(&self) -> SessionStats {
        let started_at = *self.started_at.lock().unwrap();
        let duration_secs = started_at
            .map(|t| Utc::now().signed_duration_since(t).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0);

        SessionStats {
            state: self.state(),
            started_at,
            duration_secs,
            clips_submitted: self.clips_submitted.load(Ordering::SeqCst),
            events_emitted: self.events_emitted.load(Ordering::SeqCst),
        }
    }

    fn transition(&self, to: SessionState) -> Result<(), SessionError> {
        let from = self.state();

        let valid = matches!(
            (from, to),
            (SessionState::Idle, SessionState::Starting)
                | (SessionState::Starting, SessionState::Running)
                | (SessionState::Starting, SessionState::Idle)
                | (SessionState::Running, SessionState::Stopping)
                | (SessionState::Stopping, SessionState::Idle)
        );

        if !valid {
            return Err(SessionError::InvalidTransition {
                from: from.name(),
                to: to.name(),
            });
        }

        info!("Session transition: {} -> {}", from.name(), to.name());
        let _ = self.state_tx.send(to);
        Ok(())
    }

    /// Start the session: acquire the audio source and launch the lanes.
    ///
    /// A start while already started is a no-op. Acquisition failure is
    /// fatal: the session returns to `Idle` and the error propagates.
    pub async fn start(&self) -> Result<(), SessionError> {
        let _op = self.op_lock.lock().await;

        if self.state() != SessionState::Idle {
            warn!("Session already started");
            return Ok(());
        }

        info!("Starting session: {}", self.config.session_id);
        self.transition(SessionState::Starting)?;

        let stream = {
            let mut source = self.source.lock().await;
            match source.acquire().await {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Failed to acquire audio source: {}", e);
                    let _ = self.transition(SessionState::Idle);
                    return Err(SessionError::DeviceUnavailable(e));
                }
            }
        };

        self.transition(SessionState::Running)?;
        *self.started_at.lock().unwrap() = Some(Utc::now());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Loudness lane: energy snapshot -> level sink + haptics, every tick
        let monitor = LoudnessMonitor::new(
            stream.energy,
            Arc::clone(&self.level_sink),
            Arc::clone(&self.actuator),
            HapticController::new(self.config.haptic_cooldown),
        );
        let monitor_task =
            tokio::spawn(monitor.run(self.config.monitor_tick, shutdown_rx.clone()));

        // Capture lane: frames -> clips
        let (clip_tx, clip_rx) = mpsc::channel(8);
        let recorder = ClipRecorder::new(stream.frames, clip_tx);
        let capture_task = match self.config.capture_mode {
            CaptureMode::Continuous => tokio::spawn(
                recorder.run_continuous(self.config.flush_interval, shutdown_rx.clone()),
            ),
            CaptureMode::OnDemand => {
                let (trigger_tx, trigger_rx) = mpsc::channel(1);
                *self.capture_trigger.lock().unwrap() = Some(trigger_tx);
                tokio::spawn(recorder.run_on_demand(
                    self.config.on_demand_duration,
                    trigger_rx,
                    Arc::clone(&self.capture_busy),
                    shutdown_rx.clone(),
                ))
            }
        };

        // Classification lane: clips -> debounced transcript entries
        let classify_task = if self.config.enable_remote_classification {
            match &self.classifier {
                Some(classifier) => tokio::spawn(classification_lane(
                    clip_rx,
                    Arc::clone(classifier),
                    DebounceFilter::new(self.config.debounce_window),
                    Arc::clone(&self.transcript),
                    Arc::clone(&self.clips_submitted),
                    Arc::clone(&self.events_emitted),
                    shutdown_rx.clone(),
                )),
                None => {
                    warn!("Remote classification enabled but no classifier wired");
                    tokio::spawn(drain_clips(clip_rx))
                }
            }
        } else {
            tokio::spawn(drain_clips(clip_rx))
        };

        // Speech-recognition collaborator, supervised
        let speech_task = if self.config.enable_speech_recognition {
            match &self.speech {
                Some(recognizer) => Some(tokio::spawn(supervise_speech(
                    Arc::clone(recognizer),
                    Arc::clone(&self.transcript),
                    shutdown_rx,
                ))),
                None => {
                    warn!("Speech recognition enabled but no recognizer wired");
                    None
                }
            }
        } else {
            None
        };

        *self.shutdown_tx.lock().unwrap() = Some(shutdown_tx);
        *self.monitor_task.lock().await = Some(monitor_task);
        *self.capture_task.lock().await = Some(capture_task);
        *self.classify_task.lock().await = Some(classify_task);
        *self.speech_task.lock().await = speech_task;

        info!("Session started");
        Ok(())
    }

    /// Stop the session and release the audio device.
    ///
    /// Idempotent: stopping an idle session is a no-op. Teardown completes
    /// even if a lane already failed, and never blocks on in-flight
    /// classification requests.
    pub async fn stop(&self) -> Result<(), SessionError> {
        let _op = self.op_lock.lock().await;

        if self.state() == SessionState::Idle {
            warn!("Session not active");
            return Ok(());
        }

        info!("Stopping session: {}", self.config.session_id);
        self.transition(SessionState::Stopping)?;

        if let Some(shutdown_tx) = self.shutdown_tx.lock().unwrap().take() {
            let _ = shutdown_tx.send(true);
        }
        *self.capture_trigger.lock().unwrap() = None;

        // Monitor and capture lanes exit on the shutdown signal
        if let Some(task) = self.monitor_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Loudness monitor task panicked: {}", e);
            }
        }
        if let Some(task) = self.capture_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Clip recorder task panicked: {}", e);
            }
        }

        // Abandon in-flight classification; shutdown never waits on the network
        if let Some(task) = self.classify_task.lock().await.take() {
            task.abort();
            let _ = task.await;
        }

        if let Some(task) = self.speech_task.lock().await.take() {
            if let Err(e) = task.await {
                error!("Speech supervisor task panicked: {}", e);
            }
        }

        // Release the device even if a lane failed
        {
            let mut source = self.source.lock().await;
            if let Err(e) = source.release().await {
                error!("Failed to release audio source: {}", e);
            }
        }

        self.capture_busy.store(false, Ordering::SeqCst);
        self.level_sink.level_changed(0.0);
        self.transition(SessionState::Idle)?;

        info!("Session stopped");
        Ok(())
    }

    /// Trigger a single on-demand capture.
    ///
    /// Button/latch discipline: a trigger while one is in flight is
    /// rejected, never queued.
    pub fn capture_now(&self) -> Result<(), CaptureError> {
        if self.state() != SessionState::Running {
            return Err(CaptureError::NotAvailable("session not running".into()));
        }
        if self.config.capture_mode != CaptureMode::OnDemand {
            return Err(CaptureError::NotAvailable(
                "session not in on-demand mode".into(),
            ));
        }

        if self
            .capture_busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::CaptureInProgress);
        }

        let sent = self
            .capture_trigger
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.try_send(()).is_ok())
            .unwrap_or(false);

        if !sent {
            self.capture_busy.store(false, Ordering::SeqCst);
            return Err(CaptureError::StreamClosed);
        }

        Ok(())
    }
}

/// Consume clips when no classifier is wired so the capture lane never
/// blocks on a full channel.
async fn drain_clips(mut clips: mpsc::Receiver<AudioClip>) {
    while clips.recv().await.is_some() {}
}

/// The classification lane: submit every clip, tolerate out-of-order
/// completions, and turn results into debounced transcript entries.
async fn classification_lane(
    mut clips: mpsc::Receiver<AudioClip>,
    classifier: Arc<dyn Classifier>,
    mut debounce: DebounceFilter,
    transcript: Arc<dyn TranscriptSink>,
    clips_submitted: Arc<AtomicUsize>,
    events_emitted: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Classification lane started");

    let mut in_flight = FuturesUnordered::new();

    loop {
        tokio::select! {
            maybe_clip = clips.recv() => match maybe_clip {
                Some(clip) => {
                    clips_submitted.fetch_add(1, Ordering::SeqCst);
                    let classifier = Arc::clone(&classifier);
                    in_flight.push(async move { classifier.classify(clip).await });
                }
                None => {
                    // Clip source gone; finish what is already in flight
                    while let Some(outcome) = in_flight.next().await {
                        handle_outcome(outcome, &mut debounce, &transcript, &events_emitted);
                    }
                    break;
                }
            },
            Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                handle_outcome(outcome, &mut debounce, &transcript, &events_emitted);
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Classification lane stopped");
}

fn handle_outcome(
    outcome: Result<ClassificationResult, ClassificationError>,
    debounce: &mut DebounceFilter,
    transcript: &Arc<dyn TranscriptSink>,
    events_emitted: &AtomicUsize,
) {
    match outcome {
        Ok(result) => {
            if !result.is_important {
                return;
            }

            // Suppression bookkeeping uses this result's own arrival time
            let arrival = Instant::now();

            for label in &result.labels {
                if debounce.admit(label, arrival) {
                    events_emitted.fetch_add(1, Ordering::SeqCst);
                    transcript.append(TranscriptEntry::event(label.clone()));
                }
            }

            if !result.speech.is_empty() {
                transcript.append(TranscriptEntry::speech(result.speech));
            }
        }
        Err(e) => {
            warn!("Classification failed: {}", e);
            transcript.append(TranscriptEntry::error(e.to_string()));
        }
    }
}

/// Keep the speech-recognition collaborator alive while the session runs.
///
/// Restart is immediate on any termination; once shutdown is signaled the
/// recognizer is never restarted.
async fn supervise_speech(
    recognizer: Arc<dyn SpeechRecognizer>,
    transcript: Arc<dyn TranscriptSink>,
    shutdown: watch::Receiver<bool>,
) {
    info!("Speech recognition supervisor started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let mut shutdown_changed = shutdown.clone();
        let outcome = tokio::select! {
            result = recognizer.run(Arc::clone(&transcript), shutdown.clone()) => Some(result),
            _ = shutdown_changed.changed() => None,
        };

        match outcome {
            Some(_) if *shutdown.borrow() => break,
            Some(Ok(())) => warn!("Speech recognizer ended unexpectedly; restarting"),
            Some(Err(e)) => warn!("Speech recognizer failed: {}; restarting", e),
            None => break,
        }
    }

    info!("Speech recognition supervisor stopped");
}
