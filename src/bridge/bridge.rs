use super::events::{Event, Notification};
use crate::auth::AuthFailureGuard;
use crate::backend::BackendPort;
use crate::config::TimingConfig;
use crate::edit::EditSequenceController;
use crate::session::{ErrorClass, Session, SessionState, SessionStateStore, StateRequest};
use crate::timer::TimerService;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Backend responses for a redundant stop; swallowed with no state change
fn is_duplicate_stop(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("not currently recording")
        || lower.contains("already stopping")
        || lower.contains("already in progress")
}

/// The arbitration point between backend pushes, user actions, and the
/// coordinator's own timers
///
/// Runs as a single task consuming one channel, so no two events are
/// ever handled concurrently; a backend promise settling re-enters the
/// loop as a fresh event and is re-checked against the guards that hold
/// at that point.
struct EventBridge {
    store: SessionStateStore,
    edit: EditSequenceController,
    auth: AuthFailureGuard,
    timers: Arc<TimerService>,
    backend: Arc<dyn BackendPort>,
    events: mpsc::UnboundedSender<Event>,

    /// Bumped on every start and stop; a transcription settlement from
    /// an older epoch is stale and discarded
    transcription_epoch: u64,
}

impl EventBridge {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>) {
        info!("coordinator loop started");
        while let Some(event) = rx.recv().await {
            if matches!(event, Event::Shutdown) {
                break;
            }
            self.handle(event).await;
        }
        self.timers.cancel_all();
        info!("coordinator loop stopped");
    }

    async fn handle(&mut self, event: Event) {
        match event {
            Event::Notification(notification) => self.on_notification(notification).await,
            Event::TranscriptionSettled {
                generation,
                outcome,
            } => self.on_transcription_settled(generation, outcome),
            Event::EditPhaseElapsed { phase, generation } => {
                self.edit.on_phase_elapsed(phase, generation, &mut self.store)
            }
            Event::ErrorDismissElapsed { generation } => {
                self.store.error_dismiss_elapsed(generation)
            }
            Event::AuthWindowElapsed => self.auth.dismiss(&mut self.store),
            Event::DurationTick => self.store.refresh_duration(),
            Event::ResizeSettled { generation } => self.store.resize_settled(generation),
            Event::EditRequested => self.edit.end(&mut self.store),
            Event::DismissRequested => self.on_dismiss_requested(),
            Event::Shutdown => unreachable!("handled by the loop"),
        }
    }

    async fn on_notification(&mut self, notification: Notification) {
        match notification {
            Notification::StateSync { state } => self.on_state_sync(&state),
            Notification::StartRecording => self.on_start_recording().await,
            Notification::StopAndTranscribe { auto_paste } => {
                self.on_stop_and_transcribe(auto_paste)
            }
            Notification::CopiedToClipboard => self.edit.begin(None, &mut self.store),
            Notification::ErrorOccurred { message } => {
                self.edit.end(&mut self.store);
                self.store
                    .apply_state(StateRequest::error(message, ErrorClass::Notification));
            }
            Notification::AuthRequired => {
                self.edit.end(&mut self.store);
                self.store.apply_state(StateRequest::auth_error());
                self.auth.activate();
            }
        }
    }

    fn on_state_sync(&mut self, literal: &str) {
        if self.auth.is_active() {
            debug!("auth window active, dropping state sync {:?}", literal);
            return;
        }
        let target = SessionState::parse_literal(literal);
        if target == SessionState::Idle && self.edit.is_active() {
            // The edit sequence keeps authority over when idle happens
            debug!("edit sequence active, dropping idle sync");
            return;
        }
        self.edit.end(&mut self.store);
        self.store.apply_state(StateRequest::to(target));
    }

    async fn on_start_recording(&mut self) {
        if self.edit.is_active() {
            // Tear the sequence down silently, then wait for the backend
            // to acknowledge the reset before starting; firing the start
            // while the native listener is still mid-reset races its
            // internal state.
            self.edit.teardown();
            if let Err(e) = self.backend.signal_reset_complete().await {
                warn!("reset acknowledgement failed: {:#}", e);
            }
        }
        self.transcription_epoch += 1;

        if let Err(e) = self.backend.start_recording().await {
            warn!("start-recording request failed: {:#}", e);
            self.store.apply_state(StateRequest::error(
                format!("Failed to start recording: {e}"),
                ErrorClass::Backend,
            ));
            return;
        }

        // Optimistic: the backend confirms via a later state sync
        self.store.apply_state(StateRequest::to(SessionState::Recording));
    }

    fn on_stop_and_transcribe(&mut self, auto_paste: bool) {
        if self.auth.is_active() {
            debug!("auth window active, dropping stop-and-transcribe");
            return;
        }
        self.edit.end(&mut self.store);

        self.transcription_epoch += 1;
        let generation = self.transcription_epoch;

        self.store.apply_state(StateRequest::to(SessionState::Transcribing));

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend
                .stop_and_transcribe(auto_paste)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = events.send(Event::TranscriptionSettled {
                generation,
                outcome,
            });
        });
    }

    fn on_transcription_settled(&mut self, generation: u64, outcome: Result<String, String>) {
        if generation != self.transcription_epoch {
            debug!("stale transcription settlement (epoch {})", generation);
            return;
        }
        if self.auth.is_active() {
            debug!("auth window active, dropping transcription result");
            return;
        }
        match outcome {
            Ok(text) if text.trim().is_empty() => {
                debug!("empty transcription result, nothing to do");
            }
            Ok(text) => self.edit.begin(Some(text), &mut self.store),
            Err(message) if is_duplicate_stop(&message) => {
                debug!("redundant stop swallowed: {}", message);
            }
            Err(message) => {
                warn!("stop-and-transcribe failed: {}", message);
                self.edit.end(&mut self.store);
                self.store
                    .apply_state(StateRequest::error(message, ErrorClass::Backend));
            }
        }
    }

    fn on_dismiss_requested(&mut self) {
        if self.auth.is_active() {
            self.auth.dismiss(&mut self.store);
        } else if self.store.session().state == SessionState::Error {
            self.store.apply_state(StateRequest::to(SessionState::Idle));
        }
    }
}

/// Handle to a running coordinator
///
/// Owns the loop task; events go in through [`notify`](Self::notify) /
/// [`send`](Self::send), snapshots come out through the watch channel.
pub struct Coordinator {
    events: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Session>,
    task: JoinHandle<()>,
}

impl Coordinator {
    /// Wire up the store, controllers, and timers, and spawn the loop
    pub fn spawn(timing: TimingConfig, backend: Arc<dyn BackendPort>) -> Self {
        let (events, rx) = mpsc::unbounded_channel();
        let timers = Arc::new(TimerService::new());

        let (store, snapshots) = SessionStateStore::new(
            timing.clone(),
            Arc::clone(&timers),
            Arc::clone(&backend),
            events.clone(),
        );
        let edit = EditSequenceController::new(
            timing.clone(),
            Arc::clone(&timers),
            Arc::clone(&backend),
            events.clone(),
        );
        let auth = AuthFailureGuard::new(
            timing,
            Arc::clone(&timers),
            Arc::clone(&backend),
            events.clone(),
        );

        let bridge = EventBridge {
            store,
            edit,
            auth,
            timers,
            backend,
            events: events.clone(),
            transcription_epoch: 0,
        };
        let task = tokio::spawn(bridge.run(rx));

        Self {
            events,
            snapshots,
            task,
        }
    }

    /// Feed a normalized backend notification into the loop
    pub fn notify(&self, notification: Notification) -> Result<()> {
        self.send(notification.into())
    }

    /// Feed a raw wire event into the loop
    pub fn dispatch_wire(&self, name: &str, payload: &serde_json::Value) -> Result<()> {
        let notification = Notification::from_wire(name, payload)
            .with_context(|| format!("bad wire event {name:?}"))?;
        self.notify(notification)
    }

    /// Feed a user-originated or internal event into the loop
    pub fn send(&self, event: Event) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow::anyhow!("coordinator loop is gone"))
    }

    /// Current session snapshot
    pub fn snapshot(&self) -> Session {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to session snapshots
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.snapshots.clone()
    }

    /// Stop the loop and wait for teardown
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.events.send(Event::Shutdown);
        self.task.await.context("coordinator loop panicked")
    }
}
