use super::state::{ErrorClass, ErrorPayload, Session, SessionState, StateRequest};
use super::window;
use crate::backend::BackendPort;
use crate::bridge::Event;
use crate::config::TimingConfig;
use crate::timer::{TimerId, TimerService};
use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};
use uuid::Uuid;

/// The canonical state container
///
/// This is the only place session state is mutated. Every transition
/// runs exit actions for the old state, then entry actions for the new
/// one, then publishes a snapshot to observers and fires the advisory
/// window resize. Internal faults never escape `apply_state`; they are
/// logged and resolved by forcing a reset to idle.
pub struct SessionStateStore {
    session: Session,
    recording_started: Option<tokio::time::Instant>,

    /// Bumped on each error entry so a stale dismiss fire is ignored
    error_generation: u64,

    /// Bumped on each resize request so only the latest settle clears
    /// the advisory flag
    resize_generation: u64,
    last_requested_size: Option<(u32, u32)>,

    timing: TimingConfig,
    timers: Arc<TimerService>,
    backend: Arc<dyn BackendPort>,
    events: mpsc::UnboundedSender<Event>,
    observers: watch::Sender<Session>,
}

impl SessionStateStore {
    pub fn new(
        timing: TimingConfig,
        timers: Arc<TimerService>,
        backend: Arc<dyn BackendPort>,
        events: mpsc::UnboundedSender<Event>,
    ) -> (Self, watch::Receiver<Session>) {
        let (observers, snapshots) = watch::channel(Session::default());
        let store = Self {
            session: Session::default(),
            recording_started: None,
            error_generation: 0,
            resize_generation: 0,
            last_requested_size: None,
            timing,
            timers,
            backend,
            events,
            observers,
        };
        (store, snapshots)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply a requested transition
    ///
    /// Never panics or propagates: a fault in the transition logic is
    /// logged and resolved by a forced reset to idle.
    pub fn apply_state(&mut self, req: StateRequest) {
        let target = req.state;
        if let Err(e) = self.transition(req) {
            error!("transition to {:?} failed: {:#}; forcing reset", target, e);
            self.force_reset();
            return;
        }
        self.request_resize();
        self.publish();
    }

    fn transition(&mut self, req: StateRequest) -> Result<()> {
        if req.error.is_some() && req.state != SessionState::Error {
            bail!("error payload attached to a {:?} request", req.state);
        }
        if req.transcription_text.is_some() && !req.state.carries_transcription() {
            bail!("transcription text attached to a {:?} request", req.state);
        }

        if req.state == self.session.state {
            self.merge_payload(req);
            return Ok(());
        }

        let prev = self.session.state;
        debug!("state {:?} -> {:?}", prev, req.state);
        self.exit_actions(prev, req.state);
        self.session.state = req.state;
        self.entry_actions(prev, req);
        Ok(())
    }

    /// Same-state requests refresh the payload without re-running
    /// entry/exit actions
    fn merge_payload(&mut self, req: StateRequest) {
        match req.state {
            SessionState::Error => {
                if let Some(payload) = req.error {
                    let class = payload.class;
                    self.session.error_message = Some(payload.message);
                    self.session.show_upgrade_prompt = payload.show_upgrade_prompt;
                    if class != ErrorClass::Auth {
                        self.arm_error_dismiss(class);
                    }
                }
            }
            SessionState::Success => {
                if req.transcription_text.is_some() {
                    self.session.transcription_text = req.transcription_text;
                }
            }
            _ => {}
        }
    }

    fn exit_actions(&mut self, prev: SessionState, next: SessionState) {
        // Leaving the recording pair stops the ticker; the duration value
        // itself is only touched by the next state's entry actions.
        if prev.is_recording() && !next.is_recording() {
            self.timers.cancel(TimerId::Duration);
        }
        if prev == SessionState::Error {
            self.timers.cancel(TimerId::ErrorDismiss);
            self.session.error_message = None;
            self.session.show_upgrade_prompt = false;
        }
    }

    fn entry_actions(&mut self, prev: SessionState, req: StateRequest) {
        match req.state {
            SessionState::Idle => {
                self.session.transcription_text = None;
                self.session.error_message = None;
                self.session.show_upgrade_prompt = false;
                self.session.duration_ms = 0;
                self.session.recording_id = None;
                self.session.recording_started_at = None;
                self.recording_started = None;
            }
            SessionState::Recording | SessionState::LockedRecording => {
                self.session.transcription_text = None;
                // Locking an in-progress recording keeps the running
                // clock; only a fresh recording restarts it.
                if !prev.is_recording() {
                    let id = Uuid::new_v4();
                    info!("recording {} started", id);
                    self.session.recording_id = Some(id);
                    self.session.recording_started_at = Some(Utc::now());
                    self.session.duration_ms = 0;
                    self.recording_started = Some(tokio::time::Instant::now());
                    self.start_duration_ticker();
                }
            }
            SessionState::Transcribing => {
                self.session.transcription_text = None;
                self.session.error_message = None;
            }
            SessionState::Success => {
                self.session.transcription_text = req.transcription_text;
            }
            SessionState::IdleEditReady => {
                // Keeps the transcription from the preceding SUCCESS
            }
            SessionState::Error => {
                let payload = req.error.unwrap_or_else(ErrorPayload::generic);
                let class = payload.class;
                self.session.transcription_text = None;
                self.session.error_message = Some(payload.message);
                self.session.show_upgrade_prompt = payload.show_upgrade_prompt;
                if class != ErrorClass::Auth {
                    self.arm_error_dismiss(class);
                }
            }
            SessionState::Pasting => {
                self.session.transcription_text = None;
            }
        }
    }

    fn start_duration_ticker(&self) {
        let events = self.events.clone();
        self.timers.start(
            TimerId::Duration,
            self.timing.duration_tick(),
            true,
            move || {
                let _ = events.send(Event::DurationTick);
            },
        );
    }

    fn arm_error_dismiss(&mut self, class: ErrorClass) {
        self.error_generation += 1;
        let generation = self.error_generation;
        let delay = match class {
            ErrorClass::Notification => self.timing.error_dismiss(),
            ErrorClass::Backend => self.timing.backend_error_dismiss(),
            ErrorClass::Auth => self.timing.auth_window(),
        };
        let events = self.events.clone();
        self.timers.start(TimerId::ErrorDismiss, delay, false, move || {
            let _ = events.send(Event::ErrorDismissElapsed { generation });
        });
    }

    /// Duration is recomputed from the recording start instant, never
    /// incremented, so missed ticks under load cannot skew it
    pub fn refresh_duration(&mut self) {
        if !self.session.state.is_recording() {
            // A tick raced the transition out of recording
            return;
        }
        if let Some(started) = self.recording_started {
            self.session.duration_ms = started.elapsed().as_millis() as u64;
            self.publish();
        }
    }

    pub fn error_dismiss_elapsed(&mut self, generation: u64) {
        if generation != self.error_generation {
            debug!("stale error dismiss (generation {})", generation);
            return;
        }
        if self.session.state == SessionState::Error {
            self.apply_state(StateRequest::to(SessionState::Idle));
        }
    }

    pub fn resize_settled(&mut self, generation: u64) {
        if generation != self.resize_generation {
            return;
        }
        if self.session.is_resizing {
            self.session.is_resizing = false;
            self.publish();
        }
    }

    /// Last-resort recovery: drop everything and go back to idle
    pub fn force_reset(&mut self) {
        self.timers.cancel(TimerId::Duration);
        self.timers.cancel(TimerId::ErrorDismiss);
        self.recording_started = None;
        let is_resizing = self.session.is_resizing;
        self.session = Session {
            is_resizing,
            ..Session::default()
        };
        self.request_resize();
        self.publish();
    }

    fn request_resize(&mut self) {
        let (width, height) =
            window::size_for(self.session.state, self.session.show_upgrade_prompt);
        if self.last_requested_size == Some((width, height)) {
            return;
        }
        self.last_requested_size = Some((width, height));
        self.resize_generation += 1;
        self.session.is_resizing = true;
        window::apply(
            Arc::clone(&self.backend),
            self.events.clone(),
            self.resize_generation,
            width,
            height,
        );
    }

    fn publish(&self) {
        self.observers.send_replace(self.session.clone());
    }
}
