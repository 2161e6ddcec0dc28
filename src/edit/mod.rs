//! Quick-edit sequence
//!
//! Once a transcription lands on the clipboard the pill flashes SUCCESS,
//! then holds an edit-ready window, then reverts to idle:
//!
//! `INACTIVE -> SUCCESS (success_hold) -> IDLE_EDIT_READY (edit_ready) -> INACTIVE`
//!
//! Beginning a new sequence supersedes a live one. Timer fires re-enter
//! the coordinator loop tagged with a generation; a fire from a
//! superseded chain is dropped.

use crate::backend::BackendPort;
use crate::bridge::Event;
use crate::config::TimingConfig;
use crate::session::{SessionStateStore, SessionState, StateRequest};
use crate::timer::{TimerId, TimerService};
use std::sync::Arc;
use tracing::{debug, warn};

/// The two timed phases of the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    SuccessHold,
    EditReady,
}

pub struct EditSequenceController {
    active: bool,
    generation: u64,
    timing: TimingConfig,
    timers: Arc<TimerService>,
    backend: Arc<dyn BackendPort>,
    events: tokio::sync::mpsc::UnboundedSender<Event>,
}

impl EditSequenceController {
    pub fn new(
        timing: TimingConfig,
        timers: Arc<TimerService>,
        backend: Arc<dyn BackendPort>,
        events: tokio::sync::mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            active: false,
            generation: 0,
            timing,
            timers,
            backend,
            events,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start (or restart) the sequence
    ///
    /// A live chain is superseded, never stacked: the old timers are
    /// cancelled and the countdown restarts from now. `text` replaces the
    /// session transcription when given, otherwise whatever the session
    /// already carries is kept.
    pub fn begin(&mut self, text: Option<String>, store: &mut SessionStateStore) {
        if self.active {
            debug!("edit sequence restarted, superseding the live chain");
        }
        self.generation += 1;
        self.cancel_timers();
        self.active = true;

        let text = text.or_else(|| store.session().transcription_text.clone());
        store.apply_state(StateRequest::success(text));

        self.arm_phase(EditPhase::SuccessHold, self.timing.success_hold());
    }

    /// A phase timer fired; ignored when the chain it belonged to is no
    /// longer the live one
    pub fn on_phase_elapsed(
        &mut self,
        phase: EditPhase,
        generation: u64,
        store: &mut SessionStateStore,
    ) {
        if !self.active || generation != self.generation {
            debug!("stale edit phase fire ({:?}, generation {})", phase, generation);
            return;
        }
        match phase {
            EditPhase::SuccessHold => {
                store.apply_state(StateRequest::to(SessionState::IdleEditReady));
                self.arm_phase(EditPhase::EditReady, self.timing.edit_ready());
            }
            EditPhase::EditReady => self.end(store),
        }
    }

    /// Finish the sequence: revert to idle and acknowledge the reset to
    /// the backend (fire-and-forget)
    ///
    /// Called on edit-ready expiry, on the user's explicit edit action,
    /// and on preemption by an incoming state push or error.
    pub fn end(&mut self, store: &mut SessionStateStore) {
        if !self.active {
            return;
        }
        self.teardown();
        store.apply_state(StateRequest::to(SessionState::Idle));

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.signal_reset_complete().await {
                warn!("reset acknowledgement failed: {:#}", e);
            }
        });
    }

    /// Silent preemption: cancel the chain without the idle hop or the
    /// reset signal
    ///
    /// Used when the caller immediately applies another state and owns
    /// the reset acknowledgement itself (a new recording starting).
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.active = false;
        self.generation += 1;
    }

    fn arm_phase(&self, phase: EditPhase, delay: std::time::Duration) {
        let id = match phase {
            EditPhase::SuccessHold => TimerId::EditSuccessHold,
            EditPhase::EditReady => TimerId::EditReadyWindow,
        };
        let generation = self.generation;
        let events = self.events.clone();
        self.timers.start(id, delay, false, move || {
            let _ = events.send(Event::EditPhaseElapsed { phase, generation });
        });
    }

    fn cancel_timers(&self) {
        self.timers.cancel(TimerId::EditSuccessHold);
        self.timers.cancel(TimerId::EditReadyWindow);
    }
}
