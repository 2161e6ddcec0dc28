//! Auth-failure window
//!
//! While the user has an authentication or subscription problem to
//! resolve, ordinary backend state pushes and stop commands are dropped
//! (not queued) so the sign-in prompt cannot be painted over. The window
//! is bounded: an explicit dismissal or the timeout clears it.

use crate::backend::BackendPort;
use crate::bridge::Event;
use crate::config::TimingConfig;
use crate::session::{SessionState, SessionStateStore, StateRequest};
use crate::timer::{TimerId, TimerService};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AuthFailureGuard {
    active: bool,
    timing: TimingConfig,
    timers: Arc<TimerService>,
    backend: Arc<dyn BackendPort>,
    events: tokio::sync::mpsc::UnboundedSender<Event>,
}

impl AuthFailureGuard {
    pub fn new(
        timing: TimingConfig,
        timers: Arc<TimerService>,
        backend: Arc<dyn BackendPort>,
        events: tokio::sync::mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            active: false,
            timing,
            timers,
            backend,
            events,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Open the window and arm its timeout
    pub fn activate(&mut self) {
        info!("auth failure window opened ({:?})", self.timing.auth_window());
        self.active = true;
        let events = self.events.clone();
        self.timers
            .start(TimerId::AuthDismiss, self.timing.auth_window(), false, move || {
                let _ = events.send(Event::AuthWindowElapsed);
            });
    }

    /// Close the window (explicit user action or timeout) and return the
    /// session to idle
    pub fn dismiss(&mut self, store: &mut SessionStateStore) {
        if !self.active {
            return;
        }
        info!("auth failure window closed");
        self.timers.cancel(TimerId::AuthDismiss);
        self.active = false;
        store.apply_state(StateRequest::to(SessionState::Idle));

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.signal_reset_complete().await {
                warn!("reset acknowledgement failed: {:#}", e);
            }
        });
    }
}
