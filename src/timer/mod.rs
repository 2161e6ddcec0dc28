//! Named, cancellable timers
//!
//! Each timer is identified by a [`TimerId`]; starting an id that is
//! already running supersedes the previous instance. This is what gives
//! the edit-sequence chain and the duration ticker their "restart, never
//! stack" semantics.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The closed set of timers the coordinator owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Recording duration ticker (repeating)
    Duration,
    /// SUCCESS flash before the quick-edit window opens
    EditSuccessHold,
    /// Quick-edit window countdown
    EditReadyWindow,
    /// Error banner auto-dismiss
    ErrorDismiss,
    /// Auth-failure window auto-dismiss
    AuthDismiss,
}

pub struct TimerService {
    timers: Mutex<HashMap<TimerId, JoinHandle<()>>>,
}

impl TimerService {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) a timer
    ///
    /// One-shot timers invoke the callback once after `delay`; repeating
    /// timers invoke it every `delay` starting one period from now.
    /// Any running timer with the same id is cancelled first.
    pub fn start<F>(&self, id: TimerId, delay: Duration, repeat: bool, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            if repeat {
                let mut interval = tokio::time::interval(delay);
                // The first tick of a tokio interval fires immediately
                interval.tick().await;
                loop {
                    interval.tick().await;
                    callback();
                }
            } else {
                tokio::time::sleep(delay).await;
                callback();
            }
        });

        let mut timers = self.timers.lock().expect("timer map poisoned");
        if let Some(previous) = timers.insert(id, handle) {
            previous.abort();
        }
    }

    /// Cancel a timer; a no-op when nothing is running under `id`
    pub fn cancel(&self, id: TimerId) {
        let mut timers = self.timers.lock().expect("timer map poisoned");
        if let Some(handle) = timers.remove(&id) {
            handle.abort();
        }
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        let timers = self.timers.lock().expect("timer map poisoned");
        timers.get(&id).map(|h| !h.is_finished()).unwrap_or(false)
    }

    pub fn cancel_all(&self) {
        let mut timers = self.timers.lock().expect("timer map poisoned");
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
