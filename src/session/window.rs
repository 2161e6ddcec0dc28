use super::SessionState;
use crate::backend::BackendPort;
use crate::bridge::Event;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

/// Pill geometry per state
///
/// The error banner grows when the upgrade call-to-action is shown.
/// These are logical pixels, matched to the pill window chrome.
pub fn size_for(state: SessionState, show_upgrade_prompt: bool) -> (u32, u32) {
    match state {
        SessionState::Idle => (56, 22),
        SessionState::Recording | SessionState::LockedRecording => (160, 44),
        SessionState::Transcribing | SessionState::Pasting => (160, 44),
        SessionState::Success | SessionState::IdleEditReady => (220, 44),
        SessionState::Error => {
            if show_upgrade_prompt {
                (280, 120)
            } else {
                (280, 80)
            }
        }
    }
}

/// Fire-and-forget resize request
///
/// The resize is advisory geometry: failures are logged and never block
/// or reverse the state transition. Settlement re-enters the event loop
/// so the store can clear its `is_resizing` flag, generation-checked
/// against newer requests.
pub(crate) fn apply(
    backend: Arc<dyn BackendPort>,
    events: mpsc::UnboundedSender<Event>,
    generation: u64,
    width: u32,
    height: u32,
) {
    tokio::spawn(async move {
        if let Err(e) = backend.resize_window(width, height).await {
            warn!("resize request {}x{} failed: {:#}", width, height, e);
        }
        let _ = events.send(Event::ResizeSettled { generation });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size_splits_on_upgrade_prompt() {
        assert_eq!(size_for(SessionState::Error, false), (280, 80));
        assert_eq!(size_for(SessionState::Error, true), (280, 120));
    }

    #[test]
    fn upgrade_flag_only_affects_error_state() {
        for state in [
            SessionState::Idle,
            SessionState::Recording,
            SessionState::LockedRecording,
            SessionState::Transcribing,
            SessionState::Success,
            SessionState::IdleEditReady,
            SessionState::Pasting,
        ] {
            assert_eq!(size_for(state, false), size_for(state, true));
        }
    }
}
