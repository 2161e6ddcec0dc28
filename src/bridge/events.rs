use crate::edit::EditPhase;
use anyhow::{bail, Context, Result};
use serde_json::Value;

/// A backend-pushed notification, normalized from the wire
///
/// The backend emits `(name, payload)` pairs over its event channel;
/// names may carry the `fethr-` channel prefix. Payload shapes are
/// heterogeneous, so parsing happens here at the boundary and the rest
/// of the coordinator only ever sees this closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The backend's authoritative view of the current state
    StateSync { state: String },
    /// The native hotkey listener began a recording
    StartRecording,
    /// The hotkey resolved to "stop and transcribe"
    StopAndTranscribe { auto_paste: bool },
    /// A transcription landed on the clipboard
    CopiedToClipboard,
    /// The backend hit an error worth surfacing
    ErrorOccurred { message: String },
    /// Authentication/subscription must be resolved before transcribing
    AuthRequired,
}

impl Notification {
    /// Normalize a raw wire event
    pub fn from_wire(name: &str, payload: &Value) -> Result<Self> {
        let name = name.strip_prefix("fethr-").unwrap_or(name);
        match name {
            "state-sync" | "update-ui-state" => {
                let state = payload
                    .get("state")
                    .and_then(Value::as_str)
                    .or_else(|| payload.as_str())
                    .context("state-sync payload has no state literal")?;
                Ok(Self::StateSync {
                    state: state.to_string(),
                })
            }
            "start-recording" => Ok(Self::StartRecording),
            "stop-and-transcribe" => {
                // Emitted both as a bare bool and as an object
                let auto_paste = payload
                    .as_bool()
                    .or_else(|| payload.get("auto_paste").and_then(Value::as_bool))
                    .unwrap_or(false);
                Ok(Self::StopAndTranscribe { auto_paste })
            }
            "copied-to-clipboard" => Ok(Self::CopiedToClipboard),
            "error-occurred" => {
                let message = payload
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| payload.as_str())
                    .context("error-occurred payload has no message")?;
                Ok(Self::ErrorOccurred {
                    message: message.to_string(),
                })
            }
            "auth-required" => Ok(Self::AuthRequired),
            other => bail!("unknown notification {:?}", other),
        }
    }
}

/// Everything the coordinator loop processes, in arrival order
///
/// Backend notifications, user actions, and the coordinator's own timer
/// fires and promise settlements all flow through the same channel; a
/// continuation re-entering the loop is just another event subject to
/// the same arbitration rules.
#[derive(Debug)]
pub enum Event {
    Notification(Notification),

    /// The backend stop/transcribe call settled
    TranscriptionSettled {
        /// Epoch of the request; stale settlements are discarded
        generation: u64,
        outcome: Result<String, String>,
    },

    /// An edit-sequence phase timer fired
    EditPhaseElapsed { phase: EditPhase, generation: u64 },

    /// An error banner's auto-dismiss countdown ran out
    ErrorDismissElapsed { generation: u64 },

    /// The auth-failure window timed out
    AuthWindowElapsed,

    /// Recording duration ticker
    DurationTick,

    /// A window resize request finished (successfully or not)
    ResizeSettled { generation: u64 },

    /// The user asked to edit the fresh transcription
    EditRequested,

    /// The user dismissed the error banner or the auth prompt
    DismissRequested,

    /// Stop the loop and tear everything down
    Shutdown,
}

impl From<Notification> for Event {
    fn from(notification: Notification) -> Self {
        Event::Notification(notification)
    }
}
