use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// What the app is currently doing
///
/// This is the single source of truth the pill UI renders from. The
/// backend process exchanges these as UPPERCASE string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionState {
    Idle,
    Recording,
    LockedRecording,
    Transcribing,
    Success,
    IdleEditReady,
    Error,
    Pasting,
}

impl SessionState {
    /// Parse a wire literal, case-insensitively
    ///
    /// An unrecognized literal maps to `Idle` with a warning rather than
    /// failing the whole notification; the backend and UI have drifted
    /// before and a stuck pill is worse than a reset one.
    pub fn parse_literal(literal: &str) -> Self {
        match literal.to_ascii_uppercase().as_str() {
            "IDLE" => Self::Idle,
            "RECORDING" => Self::Recording,
            "LOCKEDRECORDING" | "LOCKED_RECORDING" => Self::LockedRecording,
            "TRANSCRIBING" => Self::Transcribing,
            "SUCCESS" => Self::Success,
            "IDLEEDITREADY" | "IDLE_EDIT_READY" => Self::IdleEditReady,
            "ERROR" => Self::Error,
            "PASTING" => Self::Pasting,
            other => {
                warn!("unknown state literal {:?}, falling back to IDLE", other);
                Self::Idle
            }
        }
    }

    /// True for the two states in which audio is being captured
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording | Self::LockedRecording)
    }

    /// True for the two states allowed to carry transcription text
    pub fn carries_transcription(&self) -> bool {
        matches!(self, Self::Success | Self::IdleEditReady)
    }
}

/// Which countdown an error banner gets before auto-dismissing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Error pushed by the backend as a notification
    Notification,
    /// A backend start/stop invocation rejected
    Backend,
    /// Authentication/subscription problem; dismissal is owned by the
    /// auth-failure guard, not the error timer
    Auth,
}

#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub message: String,
    pub show_upgrade_prompt: bool,
    pub class: ErrorClass,
}

impl ErrorPayload {
    /// Fallback for error states synced without any payload
    pub fn generic() -> Self {
        Self {
            message: "Something went wrong".to_string(),
            show_upgrade_prompt: false,
            class: ErrorClass::Notification,
        }
    }
}

/// Whether an error message should surface the upgrade call-to-action
///
/// The backend's over-quota rejection reads "Word limit exceeded ...
/// Please upgrade your plan."
pub(crate) fn wants_upgrade_prompt(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("word limit") || lower.contains("upgrade")
}

/// A requested transition, with whatever payload the target state needs
#[derive(Debug, Clone)]
pub struct StateRequest {
    pub state: SessionState,
    pub transcription_text: Option<String>,
    pub error: Option<ErrorPayload>,
}

impl StateRequest {
    pub fn to(state: SessionState) -> Self {
        Self {
            state,
            transcription_text: None,
            error: None,
        }
    }

    pub fn success(transcription_text: Option<String>) -> Self {
        Self {
            state: SessionState::Success,
            transcription_text,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>, class: ErrorClass) -> Self {
        let message = message.into();
        let show_upgrade_prompt = wants_upgrade_prompt(&message);
        Self {
            state: SessionState::Error,
            transcription_text: None,
            error: Some(ErrorPayload {
                message,
                show_upgrade_prompt,
                class,
            }),
        }
    }

    /// The guarded error variant raised by an auth-required push
    pub fn auth_error() -> Self {
        Self {
            state: SessionState::Error,
            transcription_text: None,
            error: Some(ErrorPayload {
                message: "Please sign in to continue transcribing".to_string(),
                show_upgrade_prompt: true,
                class: ErrorClass::Auth,
            }),
        }
    }
}

/// Snapshot of the session, published to UI observers after every commit
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub state: SessionState,

    /// Elapsed recording time; meaningful only while recording
    pub duration_ms: u64,

    /// Present only in `Success` and `IdleEditReady`
    pub transcription_text: Option<String>,

    /// Present only in `Error`
    pub error_message: Option<String>,

    /// Valid only in `Error`
    pub show_upgrade_prompt: bool,

    /// True while a window resize request is in flight (advisory)
    pub is_resizing: bool,

    /// Identifier of the recording in progress, for log correlation
    pub recording_id: Option<Uuid>,

    /// When the recording in progress started
    pub recording_started_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            duration_ms: 0,
            transcription_text: None,
            error_message: None,
            show_upgrade_prompt: false,
            is_resizing: false,
            recording_id: None,
            recording_started_at: None,
        }
    }
}
