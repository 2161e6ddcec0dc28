pub mod auth;
pub mod backend;
pub mod bridge;
pub mod config;
pub mod edit;
pub mod session;
pub mod timer;

pub use auth::AuthFailureGuard;
pub use backend::{BackendPort, NullBackend};
pub use bridge::{Coordinator, Event, Notification};
pub use config::{Config, TimingConfig};
pub use edit::{EditPhase, EditSequenceController};
pub use session::{
    size_for, ErrorClass, ErrorPayload, Session, SessionState, SessionStateStore, StateRequest,
};
pub use timer::{TimerId, TimerService};
