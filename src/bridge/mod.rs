//! Backend event bridge
//!
//! Normalizes the backend's pushed notifications into a closed internal
//! event set and runs the single-writer coordinator loop that arbitrates
//! them against the edit sequence and the auth-failure window.

mod bridge;
mod events;

pub use bridge::Coordinator;
pub use events::{Event, Notification};
