//! Session state ownership
//!
//! This module holds the canonical state container:
//! - The closed [`SessionState`] enum shared with the backend process
//! - The [`Session`] snapshot published to UI observers
//! - The [`SessionStateStore`], the one place state is mutated
//! - The window-size mapping applied after every committed transition

mod state;
mod store;
mod window;

pub use state::{ErrorClass, ErrorPayload, Session, SessionState, StateRequest};
pub use store::SessionStateStore;
pub use window::size_for;
