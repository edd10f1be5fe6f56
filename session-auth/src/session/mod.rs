//! The shared authentication session.

mod controller;
mod state;

pub use controller::{Navigation, SessionController};
pub use state::SessionState;
