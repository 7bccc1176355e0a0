//! Real-Time Runtime (non-deterministic)
//!
//! Timers, channels and the session task that feeds the deterministic
//! `game` module.

pub mod session;

pub use session::{spawn_session, SessionCommand, SessionError, SessionHandle, SessionSummary};
