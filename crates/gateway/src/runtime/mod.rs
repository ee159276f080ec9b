//! Core runtime: the send-turn engine and the TTL reaper.

pub mod engine;
pub mod reaper;

pub use engine::{validate_text, SendInput, SessionEngine, TurnOutcome};
pub use reaper::Reaper;
