//! Shared types for the YamiFit assistant gateway: the chat message model,
//! fixed limits, configuration, the common error type and trace events.

pub mod config;
pub mod error;
pub mod limits;
pub mod message;
pub mod trace;

pub use error::{Error, Result};
pub use message::{Message, NewMessage, Role, SessionView, WireMessage};
