//! HTTP gateway for the YamiFit assistant: routes, the send-turn engine,
//! startup wiring and the CLI.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod runtime;
pub mod state;
