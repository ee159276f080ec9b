//! Prompt construction for the nutrition assistant.
//!
//! Pure, I/O-free building blocks: Arabic detection, the fixed identity
//! contract, language-matched fallback replies and the assembler that turns
//! a session window into the role-tagged turns sent to the model.

pub mod assembler;
pub mod contract;
pub mod language;

pub use assembler::{AssembledPrompt, ChatTurn, PromptAssembler, TurnRole};
pub use contract::{fallback_reply, IDENTITY_CONTRACT};
pub use language::detect_arabic;
