//! Identity and message persistence for the chat gateway.
//!
//! - [`IdentityVerifier`]: bearer token → [`UserContext`]
//! - [`MessageStore`]: typed, TTL-aware access to the message table, with
//!   an in-process implementation and a PostgREST-backed one
//! - [`Clock`]: time source; stores stamp rows through a
//!   [`MonotonicClock`] so a user's log never ties on `created_at`

pub mod clock;
pub mod identity;
pub mod memory;
pub mod rest;
pub mod store;

pub use clock::{Clock, ManualClock, MonotonicClock, SystemClock};
pub use identity::{IdentityVerifier, RestIdentityVerifier, UserContext};
pub use memory::MemoryMessageStore;
pub use rest::RestMessageStore;
pub use store::MessageStore;
