pub mod client;
pub mod google;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use client::{ModelClient, Reply};
pub use google::GoogleProvider;
pub use traits::{ChatModel, GenerateRequest, GenerateResponse};
