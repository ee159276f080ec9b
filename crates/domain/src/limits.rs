//! Fixed limits of the chat subsystem.
//!
//! These are deliberately constants rather than configuration: changing the
//! retention window or the generation profile is a deployment, not a knob.

use chrono::Duration;

/// How long a persisted message stays visible, in seconds (24h).
pub const MESSAGE_TTL_SECS: i64 = 86_400;

/// Maximum length of a user message, in Unicode code points.
pub const MAX_INPUT_CHARS: usize = 4_000;

/// Retention window as a [`chrono::Duration`].
pub fn message_ttl() -> Duration {
    Duration::seconds(MESSAGE_TTL_SECS)
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProfile {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

pub const GEN_PROFILE: GenerationProfile = GenerationProfile {
    temperature: 0.7,
    top_p: 0.9,
    top_k: 40,
    max_output_tokens: 1024,
};
