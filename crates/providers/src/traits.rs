use yf_domain::error::Result;
use yf_domain::limits::GenerationProfile;
use yf_prompt::ChatTurn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic text generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Role-tagged turns, ending with the pending user turn.
    pub turns: Vec<ChatTurn>,
    pub profile: GenerationProfile,
}

/// A provider-agnostic generation response.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    /// Textual content of the response.
    pub content: String,
    /// The model that actually produced the response.
    pub model: String,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    /// The reason the model stopped generating (e.g. "stop", "length").
    pub finish_reason: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core model trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Text-in / text-out generation backend.
///
/// Implementations translate [`GenerateRequest`] into a provider's wire
/// format. Any failure (transport, quota, content filter, empty output)
/// is an `Err`; callers decide how to recover.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse>;

    /// Model identifier, for logs only. Never shown to end users.
    fn model_id(&self) -> &str;
}
