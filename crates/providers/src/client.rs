//! Failure-isolating front for a [`ChatModel`].
//!
//! [`ModelClient::generate`] never fails: transport errors, provider
//! refusals, timeouts and cancellation all resolve to the canned reply in
//! the language of the user's text.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use yf_domain::limits::GEN_PROFILE;
use yf_domain::trace::TraceEvent;
use yf_prompt::{detect_arabic, fallback_reply, AssembledPrompt};

use crate::traits::{ChatModel, GenerateRequest};

/// Text of an assistant reply and whether it came from the canned set.
///
/// `fallback` is for logs and metrics; the text itself is persisted and
/// returned exactly like a generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub fallback: bool,
}

#[derive(Clone)]
pub struct ModelClient {
    model: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl ModelClient {
    pub fn new(model: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Generate a reply for `prompt`.
    ///
    /// `user_text` is the raw text (without the language hint) and only
    /// selects the fallback language. If `cancel` fires first, the
    /// outbound call is dropped and any partial output discarded.
    pub async fn generate(
        &self,
        prompt: &AssembledPrompt,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Reply {
        let req = GenerateRequest {
            turns: prompt.turns(),
            profile: GEN_PROFILE,
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err("cancelled".to_string()),
            res = tokio::time::timeout(self.timeout, self.model.generate(&req)) => match res {
                Ok(Ok(resp)) if !resp.content.trim().is_empty() => Ok(resp.content),
                Ok(Ok(_)) => Err("empty reply".to_string()),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {}ms", self.timeout.as_millis())),
            },
        };

        match outcome {
            Ok(text) => Reply { text, fallback: false },
            Err(reason) => {
                let arabic = detect_arabic(user_text);
                tracing::warn!(
                    model = %self.model.model_id(),
                    reason = %reason,
                    arabic,
                    "model call failed, using fallback reply"
                );
                TraceEvent::ModelFallback { reason, arabic }.emit();
                Reply {
                    text: fallback_reply(user_text).to_owned(),
                    fallback: true,
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
