//! Google Gemini adapter.
//!
//! Implements the Gemini `generateContent` API. Auth is via an API key
//! sent in the `x-goog-api-key` header, never in the URL.

use std::time::{Duration, Instant};

use serde_json::Value;
use yf_domain::config::LlmConfig;
use yf_domain::error::{from_reqwest, Error, Result};
use yf_domain::trace::TraceEvent;
use yf_prompt::{ChatTurn, TurnRole};

use crate::traits::{ChatModel, GenerateRequest, GenerateResponse};
use crate::util::resolve_api_key;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generation backend for the Google Gemini API.
pub struct GoogleProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new adapter from the `[llm]` config section.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;
        Self::with_key(cfg, api_key)
    }

    pub fn with_key(cfg: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request serialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn turn_to_gemini(turn: &ChatTurn) -> Value {
    let role = match turn.role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    };
    serde_json::json!({
        "role": role,
        "parts": [{"text": turn.text}],
    })
}

pub(crate) fn build_body(req: &GenerateRequest) -> Value {
    let contents: Vec<Value> = req.turns.iter().map(turn_to_gemini).collect();
    serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "temperature": req.profile.temperature,
            "topP": req.profile.top_p,
            "topK": req.profile.top_k,
            "maxOutputTokens": req.profile.max_output_tokens,
        },
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) fn parse_gemini_response(body: &Value, model: &str) -> Result<GenerateResponse> {
    if let Some(reason) = body
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|v| v.as_str())
    {
        return Err(Error::Model {
            message: format!("prompt blocked: {reason}"),
        });
    }

    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Model {
            message: "no candidates in response".into(),
        })?;

    let text_content: String = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|v| v.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let finish_reason = candidate
        .get("finishReason")
        .and_then(|v| v.as_str())
        .map(|s| match s {
            "STOP" => "stop".to_string(),
            "MAX_TOKENS" => "length".to_string(),
            other => other.to_lowercase(),
        });

    if text_content.trim().is_empty() {
        return Err(Error::Model {
            message: format!(
                "empty candidate (finish_reason={})",
                finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    let usage = body.get("usageMetadata");
    let prompt_tokens = usage
        .and_then(|u| u.get("promptTokenCount"))
        .and_then(|v| v.as_u64())
        .map(|n| n as u32);
    let completion_tokens = usage
        .and_then(|u| u.get("candidatesTokenCount"))
        .and_then(|v| v.as_u64())
        .map(|n| n as u32);

    Ok(GenerateResponse {
        content: text_content,
        model: model.to_string(),
        prompt_tokens,
        completion_tokens,
        finish_reason,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl ChatModel for GoogleProvider {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.generate_url();
        let body = build_body(req);

        tracing::debug!(url = %url, turns = req.turns.len(), "generate request");

        let start = Instant::now();
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Model {
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        let parsed = parse_gemini_response(&resp_json, &self.model)?;

        TraceEvent::ModelCall {
            model: self.model.clone(),
            turns: req.turns.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            prompt_tokens: parsed.prompt_tokens,
            completion_tokens: parsed.completion_tokens,
        }
        .emit();

        Ok(parsed)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
