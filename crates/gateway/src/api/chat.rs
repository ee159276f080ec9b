//! Chat endpoints.
//!
//! - `POST   /v1/chat/send`   : run one turn, return both new messages + window
//! - `GET    /v1/chat/history`: the caller's visible history
//! - `DELETE /v1/chat/history`: hard-delete the caller's history
//! - `POST   /v1/chat/clear`  : alias of the above

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use yf_domain::message::WireMessage;

use crate::api::auth::{bearer_token, AuthedUser};
use crate::error::ApiError;
use crate::runtime::{validate_text, SendInput};
use crate::state::AppState;

const EXPIRES_INFO: &str = "Messages are kept for 24 hours";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub message: String,
    /// Opaque descriptors, stored with the user message as-is.
    #[serde(default)]
    pub attachments: Option<Vec<Value>>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    success: bool,
    user_message: WireMessage,
    assistant_message: WireMessage,
    history: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Kept as text so a malformed value falls back to the default instead
    /// of failing the request.
    #[serde(default)]
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    success: bool,
    history: Vec<WireMessage>,
    count: usize,
    expires_info: &'static str,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/chat/send
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Body shape and text are checked before the caller is authenticated, so
/// a malformed request never costs an identity round-trip.
pub async fn send(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected send body");
        ApiError::BadRequest("invalid request body".into())
    })?;
    validate_text(&body.message)?;

    let user = state.engine.authenticate(bearer_token(&headers)).await?;

    let outcome = state
        .engine
        .handle_send(
            &user,
            SendInput {
                text: body.message,
                attachments: body.attachments.unwrap_or_default(),
                locale: body.locale,
            },
        )
        .await?;

    Ok(Json(SendResponse {
        success: true,
        user_message: WireMessage::from(&outcome.user_message),
        assistant_message: WireMessage::from(&outcome.assistant_message),
        history: outcome.history.to_wire(),
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/chat/history
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An unparseable query string is treated like a missing `limit`.
pub async fn history(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let query = query.map(|Query(q)| q).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "ignoring malformed history query");
        HistoryQuery { limit: None }
    });
    let requested = query
        .limit
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok());
    let limit = state.config.chat.clamp_history_limit(requested);

    let view = state.engine.history(&user, limit).await?;
    let history = view.to_wire();

    Ok(Json(HistoryResponse {
        success: true,
        count: history.len(),
        history,
        expires_info: EXPIRES_INFO,
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/chat/history, POST /v1/chat/clear
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn clear(
    State(state): State<AppState>,
    AuthedUser(user): AuthedUser,
) -> Result<Json<Value>, ApiError> {
    state.engine.clear(&user).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Chat history cleared",
    })))
}
