//! `POST /v1/cleanup`: privileged global TTL sweep.
//!
//! Called hourly by an external scheduler. Idempotent: a missed or repeated
//! call loses nothing, since expired rows are already invisible to reads.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

pub const CLEANUP_SECRET_HEADER: &str = "x-cleanup-secret";

/// Axum extractor that enforces the shared cleanup secret.
///
/// Uses SHA-256 + constant-time comparison. With no secret configured,
/// every request is rejected.
pub struct CleanupGuard;

#[async_trait]
impl FromRequestParts<AppState> for CleanupGuard {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected_hash) = &state.cleanup_secret_hash else {
            tracing::warn!("cleanup called but no cleanup secret is configured");
            return Err(ApiError::Forbidden);
        };

        let provided = parts
            .headers
            .get(CLEANUP_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let provided_hash = Sha256::digest(provided.as_bytes());
        if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
            tracing::warn!("cleanup called with a missing or wrong secret");
            return Err(ApiError::Forbidden);
        }
        Ok(CleanupGuard)
    }
}

#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    success: bool,
    deleted: u64,
    timestamp: String,
}

pub async fn cleanup(
    _guard: CleanupGuard,
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let deleted = state.reaper.sweep_all().await?;
    Ok(Json(CleanupResponse {
        success: true,
        deleted,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
