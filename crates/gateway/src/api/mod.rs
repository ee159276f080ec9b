pub mod auth;
pub mod chat;
pub mod cleanup;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// `/health` is public and `/v1/cleanup` is gated by the shared cleanup
/// secret; every `/v1/chat/*` route authenticates the caller through the
/// identity service.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Chat
        .route("/v1/chat/send", post(chat::send))
        .route("/v1/chat/history", get(chat::history).delete(chat::clear))
        .route("/v1/chat/clear", post(chat::clear))
        // Scheduler
        .route("/v1/cleanup", post(cleanup::cleanup))
}
