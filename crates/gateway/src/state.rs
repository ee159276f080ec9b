use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use yf_domain::config::Config;

use crate::runtime::{Reaper, SessionEngine};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub engine: Arc<SessionEngine>,
    pub reaper: Arc<Reaper>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the cleanup secret (read once at startup).
    /// `None` = no secret configured; the cleanup endpoint rejects every call.
    pub cleanup_secret_hash: Option<Vec<u8>>,

    // ── Lifecycle ─────────────────────────────────────────────────────
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        engine: Arc<SessionEngine>,
        cleanup_secret: Option<&str>,
        shutdown: CancellationToken,
    ) -> Self {
        let cleanup_secret_hash = cleanup_secret
            .filter(|s| !s.is_empty())
            .map(|s| Sha256::digest(s.as_bytes()).to_vec());
        Self {
            config,
            reaper: engine.reaper(),
            engine,
            cleanup_secret_hash,
            shutdown,
        }
    }
}
