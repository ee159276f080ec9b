//! AppState construction and background-task spawning extracted from `main.rs`.
//!
//! `serve` uses both functions; the one-shot `cleanup` command only needs
//! [`build_store`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use yf_domain::config::{Config, ConfigSeverity, StoreBackend, StoreConfig};
use yf_providers::{GoogleProvider, ModelClient};
use yf_sessions::{IdentityVerifier, MemoryMessageStore, MessageStore, RestIdentityVerifier, RestMessageStore};

use crate::runtime::SessionEngine;
use crate::state::AppState;

/// Fail on config errors, log warnings.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Open the configured message store.
pub fn build_store(cfg: &StoreConfig) -> anyhow::Result<Arc<dyn MessageStore>> {
    let store: Arc<dyn MessageStore> = match cfg.backend {
        StoreBackend::Rest => {
            let store = RestMessageStore::new(cfg).context("initializing message store")?;
            tracing::info!(url = %cfg.base_url, table = %cfg.table, "REST message store ready");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-process message store; history is lost on restart");
            Arc::new(MemoryMessageStore::new())
        }
    };
    Ok(store)
}

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> anyhow::Result<AppState> {
    check_config(&config)?;

    // ── Message store ────────────────────────────────────────────────
    let store = build_store(&config.store)?;

    // ── Identity verifier ────────────────────────────────────────────
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(
        RestIdentityVerifier::from_config(&config.identity)
            .context("initializing identity verifier")?,
    );
    tracing::info!(url = %config.identity.base_url, "identity verifier ready");

    // ── Model client ─────────────────────────────────────────────────
    let provider = GoogleProvider::from_config(&config.llm).context("initializing model client")?;
    let model = ModelClient::new(
        Arc::new(provider),
        Duration::from_millis(config.llm.timeout_ms),
    );
    tracing::info!(timeout_ms = config.llm.timeout_ms, "model client ready");

    // ── Session engine ───────────────────────────────────────────────
    let engine = Arc::new(SessionEngine::new(
        verifier,
        store,
        model,
        &config.chat,
        shutdown.clone(),
    ));
    tracing::info!(
        window_limit = config.chat.window_limit,
        history_limit = config.chat.history_limit,
        "session engine ready"
    );

    // ── Cleanup secret (read once, hashed in AppState) ───────────────
    let env_var = &config.cleanup.secret_env;
    let secret = std::env::var(env_var).ok().filter(|s| !s.is_empty());
    if secret.is_some() {
        tracing::info!(source = %format!("env:{env_var}"), "cleanup endpoint enabled");
    } else {
        tracing::warn!("cleanup endpoint DISABLED: set the {env_var} env var");
    }

    Ok(AppState::new(config, engine, secret.as_deref(), shutdown))
}

/// Spawn the long-running background tokio tasks. Each loop exits when
/// `state.shutdown` is cancelled.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic global sweep ────────────────────────────────────────
    let every = state.config.cleanup.sweep_interval_secs;
    if every == 0 {
        tracing::info!("in-process sweep disabled (cleanup.sweep_interval_secs = 0)");
        return;
    }

    let reaper = state.reaper.clone();
    let shutdown = state.shutdown.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(every));
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = reaper.sweep_all().await {
                        tracing::warn!(error = %e, "periodic sweep failed");
                    }
                }
            }
        }
        tracing::debug!("sweep loop stopped");
    });
    tracing::info!(interval_secs = every, "background tasks spawned");
}
