mod chat;
mod cleanup;
mod identity;
mod llm;
mod observability;
mod server;
mod store;

pub use chat::*;
pub use cleanup::*;
pub use identity::*;
pub use llm::*;
pub use observability::*;
pub use server::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError::error(
                "server.max_concurrent_requests",
                "must be greater than 0",
            ));
        }

        // Window sizing.
        if self.chat.window_limit == 0 {
            errors.push(ConfigError::error("chat.window_limit", "must be greater than 0"));
        }
        if self.chat.history_limit == 0 {
            errors.push(ConfigError::error("chat.history_limit", "must be greater than 0"));
        }
        if self.chat.history_limit > self.chat.window_limit {
            errors.push(ConfigError::error(
                "chat.history_limit",
                format!(
                    "history_limit ({}) cannot exceed window_limit ({})",
                    self.chat.history_limit, self.chat.window_limit
                ),
            ));
        }
        if self.chat.history_max_limit < self.chat.history_default_limit {
            errors.push(ConfigError::error(
                "chat.history_max_limit",
                "history_max_limit must be >= history_default_limit",
            ));
        }

        if self.llm.base_url.is_empty() {
            errors.push(ConfigError::error("llm.base_url", "base_url must not be empty"));
        }
        if self.llm.model.is_empty() {
            errors.push(ConfigError::error("llm.model", "model must not be empty"));
        }

        if self.store.max_retries > MAX_STORE_RETRIES {
            errors.push(ConfigError::error(
                "store.max_retries",
                format!("max_retries must be <= {MAX_STORE_RETRIES}"),
            ));
        }

        match self.store.backend {
            StoreBackend::Rest if self.store.base_url.is_empty() => {
                errors.push(ConfigError::error(
                    "store.base_url",
                    "base_url is required for the rest backend",
                ));
            }
            StoreBackend::Memory => {
                errors.push(ConfigError::warning(
                    "store.backend",
                    "memory backend keeps messages in-process only (lost on restart)",
                ));
            }
            _ => {}
        }

        if self.identity.base_url.is_empty() {
            errors.push(ConfigError::error(
                "identity.base_url",
                "base_url must not be empty",
            ));
        }

        let secret_set = std::env::var(&self.cleanup.secret_env)
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if !secret_set {
            errors.push(ConfigError::warning(
                "cleanup.secret_env",
                format!(
                    "{} is not set; the cleanup endpoint will reject every call",
                    self.cleanup.secret_env
                ),
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}
