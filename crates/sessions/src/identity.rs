//! Bearer-token verification.
//!
//! The gateway never inspects tokens itself; it hands them to the auth
//! service and accepts whatever user id comes back. Any failure along the
//! way (missing key, transport error, non-2xx, malformed body) is reported
//! as `Error::Auth`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use yf_domain::config::IdentityConfig;
use yf_domain::error::{from_reqwest, Error, Result};

/// The authenticated caller, threaded explicitly through every call that
/// touches user data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve an opaque bearer credential to a user.
    async fn verify(&self, token: &str) -> Result<UserContext>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REST verifier
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct RestIdentityVerifier {
    http: Client,
    user_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
}

impl RestIdentityVerifier {
    pub fn from_config(cfg: &IdentityConfig) -> Result<Self> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("environment variable '{}' not set", cfg.api_key_env))
            })?;
        Self::with_key(cfg, api_key)
    }

    pub fn with_key(cfg: &IdentityConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            http,
            user_url: format!("{}/auth/v1/user", cfg.base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl IdentityVerifier for RestIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<UserContext> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Auth("missing bearer token".into()));
        }

        let resp = self
            .http
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                Error::Auth(format!("identity service unreachable: {}", from_reqwest(e)))
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "token rejected by identity service");
            return Err(Error::Auth(format!("identity service returned {status}")));
        }

        let user: AuthUser = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("malformed identity response: {e}")))?;
        parse_user(user)
    }
}

fn parse_user(user: AuthUser) -> Result<UserContext> {
    if user.id.trim().is_empty() {
        return Err(Error::Auth("identity response carried no user id".into()));
    }
    Ok(UserContext::new(user.id))
}
