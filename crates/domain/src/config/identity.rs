use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Identity verification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where bearer tokens are verified. The auth service resolves a valid
/// token to a stable user id via `GET {base_url}/auth/v1/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub base_url: String,
    /// Environment variable holding the project's public API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_5000")]
    pub timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_5000(),
        }
    }
}

fn d_api_key_env() -> String {
    "SUPABASE_ANON_KEY".into()
}
fn d_5000() -> u64 {
    5_000
}
