//! Shared utility functions for model adapters.

use yf_domain::error::{Error, Result};

/// Read an API key from the named environment variable.
pub(crate) fn resolve_api_key(env_var: &str) -> Result<String> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Auth(format!(
            "environment variable '{env_var}' not set or empty"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_is_auth_error() {
        let err = resolve_api_key("YF_TEST_SURELY_UNSET_KEY_VAR").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
