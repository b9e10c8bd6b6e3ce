//! Token issuance configuration.

use super::{ConfigError, env_value};
use serde::{Deserialize, Serialize};

/// Configuration for the shared-secret token issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable containing the shared secret id.
    #[serde(default = "default_secret_id_env")]
    pub secret_id_env: String,

    /// Environment variable containing the shared secret key.
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,

    /// Lifetime of an issued bearer token, in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_id_env: default_secret_id_env(),
            secret_key_env: default_secret_key_env(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Resolve the `(id, key)` pair from the environment.
    ///
    /// Both values are required.
    pub fn resolve_secrets(&self) -> Result<(String, String), ConfigError> {
        match (env_value(&self.secret_id_env), env_value(&self.secret_key_env)) {
            (Some(id), Some(key)) => Ok((id, key)),
            _ => Err(ConfigError::MissingSecret(format!(
                "{} and {}",
                self.secret_id_env, self.secret_key_env
            ))),
        }
    }
}

fn default_secret_id_env() -> String {
    "SECRET_ID".to_string()
}

fn default_secret_key_env() -> String {
    "SECRET_KEY".to_string()
}

fn default_token_ttl_secs() -> u64 {
    360
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_secrets_from_env() {
        // SAFETY: test-only variables with unique names
        unsafe {
            std::env::set_var("ASKGATE_TEST_SECRET_ID", "id1");
            std::env::set_var("ASKGATE_TEST_SECRET_KEY", "key1");
        }
        let config = AuthConfig {
            secret_id_env: "ASKGATE_TEST_SECRET_ID".to_string(),
            secret_key_env: "ASKGATE_TEST_SECRET_KEY".to_string(),
            ..Default::default()
        };
        let (id, key) = config.resolve_secrets().unwrap();
        assert_eq!(id, "id1");
        assert_eq!(key, "key1");
        // SAFETY: cleanup
        unsafe {
            std::env::remove_var("ASKGATE_TEST_SECRET_ID");
            std::env::remove_var("ASKGATE_TEST_SECRET_KEY");
        }
    }

    #[test]
    fn test_missing_secret_is_error() {
        let config = AuthConfig {
            secret_id_env: "ASKGATE_TEST_UNSET_ID".to_string(),
            secret_key_env: "ASKGATE_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let err = config.resolve_secrets().unwrap_err();
        assert_eq!(
            err.to_string(),
            "ASKGATE_TEST_UNSET_ID and ASKGATE_TEST_UNSET_KEY must be set in environment variables"
        );
    }

    #[test]
    fn test_secrets_are_not_trimmed() {
        // SAFETY: test-only variables with unique names
        unsafe {
            std::env::set_var("ASKGATE_TEST_PADDED_ID", "id1");
            std::env::set_var("ASKGATE_TEST_PADDED_KEY", "key1 ");
            std::env::set_var("ASKGATE_TEST_BLANK_ID", "   ");
        }
        let padded = AuthConfig {
            secret_id_env: "ASKGATE_TEST_PADDED_ID".to_string(),
            secret_key_env: "ASKGATE_TEST_PADDED_KEY".to_string(),
            ..Default::default()
        };
        let (_, key) = padded.resolve_secrets().unwrap();
        assert_eq!(key, "key1 ");

        let blank = AuthConfig {
            secret_id_env: "ASKGATE_TEST_BLANK_ID".to_string(),
            secret_key_env: "ASKGATE_TEST_PADDED_KEY".to_string(),
            ..Default::default()
        };
        assert!(blank.resolve_secrets().is_err());
        // SAFETY: cleanup
        unsafe {
            std::env::remove_var("ASKGATE_TEST_PADDED_ID");
            std::env::remove_var("ASKGATE_TEST_PADDED_KEY");
            std::env::remove_var("ASKGATE_TEST_BLANK_ID");
        }
    }
}
