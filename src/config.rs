//! Environment-gated settings.
//!
//! Tunables (goal, risk defaults) persist in the state document; this
//! module only resolves provider credentials from the environment.
//! A missing required credential is a precondition failure reported
//! before any network call, naming the variable and why it is needed.

use crate::types::ProspectorError;

/// Enhanced chain data (pool discovery, transaction detail, holders).
pub const HELIUS_KEY_VAR: &str = "HELIUS_API_KEY";
/// Optional: elevated rate limits on the quote API.
pub const JUPITER_KEY_VAR: &str = "JUPITER_API_KEY";

/// Resolved provider credentials.
#[derive(Debug, Clone)]
pub struct Settings {
    pub helius_api_key: Option<String>,
    pub jupiter_api_key: Option<String>,
}

impl Settings {
    /// Read all known credentials from the environment. Empty values
    /// count as unset.
    pub fn from_env() -> Self {
        Self {
            helius_api_key: read_var(HELIUS_KEY_VAR),
            jupiter_api_key: read_var(JUPITER_KEY_VAR),
        }
    }

    /// The Helius key is a hard precondition for discovery and holder
    /// lookups; commands that need it abort here, before side effects.
    pub fn require_helius(&self) -> Result<&str, ProspectorError> {
        self.helius_api_key.as_deref().ok_or_else(|| {
            ProspectorError::MissingCredential {
                var: HELIUS_KEY_VAR.to_string(),
                reason: "required for pool discovery, transaction detail, and holder lookups"
                    .to_string(),
            }
        })
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_helius_missing() {
        let settings = Settings {
            helius_api_key: None,
            jupiter_api_key: None,
        };
        let err = settings.require_helius().unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains(HELIUS_KEY_VAR));
        assert!(msg.contains("pool discovery"));
    }

    #[test]
    fn test_require_helius_present() {
        let settings = Settings {
            helius_api_key: Some("key123".into()),
            jupiter_api_key: None,
        };
        assert_eq!(settings.require_helius().unwrap(), "key123");
    }
}
