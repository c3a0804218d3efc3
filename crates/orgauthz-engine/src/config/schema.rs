use serde::Deserialize;
use orgauthz_core::error::{AuthzError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthzConfig {
    pub version: u32,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub server: ServerSection,

    pub store: StoreSection,
}

impl AuthzConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AuthzError::UnsupportedVersion);
        }

        self.engine.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Upper bound for a single alias lookup against the store.
    #[serde(default = "default_alias_lookup_timeout_ms")]
    pub alias_lookup_timeout_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            alias_lookup_timeout_ms: default_alias_lookup_timeout_ms(),
        }
    }
}

impl EngineSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60000).contains(&self.alias_lookup_timeout_ms) {
            return Err(AuthzError::BadConfig(
                "engine.alias_lookup_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    pub policies_path: String,
    pub users_path: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.policies_path.trim().is_empty() {
            return Err(AuthzError::BadConfig("store.policies_path must not be empty".into()));
        }
        if self.users_path.trim().is_empty() {
            return Err(AuthzError::BadConfig("store.users_path must not be empty".into()));
        }
        if !(500..=600000).contains(&self.poll_interval_ms) {
            return Err(AuthzError::BadConfig(
                "store.poll_interval_ms must be between 500 and 600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_alias_lookup_timeout_ms() -> u64 {
    2000
}
fn default_poll_interval_ms() -> u64 {
    5000
}
