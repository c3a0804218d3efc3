//! Engine config loader (strict parsing).

pub mod schema;

use std::fs;

use orgauthz_core::error::{AuthzError, Result};

pub use schema::{AuthzConfig, EngineSection, ServerSection, StoreSection};

pub fn load_from_file(path: &str) -> Result<AuthzConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AuthzError::BadConfig(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AuthzConfig> {
    let cfg: AuthzConfig = serde_yaml::from_str(s)
        .map_err(|e| AuthzError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
