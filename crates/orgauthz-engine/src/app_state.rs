//! Shared application state for the HTTP binary.

use std::sync::Arc;

use orgauthz_core::error::Result;

use crate::authorizer::Authorizer;
use crate::config::AuthzConfig;
use crate::store::{FileStore, PolicyStore};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: AuthzConfig,
    authorizer: Authorizer,
}

impl AppState {
    /// Build state from config with a file-backed store.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub async fn new(cfg: AuthzConfig) -> Result<Self> {
        let store: Arc<dyn PolicyStore> = Arc::new(FileStore::from_config(&cfg.store));
        let authorizer = Authorizer::new(store, &cfg.engine).await?;
        Ok(Self::from_parts(cfg, authorizer))
    }

    pub fn from_parts(cfg: AuthzConfig, authorizer: Authorizer) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, authorizer }),
        }
    }

    pub fn cfg(&self) -> &AuthzConfig {
        &self.inner.cfg
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.inner.authorizer
    }
}
