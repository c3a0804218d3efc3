//! File-backed policy store.
//!
//! - policies: the JSON policy document, read on every fetch
//! - users: JSON object `{ "<user id>": "<alias>" }`, read on every lookup
//!
//! Change notifications poll the policies file's modification time. The poller
//! exits as soon as its subscription is dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::mpsc;

use orgauthz_core::BoxError;

use crate::config::StoreSection;

use super::{ChangeSubscription, PolicyStore, UserNotFound};

#[derive(Debug, Clone)]
pub struct FileStore {
    policies_path: PathBuf,
    users_path: PathBuf,
    poll_interval: Duration,
}

impl FileStore {
    pub fn new(
        policies_path: impl Into<PathBuf>,
        users_path: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            policies_path: policies_path.into(),
            users_path: users_path.into(),
            poll_interval,
        }
    }

    pub fn from_config(cfg: &StoreSection) -> Self {
        Self::new(
            &cfg.policies_path,
            &cfg.users_path,
            Duration::from_millis(cfg.poll_interval_ms),
        )
    }
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

#[async_trait]
impl PolicyStore for FileStore {
    async fn fetch_policies(&self) -> Result<Vec<u8>, BoxError> {
        Ok(tokio::fs::read(&self.policies_path).await?)
    }

    async fn resolve_alias(&self, user_id: &str) -> Result<String, BoxError> {
        let raw = tokio::fs::read(&self.users_path).await?;
        let mut users: HashMap<String, String> = serde_json::from_slice(&raw)?;
        users
            .remove(user_id)
            .ok_or_else(|| UserNotFound(user_id.to_string()).into())
    }

    async fn subscribe(&self) -> Result<Box<dyn ChangeSubscription>, BoxError> {
        let path = self.policies_path.clone();
        let mut last = modified_at(&path)
            .await
            .ok_or_else(|| format!("cannot stat {}", path.display()))?;
        let period = self.poll_interval;
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                let Some(now) = modified_at(&path).await else {
                    tracing::debug!(path = %path.display(), "policies file not readable, skipping poll");
                    continue;
                };
                if now != last {
                    last = now;
                    if tx.try_send(()).is_err() && tx.is_closed() {
                        break;
                    }
                }
            }
            tracing::debug!(path = %path.display(), "policy file poller stopped");
        });

        Ok(Box::new(rx))
    }
}
