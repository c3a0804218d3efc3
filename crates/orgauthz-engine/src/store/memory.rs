//! In-process policy store.
//!
//! Holds the document and alias table in memory; `notify` wakes every live
//! subscription. Used by embedders that push policy updates themselves and by
//! tests.

use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

use orgauthz_core::BoxError;

use super::{ChangeSubscription, PolicyStore, UserNotFound};

const SUBSCRIPTION_BUFFER: usize = 16;

#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Vec<u8>>,
    aliases: DashMap<String, String>,
    subscribers: Mutex<Vec<mpsc::Sender<()>>>,
}

impl MemoryStore {
    pub fn new(document: impl Into<Vec<u8>>) -> Self {
        Self {
            document: RwLock::new(document.into()),
            ..Self::default()
        }
    }

    pub fn with_alias(self, user_id: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(user_id.into(), alias.into());
        self
    }

    pub fn set_alias(&self, user_id: impl Into<String>, alias: impl Into<String>) {
        self.aliases.insert(user_id.into(), alias.into());
    }

    /// Replace the stored document. Subscribers are not woken; call `notify`.
    pub fn set_document(&self, document: impl Into<Vec<u8>>) {
        if let Ok(mut g) = self.document.write() {
            *g = document.into();
        }
    }

    /// Signal a change to every live subscription. Returns how many were woken.
    pub fn notify(&self) -> usize {
        let Ok(mut subs) = self.subscribers.lock() else {
            return 0;
        };
        // Closed receivers are pruned; a full buffer already has a pending wake-up.
        subs.retain(|tx| !tx.is_closed());
        subs.iter().filter(|tx| tx.try_send(()).is_ok()).count()
    }

    /// Number of subscriptions whose receiver is still alive.
    pub fn live_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subs| subs.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn fetch_policies(&self) -> Result<Vec<u8>, BoxError> {
        let doc = self
            .document
            .read()
            .map_err(|_| "memory store document lock poisoned")?;
        Ok(doc.clone())
    }

    async fn resolve_alias(&self, user_id: &str) -> Result<String, BoxError> {
        self.aliases
            .get(user_id)
            .map(|a| a.value().clone())
            .ok_or_else(|| UserNotFound(user_id.to_string()).into())
    }

    async fn subscribe(&self) -> Result<Box<dyn ChangeSubscription>, BoxError> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        self.subscribers
            .lock()
            .map_err(|_| "memory store subscriber lock poisoned")?
            .push(tx);
        Ok(Box::new(rx))
    }
}
