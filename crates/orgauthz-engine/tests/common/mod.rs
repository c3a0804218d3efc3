//! Shared fixtures for engine integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use orgauthz_core::BoxError;
use orgauthz_engine::config::EngineSection;
use orgauthz_engine::store::MemoryStore;
use orgauthz_engine::{Authorizer, ChangeSubscription, PolicyStore};

pub const USER1_ID: &str = "0001";
pub const USER2_ID: &str = "0002";
pub const USER3_ID: &str = "0003";
pub const USER4_ID: &str = "0004";
/// Alias lookup for this id fails in the store.
pub const USER5_ID: &str = "0005";

pub const ORG1: &str = "org1";
pub const ORG2: &str = "org2";
pub const ORG3: &str = "org3";

pub fn fixture_policies() -> Vec<u8> {
    std::fs::read("tests/fixtures/policies.json").unwrap()
}

pub fn engine_cfg() -> EngineSection {
    EngineSection {
        alias_lookup_timeout_ms: 2000,
    }
}

/// Memory store with the reference fixture and aliases user1..user4.
pub fn fixture_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new(fixture_policies())
            .with_alias(USER1_ID, "user1")
            .with_alias(USER2_ID, "user2")
            .with_alias(USER3_ID, "user3")
            .with_alias(USER4_ID, "user4"),
    )
}

pub async fn fixture_authorizer() -> (Arc<MemoryStore>, Authorizer) {
    let store = fixture_store();
    let az = Authorizer::new(store.clone(), &engine_cfg()).await.unwrap();
    (store, az)
}

#[derive(Debug, thiserror::Error)]
#[error("fake database failure")]
pub struct FakeDatabaseFailure;

/// Store whose every call can be scripted to fail or hang.
pub struct ScriptedStore {
    pub document: Option<Vec<u8>>,
    pub alias: Option<String>,
    pub hang_on_alias: bool,
    pub subscribable: bool,
}

impl ScriptedStore {
    pub fn failing() -> Self {
        Self {
            document: None,
            alias: None,
            hang_on_alias: false,
            subscribable: false,
        }
    }
}

#[async_trait]
impl PolicyStore for ScriptedStore {
    async fn fetch_policies(&self) -> Result<Vec<u8>, BoxError> {
        self.document.clone().ok_or_else(|| FakeDatabaseFailure.into())
    }

    async fn resolve_alias(&self, _user_id: &str) -> Result<String, BoxError> {
        if self.hang_on_alias {
            std::future::pending::<()>().await;
        }
        self.alias.clone().ok_or_else(|| FakeDatabaseFailure.into())
    }

    async fn subscribe(&self) -> Result<Box<dyn ChangeSubscription>, BoxError> {
        if self.subscribable {
            let (_tx, rx) = tokio::sync::mpsc::channel::<()>(1);
            Ok(Box::new(rx))
        } else {
            Err(FakeDatabaseFailure.into())
        }
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut cond: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if cond().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
