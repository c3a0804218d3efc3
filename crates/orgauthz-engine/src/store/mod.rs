//! Policy store client abstraction.
//!
//! The store owns the raw policy document and user records; the engine only
//! reads from it. Change notifications are an optional wake-up channel with no
//! payload.

pub mod file;
pub mod memory;

use async_trait::async_trait;
use tokio::sync::mpsc;

use orgauthz_core::BoxError;

pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Raw authorization policy document for all organizations.
    async fn fetch_policies(&self) -> Result<Vec<u8>, BoxError>;

    /// Resolve a user identifier to its alias.
    async fn resolve_alias(&self, user_id: &str) -> Result<String, BoxError>;

    /// Long-lived change-notification subscription.
    async fn subscribe(&self) -> Result<Box<dyn ChangeSubscription>, BoxError>;
}

/// Stream of "policies changed" signals. Dropping it releases the subscription.
#[async_trait]
pub trait ChangeSubscription: Send {
    /// Next signal, or `None` once the source is gone.
    async fn changed(&mut self) -> Option<()>;
}

#[async_trait]
impl ChangeSubscription for mpsc::Receiver<()> {
    async fn changed(&mut self) -> Option<()> {
        self.recv().await
    }
}

/// Error for an unknown user identifier.
#[derive(Debug, thiserror::Error)]
#[error("user not found: {0}")]
pub struct UserNotFound(pub String);
