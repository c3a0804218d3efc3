use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellation and deadline carried by a single authorization request.
///
/// Both public authorizer operations propagate this to the alias lookup; a
/// cancelled or timed-out lookup counts as a resolution failure.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestContext {
    /// No cancellation, engine default timeout.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            timeout: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Effective timeout: the tighter of the request's and the engine's.
    pub fn effective_timeout(&self, engine_default: Duration) -> Duration {
        self.timeout.map_or(engine_default, |t| t.min(engine_default))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}
