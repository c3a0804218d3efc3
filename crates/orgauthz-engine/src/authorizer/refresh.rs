//! Background refresh listener.
//!
//! One task per authorizer: every change signal triggers a full reload. The
//! task ends on cancellation or when the notification source closes, dropping
//! the subscription either way.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::store::ChangeSubscription;

use super::Shared;

pub(crate) struct ListenerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub(crate) async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "policy refresh listener ended abnormally");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn spawn(shared: Arc<Shared>, sub: Box<dyn ChangeSubscription>) -> ListenerHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(run(shared, sub, cancel.clone()));
    ListenerHandle {
        cancel,
        task: Some(task),
    }
}

async fn run(shared: Arc<Shared>, mut sub: Box<dyn ChangeSubscription>, cancel: CancellationToken) {
    tracing::info!("policy refresh listener started");
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!("policy refresh listener shutting down");
                break;
            }
            signal = sub.changed() => {
                if signal.is_none() {
                    tracing::warn!("policy change channel closed, auto-refresh stopped");
                    break;
                }
                // Failures are logged and counted inside reload; the old snapshot stays.
                let _ = shared.reload().await;
            }
        }
    }
}
