//! Public authorization API.
//!
//! The authorizer owns the current [`PolicySnapshot`] behind an `ArcSwap`:
//! request paths load it without locking, the refresh path builds a complete
//! replacement off to the side and swaps it in with a single store. Readers
//! holding the previous snapshot finish on that consistent view.
//!
//! Result policy:
//! - organization absent from the snapshot (no row, or disabled): unrestricted
//! - `authorize` folds alias and evaluation failures into
//!   [`AuthzError::InsufficientPrivilege`] (fail closed)
//! - `get_allowed_actions` surfaces those failures as errors and keeps the
//!   undefined / empty / populated distinction

mod refresh;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;

use orgauthz_core::error::{AuthzError, Result};
use orgauthz_core::policy::{parse_policy_document, AuthorizeInput, EvaluationInput};
use orgauthz_core::Action;

use crate::compiler::QueryCompiler;
use crate::config::EngineSection;
use crate::context::RequestContext;
use crate::obs::AuthzMetrics;
use crate::snapshot::PolicySnapshot;
use crate::store::PolicyStore;

use refresh::ListenerHandle;

/// State shared between request paths and the refresh listener.
pub(crate) struct Shared {
    store: Arc<dyn PolicyStore>,
    compiler: QueryCompiler,
    snapshot: ArcSwap<PolicySnapshot>,
    // Serializes reloads so snapshots are published in load order.
    reload_lock: tokio::sync::Mutex<()>,
    metrics: Arc<AuthzMetrics>,
    alias_timeout: Duration,
}

impl Shared {
    async fn load(&self) -> Result<PolicySnapshot> {
        let raw = self
            .store
            .fetch_policies()
            .await
            .map_err(AuthzError::Store)?;
        let doc = parse_policy_document(&raw)?;
        PolicySnapshot::build(&doc, &self.compiler)
    }

    fn publish(&self, snapshot: PolicySnapshot) {
        self.metrics
            .organizations_loaded
            .set(i64::try_from(snapshot.len()).unwrap_or(i64::MAX));
        self.snapshot.store(Arc::new(snapshot));
    }

    /// Fetch, parse, compile, swap. On failure the current snapshot stays.
    pub(crate) async fn reload(&self) -> Result<usize> {
        let _guard = self.reload_lock.lock().await;
        match self.load().await {
            Ok(snapshot) => {
                let orgs = snapshot.len();
                self.publish(snapshot);
                self.metrics.refreshes.inc(&[("result", "ok")]);
                tracing::info!(orgs, "authorization policies reloaded");
                Ok(orgs)
            }
            Err(e) => {
                self.metrics.refreshes.inc(&[("result", "error")]);
                tracing::error!(error = %e, "authorization policies reload failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}

pub struct Authorizer {
    shared: Arc<Shared>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl Authorizer {
    /// Load and compile all policies, then start listening for changes.
    ///
    /// Fails if the store, the document, or any enabled organization's policy
    /// is broken. A missing change subscription only disables auto-refresh.
    pub async fn new(store: Arc<dyn PolicyStore>, cfg: &EngineSection) -> Result<Self> {
        Self::with_parts(
            store,
            cfg,
            QueryCompiler::default(),
            Arc::new(AuthzMetrics::default()),
        )
        .await
    }

    pub async fn with_parts(
        store: Arc<dyn PolicyStore>,
        cfg: &EngineSection,
        compiler: QueryCompiler,
        metrics: Arc<AuthzMetrics>,
    ) -> Result<Self> {
        let shared = Arc::new(Shared {
            store,
            compiler,
            snapshot: ArcSwap::from_pointee(PolicySnapshot::default()),
            reload_lock: tokio::sync::Mutex::new(()),
            metrics,
            alias_timeout: Duration::from_millis(cfg.alias_lookup_timeout_ms),
        });

        let initial = shared.load().await?;
        tracing::info!(orgs = initial.len(), "authorization policies loaded");
        shared.publish(initial);

        let listener = match shared.store.subscribe().await {
            Ok(sub) => Some(refresh::spawn(Arc::clone(&shared), sub)),
            Err(e) => {
                tracing::warn!(error = %e, "policy change subscription unavailable, auto-refresh disabled");
                None
            }
        };

        Ok(Self {
            shared,
            listener: Mutex::new(listener),
        })
    }

    /// `Ok(())` when allowed, [`AuthzError::InsufficientPrivilege`] otherwise.
    pub async fn authorize(&self, ctx: &RequestContext, input: &AuthorizeInput) -> Result<()> {
        let org_name = input.organization_name.as_str();
        let Some(org) = self.shared.snapshot.load().get(org_name) else {
            self.metrics().decisions.inc(&[("outcome", "allow_unrestricted")]);
            return Ok(());
        };

        if input.action.is_all() {
            tracing::warn!(org = org_name, user_id = %input.user_id, "sentinel action used as input, denying");
            return self.deny("deny");
        }

        let alias = match self.resolve_alias(ctx, &input.user_id, "authorize").await {
            Ok(alias) => alias,
            Err(e) => {
                tracing::warn!(org = org_name, user_id = %input.user_id, error = %e, "alias resolution failed, denying");
                return self.deny("deny_error");
            }
        };

        let eval_input = EvaluationInput::new(&alias, Some(&input.action), &org.policy_data);
        let started = Instant::now();
        let allowed = org.queries.evaluate_allow(&eval_input);
        self.metrics()
            .eval_duration
            .observe(&[("query", "allow")], started.elapsed());

        match allowed {
            Ok(true) => {
                self.metrics().decisions.inc(&[("outcome", "allow")]);
                Ok(())
            }
            Ok(false) => {
                tracing::debug!(org = org_name, user = %alias, action = %input.action, "action denied");
                self.deny("deny")
            }
            Err(e) => {
                tracing::warn!(org = org_name, user = %alias, action = %input.action, error = %e, "allow query failed, denying");
                self.deny("deny_error")
            }
        }
    }

    /// Actions `user_id` may perform in `org_name`.
    ///
    /// `Ok(None)`: the policy leaves the list undefined. `Ok(Some(vec![]))`:
    /// defined, nothing allowed. `Ok(Some(vec![Action::ALL]))`: everything.
    /// On `Err` the list is absent; `.ok().flatten()` reads as "no actions".
    pub async fn get_allowed_actions(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        org_name: &str,
    ) -> Result<Option<Vec<Action>>> {
        let Some(org) = self.shared.snapshot.load().get(org_name) else {
            self.metrics().allowed_actions.inc(&[("outcome", "unrestricted")]);
            return Ok(Some(vec![Action::ALL]));
        };

        let alias = self
            .resolve_alias(ctx, user_id, "allowed_actions")
            .await
            .inspect_err(|e| {
                tracing::warn!(org = org_name, user_id, error = %e, "alias resolution failed");
                self.metrics().allowed_actions.inc(&[("outcome", "error")]);
            })?;

        let eval_input = EvaluationInput::new(&alias, None, &org.policy_data);
        let started = Instant::now();
        let actions = org.queries.evaluate_allowed_actions(&eval_input);
        self.metrics()
            .eval_duration
            .observe(&[("query", "allowed_actions")], started.elapsed());

        let outcome = match &actions {
            Ok(Some(list)) if list.is_empty() => "empty",
            Ok(Some(_)) => "listed",
            Ok(None) => "undefined",
            Err(e) => {
                tracing::warn!(org = org_name, user = %alias, error = %e, "allowed_actions query failed");
                "error"
            }
        };
        self.metrics().allowed_actions.inc(&[("outcome", outcome)]);
        actions
    }

    /// Reload now, outside the notification channel. Returns enforced org count.
    pub async fn refresh(&self) -> Result<usize> {
        self.shared.reload().await
    }

    /// Current snapshot; stays valid even if a refresh swaps in a newer one.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.shared.snapshot.load_full()
    }

    pub fn metrics(&self) -> &AuthzMetrics {
        &self.shared.metrics
    }

    /// True while the change listener is running.
    pub fn is_auto_refreshing(&self) -> bool {
        self.listener
            .lock()
            .map(|l| l.as_ref().is_some_and(ListenerHandle::is_running))
            .unwrap_or(false)
    }

    /// Stop the change listener and wait for it to release its subscription.
    pub async fn shutdown(&self) {
        let handle = self.listener.lock().ok().and_then(|mut l| l.take());
        if let Some(handle) = handle {
            handle.stop().await;
        }
    }

    fn deny(&self, outcome: &str) -> Result<()> {
        self.metrics().decisions.inc(&[("outcome", outcome)]);
        Err(AuthzError::InsufficientPrivilege)
    }

    async fn resolve_alias(&self, ctx: &RequestContext, user_id: &str, op: &str) -> Result<String> {
        let timeout = ctx.effective_timeout(self.shared.alias_timeout);
        let lookup = tokio::time::timeout(timeout, self.shared.store.resolve_alias(user_id));

        let outcome = tokio::select! {
            biased;
            () = ctx.cancelled() => Err(("cancelled", AuthzError::Cancelled)),
            res = lookup => match res {
                Ok(Ok(alias)) => Ok(alias),
                Ok(Err(e)) => Err(("error", AuthzError::AliasResolution(e.to_string()))),
                Err(_) => Err((
                    "timeout",
                    AuthzError::AliasResolution(format!("timed out after {}ms", timeout.as_millis())),
                )),
            },
        };

        outcome.map_err(|(reason, err)| {
            self.metrics()
                .alias_failures
                .inc(&[("op", op), ("reason", reason)]);
            err
        })
    }
}
