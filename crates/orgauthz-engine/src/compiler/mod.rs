//! Query compiler.
//!
//! Turns an organization's rule source into two prepared queries: the boolean
//! `allow` result and the list-valued `allowed_actions` result. The rule
//! backend sits behind [`QueryBackend`]; the default one evaluates Rego.

pub mod rego;

use std::sync::Arc;

use orgauthz_core::error::{AuthzError, Result};
use orgauthz_core::policy::{EvaluationInput, OrganizationPolicy, PolicySource};
use orgauthz_core::Action;

use crate::predefined;

pub use rego::{RegoBackend, RegoOrgQueries};

/// Package every policy (custom or predefined) must declare.
pub const POLICY_PACKAGE: &str = "artifacthub.authz";
pub const ALLOW_QUERY: &str = "data.artifacthub.authz.allow";
pub const ALLOWED_ACTIONS_QUERY: &str = "data.artifacthub.authz.allowed_actions";

/// Compiled per-organization queries. Immutable once built.
pub trait OrgQueries: Send + Sync {
    /// Only an exact boolean `true` allows.
    fn evaluate_allow(&self, input: &EvaluationInput) -> Result<bool>;

    /// `None` when the rule set leaves the result undefined for this input.
    fn evaluate_allowed_actions(&self, input: &EvaluationInput) -> Result<Option<Vec<Action>>>;
}

/// Rule-evaluation backend that prepares queries from source text.
pub trait QueryBackend: Send + Sync {
    fn prepare(&self, source: &str) -> std::result::Result<Arc<dyn OrgQueries>, String>;
}

#[derive(Clone)]
pub struct QueryCompiler {
    backend: Arc<dyn QueryBackend>,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::with_backend(Arc::new(RegoBackend))
    }
}

impl QueryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    /// Compile one enabled organization's policy.
    pub fn compile(&self, org: &str, policy: &OrganizationPolicy) -> Result<Arc<dyn OrgQueries>> {
        let compile_err = |reason: String| AuthzError::Compile {
            org: org.to_string(),
            reason,
        };

        let source = match policy.source() {
            Some(PolicySource::Custom(src)) => src,
            Some(PolicySource::Predefined(name)) => {
                predefined::lookup(name).map_err(|e| compile_err(e.to_string()))?
            }
            None => {
                return Err(compile_err(
                    "neither custom_policy nor predefined_policy is set".into(),
                ))
            }
        };

        self.backend.prepare(source).map_err(compile_err)
    }
}
