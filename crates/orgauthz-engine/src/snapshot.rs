//! Immutable per-organization compiled state.
//!
//! A snapshot is built wholesale from a policy document and published as a
//! unit; it is never edited afterwards. Disabled organizations are absent,
//! and absence means "no restriction".

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use orgauthz_core::error::Result;
use orgauthz_core::policy::PolicyDocument;

use crate::compiler::{OrgQueries, QueryCompiler};

/// One enforced organization: its queries and the data bound to them.
pub struct CompiledOrg {
    pub queries: Arc<dyn OrgQueries>,
    pub policy_data: Map<String, Value>,
}

#[derive(Default)]
pub struct PolicySnapshot {
    orgs: HashMap<String, Arc<CompiledOrg>>,
}

impl PolicySnapshot {
    /// Compile every enabled organization. The first compile error aborts.
    pub fn build(doc: &PolicyDocument, compiler: &QueryCompiler) -> Result<Self> {
        let mut orgs = HashMap::with_capacity(doc.len());
        for (name, policy) in doc {
            if !policy.authorization_enabled {
                continue;
            }
            let queries = compiler.compile(name, policy)?;
            orgs.insert(
                name.clone(),
                Arc::new(CompiledOrg {
                    queries,
                    policy_data: policy.policy_data.clone(),
                }),
            );
        }
        Ok(Self { orgs })
    }

    pub fn get(&self, org: &str) -> Option<Arc<CompiledOrg>> {
        self.orgs.get(org).cloned()
    }

    pub fn contains(&self, org: &str) -> bool {
        self.orgs.contains_key(org)
    }

    pub fn len(&self) -> usize {
        self.orgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.is_empty()
    }

    /// Enforced organization names, sorted.
    pub fn organizations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.orgs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
