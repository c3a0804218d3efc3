//! Built-in policy templates selectable by name.
//!
//! Templates are Rego modules in the `artifacthub.authz` package, parameterized
//! through the organization's `policy_data` (merged into `input`).
//!
//! `rbac.v1` reads `input.roles`, a map of role name to
//! `{ users: [alias], allowed_actions?: [action] }`. Members of `owner` may do
//! everything and list `["all"]`; everybody else gets the union of their roles'
//! `allowed_actions`, possibly empty.

use orgauthz_core::error::{AuthzError, Result};

pub const RBAC_V1: &str = "rbac.v1";

const RBAC_V1_SOURCE: &str = include_str!("rbac_v1.rego");

const CATALOGUE: [(&str, &str); 1] = [(RBAC_V1, RBAC_V1_SOURCE)];

/// Rule source of the named template.
pub fn lookup(name: &str) -> Result<&'static str> {
    CATALOGUE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, src)| *src)
        .ok_or_else(|| AuthzError::UnknownPredefinedPolicy(name.to_string()))
}

/// Names of all registered templates.
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOGUE.iter().map(|(n, _)| *n)
}
