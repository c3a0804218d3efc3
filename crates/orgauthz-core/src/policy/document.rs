//! Authorization policy document (as returned by the policy store).
//!
//! Wire shape:
//! `{ "<org name>": { "authorization_enabled": bool, "predefined_policy"?: string,
//!    "custom_policy"?: string, "policy_data": object } }`

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AuthzError, Result};

/// One organization's policy entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationPolicy {
    /// When false the organization enforces nothing.
    pub authorization_enabled: bool,
    /// Name of a built-in template (e.g. `rbac.v1`).
    #[serde(default)]
    pub predefined_policy: Option<String>,
    /// Organization-authored rule source.
    #[serde(default)]
    pub custom_policy: Option<String>,
    /// Parameters merged into the evaluation input.
    #[serde(default, deserialize_with = "object_or_null")]
    pub policy_data: Map<String, Value>,
}

/// Where an organization's rule source comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySource<'a> {
    Custom(&'a str),
    Predefined(&'a str),
}

impl OrganizationPolicy {
    /// Custom source takes precedence over a predefined template name.
    pub fn source(&self) -> Option<PolicySource<'_>> {
        match (&self.custom_policy, &self.predefined_policy) {
            (Some(src), _) if !src.trim().is_empty() => Some(PolicySource::Custom(src)),
            (_, Some(name)) => Some(PolicySource::Predefined(name)),
            _ => None,
        }
    }
}

/// Full document keyed by organization name.
pub type PolicyDocument = BTreeMap<String, OrganizationPolicy>;

/// Parse raw store bytes into a policy document.
pub fn parse_policy_document(raw: &[u8]) -> Result<PolicyDocument> {
    serde_json::from_slice(raw).map_err(|e| AuthzError::InvalidDocument(e.to_string()))
}

fn object_or_null<'de, D>(de: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(de)? {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(serde::de::Error::custom(format!(
            "policy_data must be an object, got {other}"
        ))),
    }
}
