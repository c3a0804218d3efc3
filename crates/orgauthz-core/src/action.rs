//! Platform action identifiers.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a platform operation (e.g. `addOrganizationMember`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(Cow<'static, str>);

impl Action {
    /// Sentinel meaning "every action". Only ever appears in results.
    pub const ALL: Action = Action::from_static("all");

    pub const ADD_ORGANIZATION_MEMBER: Action = Action::from_static("addOrganizationMember");
    pub const ADD_ORGANIZATION_REPOSITORY: Action =
        Action::from_static("addOrganizationRepository");
    pub const DELETE_ORGANIZATION: Action = Action::from_static("deleteOrganization");
    pub const DELETE_ORGANIZATION_MEMBER: Action = Action::from_static("deleteOrganizationMember");
    pub const DELETE_ORGANIZATION_REPOSITORY: Action =
        Action::from_static("deleteOrganizationRepository");
    pub const GET_AUTHORIZATION_POLICY: Action = Action::from_static("getAuthorizationPolicy");
    pub const TRANSFER_ORGANIZATION_REPOSITORY: Action =
        Action::from_static("transferOrganizationRepository");
    pub const UPDATE_AUTHORIZATION_POLICY: Action =
        Action::from_static("updateAuthorizationPolicy");
    pub const UPDATE_ORGANIZATION: Action = Action::from_static("updateOrganization");
    pub const UPDATE_ORGANIZATION_REPOSITORY: Action =
        Action::from_static("updateOrganizationRepository");

    pub const fn from_static(name: &'static str) -> Self {
        Action(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Action(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the `"all"` sentinel.
    pub fn is_all(&self) -> bool {
        self.as_str() == Self::ALL.as_str()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::new(s)
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::new(s)
    }
}
