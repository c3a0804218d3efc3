//! Request and evaluation inputs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::Action;

/// Input of an `authorize` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeInput {
    pub organization_name: String,
    pub user_id: String,
    pub action: Action,
}

impl AuthorizeInput {
    pub fn new(
        organization_name: impl Into<String>,
        user_id: impl Into<String>,
        action: Action,
    ) -> Self {
        Self {
            organization_name: organization_name.into(),
            user_id: user_id.into(),
            action,
        }
    }
}

/// Document handed to a compiled query: `policy_data` fields plus `user` and
/// (when checking a single action) `action`.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationInput(Map<String, Value>);

impl EvaluationInput {
    /// `user` and `action` overwrite same-named `policy_data` fields.
    pub fn new(alias: &str, action: Option<&Action>, policy_data: &Map<String, Value>) -> Self {
        let mut doc = policy_data.clone();
        doc.insert("user".to_string(), Value::String(alias.to_string()));
        match action {
            Some(a) => {
                doc.insert("action".to_string(), Value::String(a.as_str().to_string()));
            }
            None => {
                doc.remove("action");
            }
        }
        Self(doc)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}
