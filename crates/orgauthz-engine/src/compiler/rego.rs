//! Rego backend (regorus).
//!
//! A compiled organization holds one parsed engine per query. Evaluation
//! clones the prepared engine, so the published value is never mutated.

use std::sync::Arc;

use regorus::{Engine, Value};

use orgauthz_core::error::{AuthzError, Result};
use orgauthz_core::policy::EvaluationInput;
use orgauthz_core::Action;

use super::{OrgQueries, QueryBackend, ALLOWED_ACTIONS_QUERY, ALLOW_QUERY};

#[derive(Debug, Default, Clone, Copy)]
pub struct RegoBackend;

impl QueryBackend for RegoBackend {
    fn prepare(&self, source: &str) -> std::result::Result<Arc<dyn OrgQueries>, String> {
        Ok(Arc::new(RegoOrgQueries::compile(source)?))
    }
}

#[derive(Clone)]
struct PreparedQuery {
    engine: Engine,
    query: &'static str,
}

impl PreparedQuery {
    fn prepare(engine: &Engine, query: &'static str) -> std::result::Result<Self, String> {
        let mut prepared = Self {
            engine: engine.clone(),
            query,
        };
        // Dry run against an empty input so analysis errors surface at compile time.
        let empty = Value::from_json_str("{}").map_err(|e| e.to_string())?;
        prepared.engine.set_input(empty);
        prepared
            .engine
            .eval_query(query.to_string(), false)
            .map_err(|e| format!("{query}: {e}"))?;
        Ok(prepared)
    }

    fn eval(&self, input: &EvaluationInput) -> Result<Value> {
        let input = Value::from_json_str(&input.to_json_string())
            .map_err(|e| AuthzError::Evaluation(format!("input conversion: {e}")))?;

        let mut engine = self.engine.clone();
        engine.set_input(input);
        let results = engine
            .eval_query(self.query.to_string(), false)
            .map_err(|e| AuthzError::Evaluation(format!("{}: {e}", self.query)))?;

        Ok(results
            .result
            .into_iter()
            .next()
            .and_then(|r| r.expressions.into_iter().next())
            .map(|e| e.value)
            .unwrap_or(Value::Undefined))
    }
}

/// `allow` and `allowed_actions` prepared from one Rego module.
#[derive(Clone)]
pub struct RegoOrgQueries {
    allow: PreparedQuery,
    allowed_actions: PreparedQuery,
}

impl RegoOrgQueries {
    pub fn compile(source: &str) -> std::result::Result<Self, String> {
        let mut engine = Engine::new();
        engine
            .add_policy("policy.rego".to_string(), source.to_string())
            .map_err(|e| e.to_string())?;

        Ok(Self {
            allow: PreparedQuery::prepare(&engine, ALLOW_QUERY)?,
            allowed_actions: PreparedQuery::prepare(&engine, ALLOWED_ACTIONS_QUERY)?,
        })
    }
}

impl OrgQueries for RegoOrgQueries {
    fn evaluate_allow(&self, input: &EvaluationInput) -> Result<bool> {
        Ok(matches!(self.allow.eval(input)?, Value::Bool(true)))
    }

    fn evaluate_allowed_actions(&self, input: &EvaluationInput) -> Result<Option<Vec<Action>>> {
        let items: Vec<Value> = match self.allowed_actions.eval(input)? {
            Value::Undefined => return Ok(None),
            Value::Array(items) => items.iter().cloned().collect(),
            Value::Set(items) => items.iter().cloned().collect(),
            other => {
                return Err(AuthzError::Evaluation(format!(
                    "allowed_actions must be a list, got {}",
                    other.to_json_str().unwrap_or_default()
                )))
            }
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(Action::new(s.to_string())),
                other => Err(AuthzError::Evaluation(format!(
                    "allowed_actions entries must be strings, got {}",
                    other.to_json_str().unwrap_or_default()
                ))),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
