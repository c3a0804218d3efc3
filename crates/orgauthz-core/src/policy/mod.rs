//! Policy definition model.
//!
//! In-memory representation of the per-organization policy document and the
//! inputs passed into compiled queries.

pub mod document;
pub mod input;

pub use document::{parse_policy_document, OrganizationPolicy, PolicyDocument, PolicySource};
pub use input::{AuthorizeInput, EvaluationInput};
