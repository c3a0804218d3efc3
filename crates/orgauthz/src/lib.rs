//! Top-level facade crate for orgauthz.
//!
//! Re-exports the policy model and the authorization engine so users can
//! depend on a single crate.

pub mod core {
    pub use orgauthz_core::*;
}

pub mod engine {
    pub use orgauthz_engine::*;
}

pub use orgauthz_core::{Action, AuthzError, Result};
pub use orgauthz_engine::{Authorizer, RequestContext};
