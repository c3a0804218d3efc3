//! orgauthz engine library entry.
//!
//! This crate wires the policy store, predefined templates, query compiler,
//! snapshot, and authorizer into a hot-reloadable authorization engine. The
//! HTTP surface (`router`, `transport`, `ops`) is consumed by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod app_state;
pub mod authorizer;
pub mod compiler;
pub mod config;
pub mod context;
pub mod obs;
pub mod ops;
pub mod predefined;
pub mod router;
pub mod snapshot;
pub mod store;
pub mod transport;

pub use authorizer::Authorizer;
pub use context::RequestContext;
pub use snapshot::PolicySnapshot;
pub use store::{ChangeSubscription, PolicyStore};
