//! orgauthz core: runtime-free authorization contracts, error types, and the
//! policy document model.
//!
//! This crate defines the types shared by the engine, the request-serving
//! layer, and policy tooling. It carries no async runtime or rule-engine
//! dependency so it can be reused wherever policies are read or validated.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `AuthzError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod action;
pub mod error;
pub mod policy;

pub use action::Action;
/// Shared result type.
pub use error::{AuthzError, BoxError, ErrorCode, Result};
