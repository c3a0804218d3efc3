//! Transport layer (HTTP).
//!
//! Thin JSON handlers that translate requests into authorizer calls and
//! authorizer errors into status codes.

pub mod http;
