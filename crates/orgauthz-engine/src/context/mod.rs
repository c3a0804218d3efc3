//! Per-request context types shared across layers.

pub mod request;

pub use request::RequestContext;
