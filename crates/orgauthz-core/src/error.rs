//! Shared error type across orgauthz crates.

use thiserror::Error;

/// Boxed error produced by external collaborators (policy stores).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable error codes for callers mapping authorization results to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The user is not allowed to perform the action.
    InsufficientPrivilege,
    /// Policy store unreachable or failing.
    StoreUnavailable,
    /// Policy document or policy source is invalid.
    InvalidPolicy,
    /// User alias could not be resolved.
    AliasResolution,
    /// Compiled query failed to evaluate.
    Evaluation,
    /// Caller cancelled or deadline exceeded.
    Cancelled,
    /// Invalid configuration.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InsufficientPrivilege => "INSUFFICIENT_PRIVILEGE",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::InvalidPolicy => "INVALID_POLICY",
            ErrorCode::AliasResolution => "ALIAS_RESOLUTION",
            ErrorCode::Evaluation => "EVALUATION",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The normal "no" answer of `authorize`.
    #[error("insufficient privilege")]
    InsufficientPrivilege,
    #[error("policy store: {0}")]
    Store(#[source] BoxError),
    #[error("invalid policy document: {0}")]
    InvalidDocument(String),
    #[error("unknown predefined policy: {0}")]
    UnknownPredefinedPolicy(String),
    #[error("policy compile failed (org={org}): {reason}")]
    Compile { org: String, reason: String },
    #[error("alias resolution failed: {0}")]
    AliasResolution(String),
    #[error("query evaluation failed: {0}")]
    Evaluation(String),
    #[error("cancelled")]
    Cancelled,
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl AuthzError {
    /// Map internal error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthzError::InsufficientPrivilege => ErrorCode::InsufficientPrivilege,
            AuthzError::Store(_) => ErrorCode::StoreUnavailable,
            AuthzError::InvalidDocument(_)
            | AuthzError::UnknownPredefinedPolicy(_)
            | AuthzError::Compile { .. } => ErrorCode::InvalidPolicy,
            AuthzError::AliasResolution(_) => ErrorCode::AliasResolution,
            AuthzError::Evaluation(_) => ErrorCode::Evaluation,
            AuthzError::Cancelled => ErrorCode::Cancelled,
            AuthzError::BadConfig(_) | AuthzError::UnsupportedVersion => ErrorCode::BadConfig,
            AuthzError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for the sentinel "forbidden" answer.
    pub fn is_insufficient_privilege(&self) -> bool {
        matches!(self, AuthzError::InsufficientPrivilege)
    }
}
