//! # DomainError
//!
//! Centralized error type for every service and port in the workspace.
//! Each variant corresponds to exactly one HTTP status in the api adapter.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input (e.g., empty title, unparsable body)
    #[error("{0}")]
    Validation(String),

    /// Resource already exists (e.g., username taken)
    #[error("{0}")]
    Duplicate(String),

    /// Missing, malformed or expired credentials
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid credentials with an insufficient role
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found, including malformed identifiers
    #[error("{0}")]
    NotFound(String),

    /// Infrastructure failure (e.g., DB down, hashing task panicked)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    pub fn username_taken() -> Self {
        DomainError::Duplicate("Username already exists".to_string())
    }

    pub fn post_not_found() -> Self {
        DomainError::NotFound("Post not found".to_string())
    }

    /// The single message returned for every failed sign-in, so callers
    /// cannot tell an unknown username from a wrong password.
    pub fn invalid_credentials() -> Self {
        DomainError::Unauthenticated(
            "Invalid username or password. Please check credentials.".to_string(),
        )
    }
}

/// A specialized Result type for domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
