//! Caller-facing error taxonomy.
//!
//! # Responsibility
//! - Classify every service failure as validation, not-found, conflict or
//!   technical so callers can tell bad input from stale references.
//! - Provide the stable response code for each class.
//!
//! # Invariants
//! - `Validation` is only produced before any side effect.
//! - `Technical` carries internal detail for logs; the envelope exposes only
//!   the code and generic description.

use crate::model::EntityId;
use crate::repo::entity_store::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every catalog service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed or missing input; fix the request and retry.
    Validation(String),
    /// Referenced record does not exist.
    NotFound { kind: &'static str, id: EntityId },
    /// Natural-key or reference conflict; retrying may succeed.
    Conflict(String),
    /// Storage failure or aborted transaction.
    Technical(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn technical(message: impl Into<String>) -> Self {
        Self::Technical(message.into())
    }

    /// Stable response code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "DP-422",
            Self::NotFound { .. } => "DP-404",
            Self::Conflict(_) => "DP-409",
            Self::Technical(_) => "DP-500",
        }
    }

    /// Generic description that is safe to show to callers.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Client Error",
            Self::NotFound { .. } => "Not Found",
            Self::Conflict(_) => "Conflict",
            Self::Technical(_) => "Technical Error",
        }
    }

    /// Whether the caller may retry the identical request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation failed: {message}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Technical(message) => write!(f, "technical failure: {message}"),
        }
    }
}

impl Error for ServiceError {}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::InvalidQuery(message) => Self::Validation(message),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Technical(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::entity_store::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_distinct_kinds() {
        let id = Uuid::new_v4();
        let not_found: ServiceError = RepoError::NotFound { kind: "image", id }.into();
        assert_eq!(not_found.code(), "DP-404");

        let invalid: ServiceError = RepoError::InvalidQuery("bad".to_string()).into();
        assert_eq!(invalid.code(), "DP-422");

        let conflict: ServiceError = RepoError::Conflict("dup".to_string()).into();
        assert!(conflict.is_retryable());

        let technical: ServiceError = RepoError::MissingRequiredTable("images").into();
        assert_eq!(technical.code(), "DP-500");
        assert_eq!(technical.description(), "Technical Error");
    }
}
