//! Error types for the lifecycle client.

use crate::config::ConfigError;
use sagekit_abstraction::ControlPlaneError;
use sagekit_resources::ResourceError;
use std::time::Duration;
use thiserror::Error;

/// Error taxonomy seen by callers, independent of where the error arose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Throttling,
    Timeout,
    Transport,
    Failed,
}

/// Error type for lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Rejected locally before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Classified failure reported by the transport.
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    /// `wait` did not observe a terminal status within its timeout.
    #[error("Timed out after {elapsed:?} waiting for {name} to reach a terminal status")]
    Timeout { name: String, elapsed: Duration },

    /// The resource reached a failed terminal status.
    #[error("{name} reached status {status}: {reason}")]
    ResourceFailed { name: String, status: String, reason: String },

    /// The control plane answered with a payload that does not match the schema.
    #[error("Malformed {operation} response: {message}")]
    MalformedResponse { operation: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LifecycleError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::Config(_) => ErrorKind::Validation,
            Self::ControlPlane(err) => match err {
                ControlPlaneError::Validation(_) => ErrorKind::Validation,
                ControlPlaneError::NotFound(_) => ErrorKind::NotFound,
                ControlPlaneError::Conflict(_) => ErrorKind::Conflict,
                ControlPlaneError::Throttling(_) => ErrorKind::Throttling,
                ControlPlaneError::Transport(_) | ControlPlaneError::Serialization(_) => {
                    ErrorKind::Transport
                }
            },
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ResourceFailed { .. } => ErrorKind::Failed,
            Self::MalformedResponse { .. } => ErrorKind::Transport,
        }
    }

    pub(crate) fn malformed(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::MalformedResponse { operation: operation.to_string(), message: err.to_string() }
    }
}

impl From<ResourceError> for LifecycleError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::InvalidSpec(msg) | ResourceError::InvalidUpdate(msg) => Self::Validation(msg),
            ResourceError::Json(e) => Self::Validation(e.to_string()),
        }
    }
}

/// Result type alias for lifecycle operations.
pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classifies_transport_errors() {
        let cases = [
            (ControlPlaneError::Validation("v".to_string()), ErrorKind::Validation),
            (ControlPlaneError::NotFound("n".to_string()), ErrorKind::NotFound),
            (ControlPlaneError::Conflict("c".to_string()), ErrorKind::Conflict),
            (ControlPlaneError::Throttling("t".to_string()), ErrorKind::Throttling),
            (ControlPlaneError::Transport("x".to_string()), ErrorKind::Transport),
        ];
        for (err, expected) in cases {
            assert_eq!(LifecycleError::from(err).kind(), expected);
        }
    }

    #[test]
    fn test_resource_error_becomes_validation() {
        let err: LifecycleError = ResourceError::InvalidUpdate("RoleArn is immutable".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("RoleArn is immutable"));
    }

    #[test]
    fn test_failed_display_carries_reason() {
        let err = LifecycleError::ResourceFailed {
            name: "job-1".to_string(),
            status: "Failed".to_string(),
            reason: "AlgorithmError: out of memory".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Failed);
        assert!(err.to_string().contains("out of memory"));
    }
}
