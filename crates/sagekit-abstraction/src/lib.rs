//! Control-plane abstraction layer for sagekit.
//!
//! This crate defines the transport boundary every resource client talks
//! through, the classified failures a transport may report, and the field
//! types shared by generated resource snapshots.

pub mod field;

pub use field::{lookup_field, Field, FieldDescriptor};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Keyword payload exchanged with the control plane, in both directions.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Payload key carrying the pagination cursor on list requests and responses.
pub const NEXT_TOKEN_KEY: &str = "NextToken";

/// Result type alias for transport calls.
pub type ControlPlaneResult<T> = std::result::Result<T, ControlPlaneError>;

/// A classified failure reported by a control-plane transport.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPlaneError {
    /// The request was rejected as malformed or not allowed (never retried).
    #[error("Validation Error: {0}")]
    Validation(String),

    /// The named resource is unknown to the control plane (never retried).
    #[error("Resource Not Found: {0}")]
    NotFound(String),

    /// The resource is in a state incompatible with the request (never retried).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The control plane asked the caller to slow down.
    #[error("Throttled: {0}")]
    Throttling(String),

    /// Connectivity or other transient failure below the API layer.
    #[error("Transport Error: {0}")]
    Transport(String),

    /// A payload could not be encoded or decoded.
    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl ControlPlaneError {
    /// Map a service error code onto the taxonomy.
    ///
    /// Codes follow the `*Exception` naming used by AWS-style JSON APIs.
    /// Unrecognized codes are treated as transport failures.
    #[must_use]
    pub fn from_error_code(code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            "ValidationException" | "InvalidParameterValue" | "MissingParameter" => {
                Self::Validation(message)
            }
            "ResourceNotFound" | "ResourceNotFoundException" => Self::NotFound(message),
            "ResourceInUse" | "ConflictException" | "ResourceLimitExceeded" => {
                Self::Conflict(message)
            }
            "ThrottlingException" | "Throttling" | "TooManyRequestsException" => {
                Self::Throttling(message)
            }
            _ => Self::Transport(format!("{code}: {message}")),
        }
    }

    /// Only throttling is worth retrying at the transport layer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttling(_))
    }
}

impl From<serde_json::Error> for ControlPlaneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Request-execution boundary to a remote control plane.
///
/// An implementation submits a named operation (e.g. `DescribeTrainingJob`)
/// with a keyword payload and returns the structured response, or a
/// classified [`ControlPlaneError`]. Implementations must be `Send + Sync`
/// so one transport can be shared by several clients.
pub trait ControlPlane: Send + Sync {
    /// Executes a single operation and blocks until the response arrives.
    ///
    /// # Errors
    /// Returns a `ControlPlaneError` classifying why the call failed.
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload>;
}

impl<T: ControlPlane + ?Sized> ControlPlane for Arc<T> {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        (**self).execute(operation, payload)
    }
}

impl<T: ControlPlane + ?Sized> ControlPlane for Box<T> {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        (**self).execute(operation, payload)
    }
}

impl<T: ControlPlane + ?Sized> ControlPlane for &T {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        (**self).execute(operation, payload)
    }
}

/// Serializes a request struct into a keyword payload.
///
/// # Errors
/// Returns `ControlPlaneError::Serialization` if the value is not a JSON object.
pub fn to_payload<T: Serialize>(value: &T) -> ControlPlaneResult<Payload> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(ControlPlaneError::Serialization(format!(
            "expected a JSON object payload, got {other}"
        ))),
    }
}

/// Deserializes a response payload into a typed structure.
///
/// # Errors
/// Returns `ControlPlaneError::Serialization` if the payload does not match `T`.
pub fn from_payload<T: DeserializeOwned>(payload: Payload) -> ControlPlaneResult<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(payload))?)
}
