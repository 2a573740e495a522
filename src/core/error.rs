//! Unified error handling for the Aegis planning core
//!
//! Every failure mode that can cross the crate boundary is a variant of
//! [`AegisError`]. The enum is wire-stable: each variant maps to exactly one
//! HTTP-style status code so any façade can translate errors without
//! inspecting messages.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Main error type for all Aegis operations
#[derive(Error, Debug)]
pub enum AegisError {
    // Request validation errors
    /// Request fields out of range or otherwise malformed
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    /// Planning or mutation attempted while the mission is in a terminal state
    #[error("Mission {mission_id} is in '{status}' state and cannot be modified")]
    InvalidMissionState { mission_id: Uuid, status: String },

    /// Explanation request missing a required field or using an unsupported type
    #[error("Invalid explanation request: {message}")]
    InvalidExplanationRequest { message: String },

    // Lookup errors
    /// Mission id not present in the registry
    #[error("Mission with ID {entity_id} not found")]
    MissionNotFound { entity_id: Uuid },

    /// Victim id not present in the mission environment
    #[error("Victim with ID {entity_id} not found")]
    VictimNotFound { entity_id: Uuid },

    /// Agent id not present in the mission roster
    #[error("Agent with ID {entity_id} not found")]
    AgentNotFound { entity_id: Uuid },

    // Conflict errors
    /// Attempt to register a mission under an id that already exists
    #[error("Mission with ID {entity_id} already exists")]
    MissionConflict { entity_id: Uuid },

    /// Rate limit exceeded; reserved for the hosting façade
    #[error("Rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded { retry_after_seconds: u64 },

    // Internal failures
    /// Unexpected condition inside the planning pipeline
    #[error("Planning failed: {message}")]
    PlanningFailure { message: String },

    /// Unexpected condition while building a metrics summary
    #[error("Metrics calculation failed: {message}")]
    MetricsFailure { message: String },

    /// A mission-scoped service could not be brought up
    #[error("Service '{service}' failed to initialize: {message}")]
    ServiceInitialization { service: String, message: String },

    /// Explanation type is recognized by the wire contract but not yet wired
    #[error("Explanation type '{explanation_type}' not implemented")]
    ExplanationNotImplemented { explanation_type: String },
}

impl AegisError {
    /// Create an invalid-parameters error
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an invalid-explanation-request error
    pub fn invalid_explanation(message: impl Into<String>) -> Self {
        Self::InvalidExplanationRequest {
            message: message.into(),
        }
    }

    /// Create a planning-failure error
    pub fn planning(message: impl Into<String>) -> Self {
        Self::PlanningFailure {
            message: message.into(),
        }
    }

    /// Create a metrics-failure error
    pub fn metrics(message: impl Into<String>) -> Self {
        Self::MetricsFailure {
            message: message.into(),
        }
    }

    /// Create a service-initialization error
    pub fn service_init(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceInitialization {
            service: service.into(),
            message: message.into(),
        }
    }

    /// The id of the entity a lookup or conflict error refers to, if any
    pub fn entity_id(&self) -> Option<Uuid> {
        match self {
            Self::MissionNotFound { entity_id }
            | Self::VictimNotFound { entity_id }
            | Self::AgentNotFound { entity_id }
            | Self::MissionConflict { entity_id } => Some(*entity_id),
            _ => None,
        }
    }

    /// Stable wire status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidParameters { .. }
            | Self::InvalidMissionState { .. }
            | Self::InvalidExplanationRequest { .. } => 400,
            Self::MissionNotFound { .. }
            | Self::VictimNotFound { .. }
            | Self::AgentNotFound { .. } => 404,
            Self::MissionConflict { .. } => 409,
            Self::RateLimitExceeded { .. } => 429,
            Self::PlanningFailure { .. }
            | Self::MetricsFailure { .. }
            | Self::ServiceInitialization { .. } => 500,
            Self::ExplanationNotImplemented { .. } => 501,
        }
    }

    /// Get the error category for logging and metrics
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidParameters { .. } | Self::InvalidMissionState { .. } => {
                ErrorCategory::Validation
            }
            Self::MissionNotFound { .. }
            | Self::VictimNotFound { .. }
            | Self::AgentNotFound { .. }
            | Self::MissionConflict { .. } => ErrorCategory::Registry,
            Self::RateLimitExceeded { .. } => ErrorCategory::Throttling,
            Self::PlanningFailure { .. } => ErrorCategory::Planning,
            Self::MetricsFailure { .. } => ErrorCategory::Metrics,
            Self::InvalidExplanationRequest { .. } | Self::ExplanationNotImplemented { .. } => {
                ErrorCategory::Explainability
            }
            Self::ServiceInitialization { .. } => ErrorCategory::System,
        }
    }
}

/// Error category for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Validation,
    Registry,
    Throttling,
    Planning,
    Metrics,
    Explainability,
    System,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Registry => write!(f, "registry"),
            Self::Throttling => write!(f, "throttling"),
            Self::Planning => write!(f, "planning"),
            Self::Metrics => write!(f, "metrics"),
            Self::Explainability => write!(f, "explainability"),
            Self::System => write!(f, "system"),
        }
    }
}

impl From<tokio::task::JoinError> for AegisError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::ServiceInitialization {
            service: "compute-pool".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AegisError {
    fn from(err: serde_json::Error) -> Self {
        Self::MetricsFailure {
            message: format!("serialization error: {}", err),
        }
    }
}

/// Result type alias for Aegis operations
pub type Result<T> = std::result::Result<T, AegisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_wire_stable() {
        let id = Uuid::new_v4();
        assert_eq!(AegisError::invalid_parameters("x").status_code(), 400);
        assert_eq!(
            AegisError::InvalidMissionState {
                mission_id: id,
                status: "completed".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            AegisError::MissionNotFound { entity_id: id }.status_code(),
            404
        );
        assert_eq!(
            AegisError::MissionConflict { entity_id: id }.status_code(),
            409
        );
        assert_eq!(
            AegisError::RateLimitExceeded {
                retry_after_seconds: 60
            }
            .status_code(),
            429
        );
        assert_eq!(AegisError::planning("boom").status_code(), 500);
        assert_eq!(
            AegisError::ExplanationNotImplemented {
                explanation_type: "task_decomposition".into()
            }
            .status_code(),
            501
        );
    }

    #[test]
    fn test_entity_id_carried_on_lookup_errors() {
        let id = Uuid::new_v4();
        let err = AegisError::VictimNotFound { entity_id: id };
        assert_eq!(err.entity_id(), Some(id));
        assert!(AegisError::planning("x").entity_id().is_none());
    }

    #[test]
    fn test_categories() {
        let id = Uuid::new_v4();
        assert_eq!(
            AegisError::MissionConflict { entity_id: id }.category(),
            ErrorCategory::Registry
        );
        assert_eq!(AegisError::metrics("bad").category(), ErrorCategory::Metrics);
        assert_eq!(
            AegisError::invalid_parameters("bad").category(),
            ErrorCategory::Validation
        );
    }
}
