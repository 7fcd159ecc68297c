//! Error types for the tween scheduler

/// Errors raised by scheduler, sequence, registry and evaluator operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FluxError {
    /// A live unit already holds the requested name
    #[error("Name '{name}' is already held by a live unit")]
    NameConflict { name: String },

    /// No evaluator can drive the requested value/profile pair
    #[error("Configuration error: {reason}")]
    ConfigurationError { reason: String },

    /// Unit is already owned by another sequence, or the add would form a cycle
    #[error("Ownership violation: {reason}")]
    OwnershipViolation { reason: String },

    /// Argument outside its accepted range
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Handle does not refer to a unit in this engine
    #[error("Unit not found: {id}")]
    UnitNotFound { id: String },

    /// Operation is not valid in the unit's current state
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    /// Manual driver gave up before the unit terminated
    #[error("Unit did not complete within {max_time} seconds")]
    Timeout { max_time: f32 },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl FluxError {
    pub(crate) fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    pub(crate) fn ownership(reason: impl Into<String>) -> Self {
        Self::OwnershipViolation {
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NameConflict { .. } | Self::InvalidArgument { .. } | Self::Timeout { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::NameConflict { .. } => "registry",
            Self::ConfigurationError { .. } => "configuration",
            Self::OwnershipViolation { .. } => "ownership",
            Self::InvalidArgument { .. } | Self::InvalidState { .. } => "validation",
            Self::UnitNotFound { .. } => "lookup",
            Self::Timeout { .. } => "driver",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for FluxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
