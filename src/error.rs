//! Custom error types and handling
//!
//! Configuration errors are raised at contest creation/edit time, never
//! during scoring; scoring, ranking, and rendering on well-formed input
//! are total and have no failure path of their own.

/// Engine-wide error type
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    // Configuration errors
    #[error("Unknown scoring rule: {0}")]
    UnknownRule(String),

    #[error("Contest must begin before it ends")]
    InvalidTimeRange,

    #[error("Lock time must lie within the contest window")]
    InvalidLockTime,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Visibility refusals
    #[error("Not visible: {0}")]
    VisibilityDenied(String),

    // Collaborator lookup failures
    #[error("Lookup error: {0}")]
    Lookup(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl ScoreError {
    /// Get the stable error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownRule(_) => "UNKNOWN_RULE",
            Self::InvalidTimeRange => "INVALID_TIME_RANGE",
            Self::InvalidLockTime => "INVALID_LOCK_TIME",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::VisibilityDenied(_) => "VISIBILITY_DENIED",
            Self::Lookup(_) => "LOOKUP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error is a configuration problem the caller can fix
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownRule(_)
                | Self::InvalidTimeRange
                | Self::InvalidLockTime
                | Self::Configuration(_)
        )
    }
}

/// Result type alias using ScoreError
pub type ScoreResult<T> = Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ScoreError::UnknownRule("xyz".into()).error_code(),
            "UNKNOWN_RULE"
        );
        assert_eq!(ScoreError::InvalidTimeRange.error_code(), "INVALID_TIME_RANGE");
        assert!(ScoreError::InvalidLockTime.is_configuration());
        assert!(!ScoreError::VisibilityDenied("scoreboard".into()).is_configuration());
    }
}
