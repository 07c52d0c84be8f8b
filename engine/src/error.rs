//! Error handling for the Field Analytics Engine
//!
//! Every failure maps to a stable error code so callers can render or
//! persist it without matching on message text.

use serde::Serialize;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum AnalyticsError {
    // Input errors
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Crop type '{0}' not supported")]
    UnsupportedCrop(String),

    #[error("No reference rate for {application_type} on {crop}")]
    UnsupportedApplication {
        application_type: String,
        crop: String,
    },

    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Environment errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conditions unavailable: {0}")]
    ConditionsUnavailable(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error")]
    InternalError(#[from] anyhow::Error),
}

/// Serializable error body handed to callers
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AnalyticsError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AnalyticsError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::InvalidGeometry(_) => "INVALID_GEOMETRY",
            AnalyticsError::UnsupportedCrop(_) => "UNSUPPORTED_CROP",
            AnalyticsError::UnsupportedApplication { .. } => "UNSUPPORTED_APPLICATION",
            AnalyticsError::Validation { .. } => "VALIDATION_ERROR",
            AnalyticsError::Configuration(_) => "CONFIGURATION_ERROR",
            AnalyticsError::ConditionsUnavailable(_) => "CONDITIONS_UNAVAILABLE",
            AnalyticsError::Cancelled => "CANCELLED",
            AnalyticsError::Serialization(_) => "SERIALIZATION_ERROR",
            AnalyticsError::Internal(_) | AnalyticsError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Only a failed conditions fetch is worth retrying unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalyticsError::ConditionsUnavailable(_))
    }

    pub fn detail(&self) -> ErrorDetail {
        let field = match self {
            AnalyticsError::Validation { field, .. } => Some(field.clone()),
            AnalyticsError::UnsupportedCrop(_) => Some("crop_type".to_string()),
            AnalyticsError::UnsupportedApplication { .. } => Some("type".to_string()),
            _ => None,
        };
        let message = match self {
            AnalyticsError::Validation { message, .. } => message.clone(),
            AnalyticsError::InternalError(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        }
    }
}

impl From<config::ConfigError> for AnalyticsError {
    fn from(err: config::ConfigError) -> Self {
        AnalyticsError::Configuration(err.to_string())
    }
}

/// Result type alias for engine operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_detail_carries_field() {
        let err = AnalyticsError::validation("ph_level", "Soil pH must be between 0 and 14");
        let detail = err.detail();
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("ph_level"));
        assert_eq!(detail.message, "Soil pH must be between 0 and 14");
    }

    #[test]
    fn test_only_conditions_failures_are_retryable() {
        assert!(AnalyticsError::ConditionsUnavailable("timeout".into()).is_retryable());
        assert!(!AnalyticsError::UnsupportedCrop("kale".into()).is_retryable());
        assert!(!AnalyticsError::Cancelled.is_retryable());
    }

    #[test]
    fn test_internal_error_hides_source() {
        let err = AnalyticsError::from(anyhow::anyhow!("worker panicked at stats.rs"));
        assert_eq!(err.detail().message, "An internal error occurred");
    }
}
