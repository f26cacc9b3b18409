//! Pricing error types.

use uuid::Uuid;

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid date range: {reason}")]
    InvalidRange { reason: String },

    #[error("Property {property_id} not found")]
    PropertyNotFound { property_id: Uuid },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        errors: Vec<String>,
    },

    #[error("Repository error: {0}")]
    Repository(String),
}

impl PricingError {
    pub fn invalid_range(reason: impl Into<String>) -> Self {
        PricingError::InvalidRange {
            reason: reason.into(),
        }
    }

    /// Short machine-readable tag used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::InvalidRange { .. } => "invalid_range",
            PricingError::PropertyNotFound { .. } => "property_not_found",
            PricingError::Configuration { .. } => "configuration_error",
            PricingError::Repository(_) => "repository_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::invalid_range("check-in must be before check-out");
        assert!(err.to_string().contains("check-in must be before check-out"));

        let id = Uuid::nil();
        let err = PricingError::PropertyNotFound { property_id: id };
        assert!(err.to_string().contains(&id.to_string()));

        let err = PricingError::Configuration {
            message: "overlapping seasons".to_string(),
            errors: vec![],
        };
        assert!(err.to_string().contains("overlapping seasons"));
    }

    #[test]
    fn test_pricing_error_kind() {
        assert_eq!(PricingError::invalid_range("x").kind(), "invalid_range");
        assert_eq!(
            PricingError::Repository("down".to_string()).kind(),
            "repository_error"
        );
    }
}
