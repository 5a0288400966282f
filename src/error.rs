//! Unified error hierarchy for racecraft
//!
//! Validation failures are field-identified and raised before any computation
//! begins; calculation errors guard the few places the arithmetic chain could
//! otherwise produce an infinite or undefined value.

use thiserror::Error;

/// Top-level error type for all racecraft operations
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (scenario files, JSON output)
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Field-identified input validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Required field absent or blank
    #[error("{field} is required")]
    Missing { field: String },

    /// Field could not be parsed as a number
    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: String, value: String },

    /// Field must be strictly positive
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: String, value: String },

    /// Field outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        value: String,
    },

    /// Text that does not match the expected form (dates, enum names)
    #[error("{field} must be {expected}, got '{value}'")]
    Malformed {
        field: String,
        value: String,
        expected: String,
    },

    /// Maximum heart rate not above resting heart rate
    #[error("hr_max ({hr_max}) must be greater than hr_rest ({hr_rest})")]
    HeartRateOrder { hr_max: u16, hr_rest: u16 },

    /// Manual zone boundaries not strictly increasing or outside [50, 100]
    #[error("zone boundaries invalid: {reason}")]
    ZoneBoundaries { reason: String },
}

impl ValidationError {
    /// Name of the offending field, for presentation layers that highlight inputs
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Malformed { field, .. } => field,
            ValidationError::HeartRateOrder { .. } => "profile.hr_max",
            ValidationError::ZoneBoundaries { .. } => "zone_boundaries",
        }
    }
}

/// Calculation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    /// Division by zero
    #[error("Division by zero in {calculation}")]
    DivisionByZero { calculation: String },

    /// Result was NaN or infinite
    #[error("Non-finite result in {calculation}")]
    NonFinite { calculation: String },

    /// Result does not fit the numeric type that carries it
    #[error("Result out of range in {calculation}")]
    Overflow { calculation: String },
}

impl CalculationError {
    pub fn overflow(calculation: &str) -> Self {
        CalculationError::Overflow {
            calculation: calculation.to_string(),
        }
    }
}

/// Result type alias for racecraft operations
pub type Result<T> = std::result::Result<T, PlannerError>;

impl PlannerError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlannerError::Validation(_) => ErrorSeverity::Warning,
            PlannerError::Configuration(_) => ErrorSeverity::Error,
            PlannerError::Io(_) => ErrorSeverity::Error,
            PlannerError::Serialization(_) => ErrorSeverity::Error,
            PlannerError::Calculation(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Validation(err) => {
                format!("Please check the '{}' field: {}", err.field(), err)
            }
            PlannerError::Calculation(CalculationError::DivisionByZero { calculation }) => {
                format!(
                    "Unable to compute {}. Please make sure all distances and times are greater than zero.",
                    calculation
                )
            }
            PlannerError::Calculation(CalculationError::Overflow { calculation }) => {
                format!(
                    "The {} is too large to plan for. Please check the distances and times entered.",
                    calculation
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Internal inconsistency; inputs passed validation but the math failed
    Critical,
    /// Error that prevents operation
    Error,
    /// Bad input; the caller can fix it and retry
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = PlannerError::Validation(ValidationError::Missing {
            field: "goal.distance_km".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = PlannerError::Calculation(CalculationError::NonFinite {
            calculation: "riegel prediction".to_string(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_validation_field_identified() {
        let err = ValidationError::NotPositive {
            field: "goal.prep_weeks".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.field(), "goal.prep_weeks");

        let err = ValidationError::HeartRateOrder { hr_max: 60, hr_rest: 70 };
        assert_eq!(err.field(), "profile.hr_max");
    }

    #[test]
    fn test_user_messages() {
        let err: PlannerError = ValidationError::Missing {
            field: "performance.distance_km".to_string(),
        }
        .into();
        let message = err.user_message();
        assert!(message.contains("performance.distance_km"));
        assert!(message.contains("required"));

        let err: PlannerError = CalculationError::DivisionByZero {
            calculation: "target pace".to_string(),
        }
        .into();
        assert!(err.user_message().contains("target pace"));

        let err: PlannerError = CalculationError::overflow("suggested target time").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_message().contains("suggested target time is too large"));
    }
}
