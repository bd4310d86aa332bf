//! Error types for feature extraction.

use thiserror::Error;

/// Errors reported by feature computations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    /// A parameter or input was malformed or out of range.
    #[error("invalid input '{param}': {reason}")]
    InvalidInput {
        /// Name of the offending parameter.
        param: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The algorithm could not determine a value for this frame.
    #[error("no result from {0}")]
    NoResult(&'static str),

    /// A numeric routine failed for a reason other than bad input.
    #[error("{operation} failed: {reason}")]
    ComputationFailure {
        /// Name of the failing operation.
        operation: &'static str,
        /// Description of the failure.
        reason: String,
    },
}

impl FeatureError {
    /// Create an invalid-input error.
    pub fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        FeatureError::InvalidInput {
            param,
            reason: reason.into(),
        }
    }

    /// Create a computation-failure error.
    pub fn failure(operation: &'static str, reason: impl Into<String>) -> Self {
        FeatureError::ComputationFailure {
            operation,
            reason: reason.into(),
        }
    }

    /// Whether this is a [`FeatureError::NoResult`].
    pub fn is_no_result(&self) -> bool {
        matches!(self, FeatureError::NoResult(_))
    }
}

/// Result type for feature operations.
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Reject fractions outside `[0, 1]` (NaN included).
pub(crate) fn check_fraction(param: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FeatureError::invalid(
            param,
            format!("{value} is outside [0, 1]"),
        ))
    }
}

/// Reject sample rates that are not finite and positive.
pub(crate) fn check_sample_rate(sample_rate: f64) -> Result<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(FeatureError::invalid(
            "sample_rate",
            format!("{sample_rate} must be finite and positive"),
        ))
    }
}
