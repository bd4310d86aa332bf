//! Range and format checks for configuration values.
//!
//! Checks run at the boundary, before any value reaches the feature
//! extractors. [`Violations`] gathers every failure so a bad file reports
//! all of its problems at once.
//!
//! # Example
//!
//! ```rust
//! use timbre_config::validation::{Violations, check_range};
//!
//! let mut violations = Violations::new();
//! violations.check(check_range("rolloff_percent", 85.0, 0.0, 100.0));
//! violations.check(check_range("peak_threshold_percent", 140.0, 0.0, 100.0));
//! assert_eq!(violations.len(), 1);
//! assert!(violations.finish().is_err());
//! ```

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the parameter.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Invalid parameter format.
    #[error("invalid format for parameter '{param}': {reason}")]
    InvalidFormat {
        /// Name of the parameter.
        param: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check that `value` lies in `[min, max]`. NaN is always out of range.
pub fn check_range(param: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Check that `value` is finite and strictly positive.
pub fn check_positive(param: &str, value: f64) -> ValidationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            param: param.to_string(),
            reason: format!("{value} must be positive and finite"),
        })
    }
}

/// Accumulates validation failures.
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<ValidationError>,
}

impl Violations {
    /// Empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error of a failed check.
    pub fn check(&mut self, result: ValidationResult<()>) {
        if let Err(e) = result {
            self.push(e);
        }
    }

    /// Record an error, flattening nested [`ValidationError::Multiple`].
    pub fn push(&mut self, error: ValidationError) {
        match error {
            ValidationError::Multiple(inner) => self.errors.extend(inner),
            other => self.errors.push(other),
        }
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok` when empty, the single error when there is one, `Multiple` otherwise.
    pub fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}
