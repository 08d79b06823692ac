//! Error taxonomy for the projection engine
//!
//! All engine errors are synchronous and immediate. There is no retry logic
//! here: every operation is pure, so retrying with the same inputs would
//! produce the same failure.

use thiserror::Error;

/// Errors raised by the projection engine and its input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A required market field is missing, zero, or negative where
    /// positivity is required. Surfaced to the caller immediately.
    #[error("invalid snapshot: {field} = {value} ({reason})")]
    InvalidSnapshot {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A price is missing from the snapshot entirely
    #[error("invalid snapshot: no price for asset {0:?}")]
    MissingPrice(String),

    /// A computation input (stake, boost, pledge) is negative.
    /// Fails fast, no partial result.
    #[error("domain error: {quantity} must be non-negative, got {value}")]
    Domain { quantity: &'static str, value: f64 },

    /// The APR denominator (staked value) is zero. Callers must handle this
    /// distinctly from a numeric zero; the engine never emits NaN or infinity.
    #[error("APR undefined: staked amount is zero")]
    UndefinedApr,

    /// Reward pool configuration is internally inconsistent
    #[error("invalid pool config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl EngineError {
    /// Helper for non-negativity checks on computation inputs
    pub(crate) fn require_non_negative(
        quantity: &'static str,
        value: f64,
    ) -> Result<f64, EngineError> {
        if value < 0.0 || value.is_nan() {
            Err(EngineError::Domain { quantity, value })
        } else {
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_negative() {
        assert_eq!(EngineError::require_non_negative("stake", 5.0), Ok(5.0));
        assert_eq!(EngineError::require_non_negative("stake", 0.0), Ok(0.0));
        assert!(EngineError::require_non_negative("stake", -1.0).is_err());
        assert!(EngineError::require_non_negative("stake", f64::NAN).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::Domain {
            quantity: "boost",
            value: -2.5,
        };
        assert_eq!(
            err.to_string(),
            "domain error: boost must be non-negative, got -2.5"
        );
    }
}
