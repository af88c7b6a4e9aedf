//! Domain checks shared by every parameter set
//!
//! Each helper returns the value unchanged on success so checks can be
//! chained inside `validate` implementations.

use crate::error::{Result, SolverError};

/// Reject NaN and infinities
///
/// Also used on solver outputs: a non-finite output means the arithmetic
/// left the model's domain, which is reported as a degenerate system.
pub fn finite(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::invalid(name, format!("must be finite, got {}", value)))
    }
}

pub fn positive(name: &str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SolverError::invalid(name, format!("must be positive, got {}", value)))
    }
}

pub fn non_negative(name: &str, value: f64) -> Result<f64> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SolverError::invalid(
            name,
            format!("must be non-negative, got {}", value),
        ))
    }
}

/// Closed interval check `lo <= value <= hi`
pub fn in_range(name: &str, value: f64, lo: f64, hi: f64) -> Result<f64> {
    finite(name, value)?;
    if (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(SolverError::invalid(
            name,
            format!("must lie in [{}, {}], got {}", lo, hi, value),
        ))
    }
}

/// Strict upper bound, e.g. marginal cost below the demand intercept
pub fn below(name: &str, value: f64, bound: f64, bound_name: &str) -> Result<f64> {
    finite(name, value)?;
    if value < bound {
        Ok(value)
    } else {
        Err(SolverError::invalid(
            name,
            format!("must be below {} ({}), got {}", bound_name, bound, value),
        ))
    }
}

/// Lower bound on an integer count (firms, bidders, strategies)
pub fn at_least(name: &str, value: usize, min: usize) -> Result<usize> {
    if value >= min {
        Ok(value)
    } else {
        Err(SolverError::invalid(
            name,
            format!("must be at least {}, got {}", min, value),
        ))
    }
}

/// Guard a computed output; NaN or infinity becomes `DegenerateSystem`
pub fn output(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::degenerate(format!(
            "`{}` evaluated to {}",
            name, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_nan() {
        assert!(positive("slope", 1.0).is_ok());
        assert!(positive("slope", 0.0).is_err());
        assert!(positive("slope", f64::NAN).is_err());
    }

    #[test]
    fn below_is_strict() {
        assert!(below("marginal_cost", 99.0, 100.0, "intercept").is_ok());
        let err = below("marginal_cost", 100.0, 100.0, "intercept").unwrap_err();
        assert_eq!(err.kind(), "invalid-parameter");
    }

    #[test]
    fn in_range_is_inclusive() {
        assert!(in_range("fraction", 0.0, 0.0, 1.0).is_ok());
        assert!(in_range("fraction", 1.0, 0.0, 1.0).is_ok());
        assert!(in_range("fraction", 1.0001, 0.0, 1.0).is_err());
    }

    #[test]
    fn at_least_checks_counts() {
        assert_eq!(at_least("num_firms", 2, 1), Ok(2));
        assert!(at_least("num_firms", 0, 1).is_err());
    }

    #[test]
    fn output_converts_nan_to_degenerate() {
        let err = output("price", f64::NAN).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
        assert_eq!(output("price", 3.5), Ok(3.5));
    }
}
