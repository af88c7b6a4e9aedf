//! Bounded numeric iterations
//!
//! Entry models and adoption dynamics never loop unboundedly: every routine
//! here stops at `max_iterations` and reports `DegenerateSystem` if the
//! tolerance was not reached.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Convergence controls for `bisect` and `fixed_point`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationOptions {
    /// Absolute tolerance on the change between iterates
    pub tolerance: f64,
    /// Maximum number of iterations before giving up
    pub max_iterations: usize,
}

impl Default for IterationOptions {
    fn default() -> Self {
        IterationOptions {
            tolerance: 1e-10,
            max_iterations: 500,
        }
    }
}

/// Result of a converged fixed-point iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Convergence {
    pub value: f64,
    pub iterations: usize,
    /// Every iterate including the start point
    pub trajectory: Vec<f64>,
}

/// Find a root of `f` in `[lo, hi]` by bisection
///
/// `f(lo)` and `f(hi)` must have opposite signs (or one must be zero).
///
/// # Examples
///
/// ```
/// use econ_core::{bisect, IterationOptions};
///
/// let root = bisect(|x| x * x - 2.0, 0.0, 2.0, &IterationOptions::default()).unwrap();
/// assert!((root - 2f64.sqrt()).abs() < 1e-9);
/// ```
pub fn bisect<F>(f: F, lo: f64, hi: f64, options: &IterationOptions) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if !f_lo.is_finite() || !f_hi.is_finite() {
        return Err(SolverError::degenerate(
            "bisection bracket evaluates to a non-finite value",
        ));
    }
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(SolverError::degenerate(format!(
            "no sign change on [{}, {}]",
            lo, hi
        )));
    }

    for _ in 0..options.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return Err(SolverError::degenerate(format!(
                "bisection evaluated to {} at {}",
                f_mid, mid
            )));
        }
        if f_mid == 0.0 || 0.5 * (hi - lo) < options.tolerance {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(SolverError::degenerate(format!(
        "bisection did not converge within {} iterations",
        options.max_iterations
    )))
}

/// Iterate `x ← map(x)` from `start` until successive iterates agree
///
/// # Examples
///
/// ```
/// use econ_core::{fixed_point, IterationOptions};
///
/// // x = 0.5x + 1 has its fixed point at 2
/// let c = fixed_point(|x| 0.5 * x + 1.0, 0.0, &IterationOptions::default()).unwrap();
/// assert!((c.value - 2.0).abs() < 1e-9);
/// assert_eq!(c.trajectory[0], 0.0);
/// ```
pub fn fixed_point<F>(map: F, start: f64, options: &IterationOptions) -> Result<Convergence>
where
    F: Fn(f64) -> f64,
{
    if !start.is_finite() {
        return Err(SolverError::degenerate("fixed-point start is not finite"));
    }

    let mut trajectory = vec![start];
    let mut current = start;

    for iteration in 1..=options.max_iterations {
        let next = map(current);
        if !next.is_finite() {
            return Err(SolverError::degenerate(format!(
                "fixed-point map evaluated to {} at {}",
                next, current
            )));
        }
        trajectory.push(next);

        if (next - current).abs() < options.tolerance {
            return Ok(Convergence {
                value: next,
                iterations: iteration,
                trajectory,
            });
        }
        current = next;
    }

    Err(SolverError::degenerate(format!(
        "fixed-point iteration did not converge within {} iterations",
        options.max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bisect_finds_decreasing_root() {
        // Profit falling in the number of firms crosses zero at 4
        let root = bisect(|n| 16.0 / (n * n) - 1.0, 1.0, 10.0, &IterationOptions::default())
            .unwrap();
        assert!((root - 4.0).abs() < 1e-8);
    }

    #[test]
    fn bisect_accepts_reversed_bracket() {
        let root = bisect(|x| x - 3.0, 5.0, 0.0, &IterationOptions::default()).unwrap();
        assert!((root - 3.0).abs() < 1e-8);
    }

    #[test]
    fn bisect_without_sign_change_is_degenerate() {
        let err = bisect(|x| x * x + 1.0, -1.0, 1.0, &IterationOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }

    #[test]
    fn bisect_reports_non_convergence() {
        let options = IterationOptions {
            tolerance: 1e-300,
            max_iterations: 3,
        };
        assert!(bisect(|x| x - 0.3, 0.0, 1.0, &options).is_err());
    }

    #[test]
    fn fixed_point_records_trajectory() {
        let c = fixed_point(|x| x / 2.0, 8.0, &IterationOptions::default()).unwrap();
        assert_eq!(&c.trajectory[..4], &[8.0, 4.0, 2.0, 1.0]);
        assert!(c.value.abs() < 1e-9);
        assert_eq!(c.trajectory.len(), c.iterations + 1);
    }

    #[test]
    fn oscillating_map_does_not_converge() {
        let options = IterationOptions {
            tolerance: 1e-10,
            max_iterations: 50,
        };
        let err = fixed_point(|x| 1.0 - x, 0.0, &options).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }
}
