use crate::error::{Result, SolverError};

/// Pivots smaller than this (relative to the largest matrix entry) are
/// treated as zero
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Solve `matrix · x = rhs` by Gaussian elimination with partial pivoting
///
/// Used for simultaneous best-response systems (Bertrand, Hotelling,
/// vertical differentiation, two-sided platforms). A singular or
/// near-singular matrix has no unique equilibrium and is reported as
/// `DegenerateSystem`.
///
/// # Examples
///
/// ```
/// use econ_core::solve_linear;
///
/// // 2x - y = 1, -x + 2y = 1  =>  x = y = 1
/// let x = solve_linear(&[vec![2.0, -1.0], vec![-1.0, 2.0]], &[1.0, 1.0]).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 1.0).abs() < 1e-12);
/// ```
pub fn solve_linear(matrix: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
    let n = rhs.len();
    if n == 0 || matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(SolverError::degenerate(format!(
            "linear system must be square and match the right-hand side ({} equations)",
            n
        )));
    }

    // Augmented matrix [A | b]
    let mut a: Vec<Vec<f64>> = matrix
        .iter()
        .zip(rhs.iter())
        .map(|(row, &b)| {
            let mut r = row.clone();
            r.push(b);
            r
        })
        .collect();

    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale == 0.0 {
        return Err(SolverError::degenerate("linear system matrix is zero or non-finite"));
    }

    for col in 0..n {
        // Partial pivoting: bring the largest remaining entry to the diagonal
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() < SINGULAR_TOLERANCE * scale {
            return Err(SolverError::degenerate(format!(
                "singular best-response system (pivot {} vanishes)",
                col
            )));
        }
        a.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (a[row][n] - tail) / a[row][row];
        if !x[row].is_finite() {
            return Err(SolverError::degenerate("linear system solution is not finite"));
        }
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn solves_three_by_three() {
        let m = vec![
            vec![2.0, 1.0, -1.0],
            vec![-3.0, -1.0, 2.0],
            vec![-2.0, 1.0, 2.0],
        ];
        let x = solve_linear(&m, &[8.0, -11.0, -3.0]).unwrap();
        assert_abs_diff_eq!(x[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[2], -1.0, epsilon = 1e-10);
    }

    #[test]
    fn needs_pivoting() {
        // Zero on the first diagonal entry
        let m = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let x = solve_linear(&m, &[3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(x[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_is_degenerate() {
        let m = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let err = solve_linear(&m, &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), "degenerate-system");
    }

    #[test]
    fn zero_matrix_is_degenerate() {
        let m = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
        assert!(solve_linear(&m, &[1.0, 1.0]).is_err());
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let m = vec![vec![1.0, 0.0]];
        assert!(solve_linear(&m, &[1.0, 1.0]).is_err());
        assert!(solve_linear(&[], &[]).is_err());
    }
}
