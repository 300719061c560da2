//! Regularised linear least squares

use crate::{MathError, Result};

/// Solve `min ||y - X b||^2 + ridge * ||b||^2` through the normal equations.
///
/// `design` holds one row per observation. No intercept column is added;
/// centre the inputs or append a column of ones when one is needed.
pub fn least_squares(design: &[Vec<f64>], target: &[f64], ridge: f64) -> Result<Vec<f64>> {
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Least squares needs at least one observation".to_string(),
        ));
    }
    if ridge < 0.0 || !ridge.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Ridge penalty must be a non-negative finite number, got {}",
            ridge
        )));
    }

    let k = design[0].len();
    if design.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design rows have inconsistent widths".to_string(),
        ));
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in design.iter().zip(target) {
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        xtx[i][i] += ridge;
    }

    let solution = cholesky_solve(&xtx, &xty)?;
    if solution.iter().any(|b| !b.is_finite()) {
        return Err(MathError::NonFinite(
            "Least squares produced a non-finite coefficient".to_string(),
        ));
    }
    Ok(solution)
}

/// Solve `A x = b` for symmetric positive definite `A`
pub fn cholesky_solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(
            "Matrix must be square and match the right-hand side".to_string(),
        ));
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(MathError::Singular(format!(
                        "Matrix is not positive definite at pivot {}",
                        i
                    )));
                }
                l[i][i] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * z[j];
        }
        z[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}
