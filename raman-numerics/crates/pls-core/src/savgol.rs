//! Savitzky-Golay smoothing.
//!
//! Interior samples are a convolution with least-squares coefficients for
//! the window centre. The first and last `window_length / 2` samples come
//! from a polynomial fitted to the first and last full window, evaluated
//! at those positions.

use crate::error::SolveError;

/// Smooth `y` with a `window_length`-point, order-`poly_order` filter.
///
/// `window_length` must be odd, greater than `poly_order`, and no longer
/// than the series.
pub fn savitzky_golay(
    y: &[f64],
    window_length: usize,
    poly_order: usize,
) -> Result<Vec<f64>, SolveError> {
    validate(y.len(), window_length, poly_order)?;

    let n = y.len();
    let half = window_length / 2;
    let positions = window_positions(window_length);

    let centre = centre_coefficients(&positions, poly_order)?;
    let mut out = vec![0.0; n];
    for i in half..n - half {
        out[i] = centre
            .iter()
            .zip(&y[i - half..=i + half])
            .map(|(c, v)| c * v)
            .sum();
    }

    let head = fit_polynomial(&positions, &y[..window_length], poly_order)?;
    for (i, slot) in out.iter_mut().enumerate().take(half) {
        *slot = evaluate(&head, positions[i]);
    }
    let tail = fit_polynomial(&positions, &y[n - window_length..], poly_order)?;
    for i in n - half..n {
        out[i] = evaluate(&tail, positions[i + window_length - n]);
    }

    Ok(out)
}

fn validate(len: usize, window_length: usize, poly_order: usize) -> Result<(), SolveError> {
    if window_length % 2 == 0 {
        return Err(SolveError::invalid(
            "window_length",
            format!("must be odd, got {}", window_length),
        ));
    }
    if poly_order >= window_length {
        return Err(SolveError::invalid(
            "poly_order",
            format!(
                "must be less than window_length ({}), got {}",
                window_length, poly_order
            ),
        ));
    }
    if window_length > len {
        return Err(SolveError::invalid(
            "window_length",
            format!("{} exceeds the series length {}", window_length, len),
        ));
    }
    Ok(())
}

/// Window offsets `-h..=h` scaled into `[-1, 1]` to keep the normal
/// equations well conditioned.
fn window_positions(window_length: usize) -> Vec<f64> {
    let half = (window_length / 2) as i64;
    let scale = half.max(1) as f64;
    (-half..=half).map(|t| t as f64 / scale).collect()
}

/// Weights that give the fitted value at the window centre.
///
/// Row 0 of `(AᵀA)⁻¹Aᵀ`, with `A[j][k] = t_j^k`.
fn centre_coefficients(positions: &[f64], order: usize) -> Result<Vec<f64>, SolveError> {
    let mut e0 = vec![0.0; order + 1];
    e0[0] = 1.0;
    let g = solve_dense(normal_matrix(positions, order), e0)?;
    Ok(positions.iter().map(|&t| evaluate(&g, t)).collect())
}

/// Least-squares polynomial coefficients (constant term first).
fn fit_polynomial(positions: &[f64], values: &[f64], order: usize) -> Result<Vec<f64>, SolveError> {
    let rhs: Vec<f64> = (0..=order)
        .map(|k| {
            positions
                .iter()
                .zip(values)
                .map(|(t, v)| t.powi(k as i32) * v)
                .sum()
        })
        .collect();
    solve_dense(normal_matrix(positions, order), rhs)
}

fn normal_matrix(positions: &[f64], order: usize) -> Vec<Vec<f64>> {
    (0..=order)
        .map(|r| {
            (0..=order)
                .map(|c| positions.iter().map(|t| t.powi((r + c) as i32)).sum())
                .collect()
        })
        .collect()
}

fn evaluate(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

/// Gaussian elimination with partial pivoting.
fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, SolveError> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        let pivot = a[pivot_row][col];
        if pivot.abs() < f64::EPSILON || !pivot.is_finite() {
            return Err(SolveError::ZeroPivot { row: col, pivot });
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let s: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - s) / a[row][row];
    }
    Ok(x)
}
