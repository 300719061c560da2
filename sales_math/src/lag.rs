//! Lag-polynomial algebra
//!
//! Polynomials in the backshift operator `B` are stored as coefficient
//! vectors where index `i` holds the coefficient of `B^i`.

/// Multiply two lag polynomials
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Differencing operator `(1 - B)^d (1 - B^s)^D`
pub fn differencing(d: usize, seasonal_d: usize, season_length: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }

    if season_length > 0 {
        let mut seasonal = vec![0.0; season_length + 1];
        seasonal[0] = 1.0;
        seasonal[season_length] = -1.0;
        for _ in 0..seasonal_d {
            poly = multiply(&poly, &seasonal);
        }
    }
    poly
}

/// Apply a lag polynomial to a series.
///
/// The output starts at index `poly.len() - 1` of the input, the first
/// position where every lag is observed.
pub fn apply(series: &[f64], poly: &[f64]) -> Vec<f64> {
    let order = poly.len().saturating_sub(1);
    if poly.is_empty() || series.len() <= order {
        return Vec::new();
    }

    (order..series.len())
        .map(|t| {
            poly.iter()
                .enumerate()
                .map(|(j, c)| c * series[t - j])
                .sum()
        })
        .collect()
}

/// Expand `(1 - phi_1 B - ...)(1 - Phi_1 B^s - ...)` into lag coefficients.
///
/// Returns `a` such that the autoregressive part reads
/// `x_t = a[0] x_{t-1} + a[1] x_{t-2} + ...`. Trailing zero lags are kept,
/// so the length is always `p + s * P`.
pub fn autoregressive_lags(phi: &[f64], seasonal_phi: &[f64], season_length: usize) -> Vec<f64> {
    let full = multiply(
        &operator(phi, 1, -1.0),
        &operator(seasonal_phi, season_length, -1.0),
    );
    full.iter().skip(1).map(|c| -c).collect()
}

/// Expand `(1 + theta_1 B + ...)(1 + Theta_1 B^s + ...)` into lag coefficients.
///
/// Returns `m` such that the moving-average part reads
/// `e_t + m[0] e_{t-1} + m[1] e_{t-2} + ...`.
pub fn moving_average_lags(
    theta: &[f64],
    seasonal_theta: &[f64],
    season_length: usize,
) -> Vec<f64> {
    let full = multiply(
        &operator(theta, 1, 1.0),
        &operator(seasonal_theta, season_length, 1.0),
    );
    full.into_iter().skip(1).collect()
}

fn operator(coefficients: &[f64], spacing: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * spacing + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * spacing] = sign * c;
    }
    poly
}
