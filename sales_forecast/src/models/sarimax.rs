//! Seasonal ARIMA with exogenous regressors
//!
//! The model is a regression with seasonal ARIMA errors:
//!
//! ```text
//! y_t = c + beta' x_t + u_t
//! phi(B) Phi(B^s) (1 - B)^d (1 - B^s)^D u_t = theta(B) Theta(B^s) e_t
//! ```
//!
//! Estimation is two-stage. `beta` comes from least squares on the
//! differenced series, then the ARMA coefficients minimise the conditional
//! sum of squares of the differenced regression errors. The intercept `c`
//! is only estimated when no differencing is applied.

use crate::error::{ForecastError, Result};
use sales_math::lag;
use sales_math::optimize::{nelder_mead, NelderMeadConfig};
use sales_math::regression::least_squares;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Lower bound on the innovation variance used in the likelihood
pub const MIN_VARIANCE: f64 = 1e-10;

const REGRESSION_RIDGE: f64 = 1e-8;
const COEFFICIENT_BOUND: f64 = 0.99;
const INITIAL_COEFFICIENT: f64 = 0.1;

/// Structural parameters `(p, d, q)(P, D, Q, s)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaxSpec {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub season_length: usize,
}

impl SarimaxSpec {
    pub fn new(order: (usize, usize, usize), seasonal_order: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal_order.0,
            seasonal_d: seasonal_order.1,
            seasonal_q: seasonal_order.2,
            season_length: seasonal_order.3,
        }
    }

    pub fn order(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    pub fn seasonal_order(&self) -> (usize, usize, usize, usize) {
        (
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.season_length,
        )
    }

    /// Number of ARMA coefficients
    pub fn n_arma(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }

    /// Number of observations consumed by differencing
    pub fn differencing_order(&self) -> usize {
        self.d + self.seasonal_d * self.season_length
    }

    /// Length of the expanded autoregressive lag polynomial
    pub fn ar_lags(&self) -> usize {
        self.p + self.seasonal_p * self.season_length
    }

    /// Length of the expanded moving-average lag polynomial
    pub fn ma_lags(&self) -> usize {
        self.q + self.seasonal_q * self.season_length
    }

    pub fn has_intercept(&self) -> bool {
        self.differencing_order() == 0
    }

    fn validate(&self) -> Result<()> {
        let seasonal = self.seasonal_p + self.seasonal_d + self.seasonal_q > 0;
        if seasonal && self.season_length < 2 {
            return Err(ForecastError::Fit(format!(
                "{} has seasonal terms but season length {}",
                self, self.season_length
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SarimaxSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SARIMAX({},{},{})({},{},{},{})",
            self.p,
            self.d,
            self.q,
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.season_length
        )
    }
}

/// Estimated coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxCoefficients {
    pub intercept: f64,
    pub beta: Vec<f64>,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
}

impl SarimaxCoefficients {
    fn lags(&self, spec: &SarimaxSpec) -> (Vec<f64>, Vec<f64>) {
        (
            lag::autoregressive_lags(&self.ar, &self.seasonal_ar, spec.season_length),
            lag::moving_average_lags(&self.ma, &self.seasonal_ma, spec.season_length),
        )
    }
}

/// The tail of the filtered series needed for the next forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxState {
    /// Last regression errors `u`, oldest first, one per differencing lag
    pub levels: Vec<f64>,
    /// Last differenced errors `w`, one per autoregressive lag
    pub differenced: Vec<f64>,
    /// Last innovations `e`, one per moving-average lag
    pub innovations: Vec<f64>,
}

/// A fitted SARIMAX model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarimaxFit {
    pub spec: SarimaxSpec,
    pub coefficients: SarimaxCoefficients,
    /// Innovation variance
    pub sigma2: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Observations contributing to the likelihood
    pub n_effective: usize,
    pub state: SarimaxState,
}

/// Fit `spec` to `y` with one regressor row per observation.
pub fn fit(
    spec: &SarimaxSpec,
    y: &[f64],
    exog: &[Vec<f64>],
    optimizer: &NelderMeadConfig,
) -> Result<SarimaxFit> {
    spec.validate()?;
    if y.len() != exog.len() {
        return Err(ForecastError::Fit(format!(
            "{} observations but {} regressor rows",
            y.len(),
            exog.len()
        )));
    }
    if y.iter().any(|v| !v.is_finite()) || exog.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ForecastError::Fit("inputs contain non-finite values".to_string()));
    }

    let k = exog.first().map_or(0, |r| r.len());
    let delta = lag::differencing(spec.d, spec.seasonal_d, spec.season_length);
    let diff_order = spec.differencing_order();
    let ar_lags = spec.ar_lags();
    let n_params = k + usize::from(spec.has_intercept()) + spec.n_arma();

    let n_effective = y.len().saturating_sub(diff_order + ar_lags);
    if n_effective <= n_params {
        return Err(ForecastError::Fit(format!(
            "{} needs more than {} usable observations, got {}",
            spec, n_params, n_effective
        )));
    }

    let (intercept, beta) = regression(spec, y, exog, &delta)?;

    let u = regression_errors(y, exog, intercept, &beta);
    let w = lag::apply(&u, &delta);

    let css = |params: &[f64]| -> f64 {
        let coefficients = split_arma(spec, params, intercept, &beta);
        let (ar, ma) = coefficients.lags(spec);
        let e = innovations(&w, &ar, &ma);
        let sum: f64 = e[ar_lags..].iter().map(|x| x * x).sum();
        if sum.is_finite() {
            sum
        } else {
            f64::MAX
        }
    };

    let n_arma = spec.n_arma();
    let params = if n_arma == 0 {
        Vec::new()
    } else {
        let initial = vec![INITIAL_COEFFICIENT; n_arma];
        let bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); n_arma];
        let minimum = nelder_mead(css, &initial, Some(&bounds), optimizer);
        if !minimum.converged {
            return Err(ForecastError::Fit(format!(
                "{} did not converge after {} iterations",
                spec, minimum.iterations
            )));
        }
        minimum.point
    };

    let coefficients = split_arma(spec, &params, intercept, &beta);
    let (ar, ma) = coefficients.lags(spec);
    let e = innovations(&w, &ar, &ma);
    let sum_squares: f64 = e[ar_lags..].iter().map(|x| x * x).sum();
    if !sum_squares.is_finite() {
        return Err(ForecastError::Fit(format!(
            "{} produced a non-finite sum of squares",
            spec
        )));
    }

    let n = n_effective as f64;
    let sigma2 = (sum_squares / n).max(MIN_VARIANCE);
    let log_likelihood = -0.5 * n * (1.0 + (2.0 * PI * sigma2).ln());
    let aic = -2.0 * log_likelihood + 2.0 * (n_params + 1) as f64;
    if !aic.is_finite() {
        return Err(ForecastError::Fit(format!("{} produced a non-finite AIC", spec)));
    }

    let state = SarimaxState {
        levels: tail(&u, diff_order),
        differenced: tail(&w, ar_lags),
        innovations: tail(&e, spec.ma_lags()),
    };

    Ok(SarimaxFit {
        spec: *spec,
        coefficients,
        sigma2,
        aic,
        n_effective,
        state,
    })
}

impl SarimaxFit {
    /// One-step-ahead fitted values over the training range.
    ///
    /// Undifferenced models predict every period, falling back to the
    /// regression alone before the autoregressive lags are available. A
    /// differenced model has no prediction for the periods consumed by
    /// differencing and the first autoregressive lags, which are `None`.
    pub fn in_sample(&self, y: &[f64], exog: &[Vec<f64>]) -> Result<Vec<Option<f64>>> {
        let filtered = self.filter(y, exog)?;
        let diff_order = self.spec.differencing_order();
        let burn_in = diff_order + self.spec.ar_lags();

        Ok((0..y.len())
            .map(|t| {
                if t >= burn_in {
                    Some(y[t] - filtered.innovations[t - diff_order])
                } else if diff_order == 0 {
                    Some(y[t] - filtered.errors[t])
                } else {
                    None
                }
            })
            .collect())
    }

    /// Filter state after observing `y` and `exog`, for forecasting the
    /// periods that follow them
    pub fn state_for(&self, y: &[f64], exog: &[Vec<f64>]) -> Result<SarimaxState> {
        let filtered = self.filter(y, exog)?;
        Ok(SarimaxState {
            levels: tail(&filtered.errors, self.spec.differencing_order()),
            differenced: tail(&filtered.differenced, self.spec.ar_lags()),
            innovations: tail(&filtered.innovations, self.spec.ma_lags()),
        })
    }

    /// Forecast the observation following the training range
    pub fn forecast_next(&self, exog_row: &[f64]) -> Result<f64> {
        self.forecast_from(&self.state, 1, exog_row)
    }

    /// Forecast the observation `steps` periods after `state`.
    ///
    /// Innovations after the state are taken as zero, so the error process
    /// is propagated by its own recursion until the target period.
    pub fn forecast_from(&self, state: &SarimaxState, steps: usize, exog_row: &[f64]) -> Result<f64> {
        self.check_width(exog_row.len())?;
        if steps == 0 {
            return Err(ForecastError::Fit(
                "forecast horizon must be at least one period".to_string(),
            ));
        }

        let c = &self.coefficients;
        let (ar, ma) = c.lags(&self.spec);
        let delta = lag::differencing(
            self.spec.d,
            self.spec.seasonal_d,
            self.spec.season_length,
        );

        let mut state = state.clone();
        let mut error = 0.0;
        for _ in 0..steps {
            error = advance(&mut state, &ar, &ma, &delta);
        }

        let value = c.intercept + dot(&c.beta, exog_row) + error;
        if !value.is_finite() {
            return Err(ForecastError::Fit(format!(
                "{} produced a non-finite forecast",
                self.spec
            )));
        }
        Ok(value)
    }

    fn filter(&self, y: &[f64], exog: &[Vec<f64>]) -> Result<Filtered> {
        if y.len() != exog.len() {
            return Err(ForecastError::Fit(format!(
                "{} observations but {} regressor rows",
                y.len(),
                exog.len()
            )));
        }
        if let Some(row) = exog.iter().find(|r| r.len() != self.coefficients.beta.len()) {
            self.check_width(row.len())?;
        }

        let c = &self.coefficients;
        let delta = lag::differencing(
            self.spec.d,
            self.spec.seasonal_d,
            self.spec.season_length,
        );
        let errors = regression_errors(y, exog, c.intercept, &c.beta);
        let differenced = lag::apply(&errors, &delta);
        let (ar, ma) = c.lags(&self.spec);
        let innovations = innovations(&differenced, &ar, &ma);
        Ok(Filtered {
            errors,
            differenced,
            innovations,
        })
    }

    fn check_width(&self, width: usize) -> Result<()> {
        if width != self.coefficients.beta.len() {
            return Err(ForecastError::Fit(format!(
                "model expects {} regressors, got {}",
                self.coefficients.beta.len(),
                width
            )));
        }
        Ok(())
    }
}

/// Regression errors `u`, differenced errors `w` and innovations `e`
struct Filtered {
    errors: Vec<f64>,
    differenced: Vec<f64>,
    innovations: Vec<f64>,
}

/// Step `state` one period ahead with a zero innovation and return the
/// predicted regression error
fn advance(state: &mut SarimaxState, ar: &[f64], ma: &[f64], delta: &[f64]) -> f64 {
    let w: f64 = ar
        .iter()
        .zip(state.differenced.iter().rev())
        .map(|(a, w)| a * w)
        .chain(
            ma.iter()
                .zip(state.innovations.iter().rev())
                .map(|(m, e)| m * e),
        )
        .sum();

    // Undo the differencing: u_t = w_t - sum_j delta_j u_{t-j}
    let integrated: f64 = delta
        .iter()
        .skip(1)
        .zip(state.levels.iter().rev())
        .map(|(d, u)| d * u)
        .sum();
    let u = w - integrated;

    shift(&mut state.levels, u);
    shift(&mut state.differenced, w);
    shift(&mut state.innovations, 0.0);
    u
}

/// Drop the oldest value and append `value`, keeping the length
fn shift(values: &mut Vec<f64>, value: f64) {
    if !values.is_empty() {
        values.remove(0);
        values.push(value);
    }
}

/// Least squares of the differenced target on the differenced regressors
fn regression(
    spec: &SarimaxSpec,
    y: &[f64],
    exog: &[Vec<f64>],
    delta: &[f64],
) -> Result<(f64, Vec<f64>)> {
    let k = exog.first().map_or(0, |r| r.len());
    let target = lag::apply(y, delta);
    let columns: Vec<Vec<f64>> = (0..k)
        .map(|j| lag::apply(&exog.iter().map(|r| r[j]).collect::<Vec<_>>(), delta))
        .collect();

    if k == 0 {
        let intercept = if spec.has_intercept() {
            sales_math::mean(&target).unwrap_or(0.0)
        } else {
            0.0
        };
        return Ok((intercept, Vec::new()));
    }

    if spec.has_intercept() {
        let y_mean = sales_math::mean(&target).unwrap_or(0.0);
        let x_means: Vec<f64> = columns
            .iter()
            .map(|c| sales_math::mean(c).unwrap_or(0.0))
            .collect();
        let design: Vec<Vec<f64>> = (0..target.len())
            .map(|t| (0..k).map(|j| columns[j][t] - x_means[j]).collect())
            .collect();
        let centred: Vec<f64> = target.iter().map(|v| v - y_mean).collect();
        let beta = least_squares(&design, &centred, REGRESSION_RIDGE)?;
        let intercept = y_mean - dot(&beta, &x_means);
        Ok((intercept, beta))
    } else {
        let design: Vec<Vec<f64>> = (0..target.len())
            .map(|t| (0..k).map(|j| columns[j][t]).collect())
            .collect();
        let beta = least_squares(&design, &target, REGRESSION_RIDGE)?;
        Ok((0.0, beta))
    }
}

fn split_arma(spec: &SarimaxSpec, params: &[f64], intercept: f64, beta: &[f64]) -> SarimaxCoefficients {
    let (ar, rest) = params.split_at(spec.p);
    let (ma, rest) = rest.split_at(spec.q);
    let (seasonal_ar, seasonal_ma) = rest.split_at(spec.seasonal_p);
    SarimaxCoefficients {
        intercept,
        beta: beta.to_vec(),
        ar: ar.to_vec(),
        ma: ma.to_vec(),
        seasonal_ar: seasonal_ar.to_vec(),
        seasonal_ma: seasonal_ma.to_vec(),
    }
}

fn regression_errors(y: &[f64], exog: &[Vec<f64>], intercept: f64, beta: &[f64]) -> Vec<f64> {
    y.iter()
        .zip(exog)
        .map(|(v, x)| v - intercept - dot(beta, x))
        .collect()
}

/// Conditional innovations of an ARMA process.
///
/// The first `ar.len()` values are left at zero, as are moving-average
/// terms reaching before the start of the series.
fn innovations(w: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let start = ar.len();
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut prediction = 0.0;
        for (i, a) in ar.iter().enumerate() {
            prediction += a * w[t - 1 - i];
        }
        for (j, m) in ma.iter().enumerate() {
            if let Some(lagged) = t.checked_sub(j + 1) {
                prediction += m * e[lagged];
            }
        }
        e[t] = w[t] - prediction;
    }
    e
}

/// Last `n` values, left-padded with zeros when the slice is shorter
fn tail(values: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n.saturating_sub(values.len())];
    out.extend_from_slice(&values[values.len().saturating_sub(n)..]);
    out
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn no_exog(n: usize) -> Vec<Vec<f64>> {
        vec![Vec::new(); n]
    }

    #[test]
    fn test_spec_display_and_counts() {
        let spec = SarimaxSpec::new((1, 1, 1), (1, 0, 1, 12));
        assert_eq!(spec.to_string(), "SARIMAX(1,1,1)(1,0,1,12)");
        assert_eq!(spec.n_arma(), 4);
        assert_eq!(spec.ar_lags(), 13);
        assert_eq!(spec.differencing_order(), 1);
        assert!(!spec.has_intercept());
    }

    #[test]
    fn test_tail_pads() {
        assert_eq!(tail(&[1.0, 2.0, 3.0], 2), vec![2.0, 3.0]);
        assert_eq!(tail(&[1.0], 3), vec![0.0, 0.0, 1.0]);
        assert!(tail(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_mean_only_model() {
        let y = vec![4.0, 6.0, 4.0, 6.0, 4.0, 6.0];
        let spec = SarimaxSpec::new((0, 0, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(6), &NelderMeadConfig::default()).unwrap();

        assert_abs_diff_eq!(fit.coefficients.intercept, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.sigma2, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.forecast_next(&[]).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_random_walk_forecasts_last_value() {
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0, 9.0];
        let spec = SarimaxSpec::new((0, 1, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();

        assert_eq!(fit.state.levels, vec![9.0]);
        assert_abs_diff_eq!(fit.forecast_next(&[]).unwrap(), 9.0, epsilon = 1e-12);

        let fitted = fit.in_sample(&y, &no_exog(y.len())).unwrap();
        assert_eq!(fitted[0], None);
        assert_abs_diff_eq!(fitted[3].unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_state_for_matches_training_state() {
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0, 9.0];
        let spec = SarimaxSpec::new((1, 1, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();

        assert_eq!(fit.state_for(&y, &no_exog(y.len())).unwrap(), fit.state);
    }

    #[test]
    fn test_forecast_from_earlier_history() {
        let y = vec![1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0, 9.0];
        let spec = SarimaxSpec::new((0, 1, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();

        let state = fit.state_for(&y[..4], &no_exog(4)).unwrap();
        assert_eq!(state.levels, vec![5.0]);
        assert_abs_diff_eq!(fit.forecast_from(&state, 1, &[]).unwrap(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.forecast_from(&state, 3, &[]).unwrap(), 5.0, epsilon = 1e-12);
        assert!(fit.forecast_from(&state, 0, &[]).is_err());
    }

    #[test]
    fn test_autoregressive_forecast_decays_over_horizon() {
        let y = vec![4.0, 9.0, 3.0, 8.0, 5.0, 7.0, 2.0, 9.0, 4.0, 6.0, 3.0, 8.0];
        let spec = SarimaxSpec::new((1, 0, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();

        let c = fit.coefficients.intercept;
        let phi = fit.coefficients.ar[0];
        let last = y[y.len() - 1] - c;
        let state = fit.state_for(&y, &no_exog(y.len())).unwrap();
        assert_abs_diff_eq!(fit.forecast_from(&state, 1, &[]).unwrap(), c + phi * last, epsilon = 1e-12);
        assert_abs_diff_eq!(
            fit.forecast_from(&state, 3, &[]).unwrap(),
            c + phi.powi(3) * last,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_seasonal_differencing_burn_in_has_no_fitted_value() {
        let y: Vec<f64> = (0..36)
            .map(|t| 100.0 + 30.0 * ((t % 12) as f64) + 7.0 * ((t * 5 % 11) as f64))
            .collect();
        let spec = SarimaxSpec::new((1, 0, 0), (1, 1, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();
        let fitted = fit.in_sample(&y, &no_exog(y.len())).unwrap();

        let burn_in = spec.differencing_order() + spec.ar_lags();
        assert_eq!(burn_in, 25);
        assert!(fitted[..burn_in].iter().all(Option::is_none));
        for (t, value) in fitted.iter().enumerate().skip(burn_in) {
            let value = value.unwrap();
            assert!(value != y[t], "period {} fitted exactly", t);
        }
    }

    #[test]
    fn test_autoregressive_coefficient_is_recovered() {
        // x_t = 0.6 x_{t-1} + e_t with uniform innovations from a fixed LCG
        let mut seed: u64 = 42;
        let mut shock = move || {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) as f64 / (1u64 << 31) as f64 - 0.5
        };
        let mut y = vec![0.0];
        for i in 1..400 {
            let prev = y[i - 1];
            y.push(0.6 * prev + shock());
        }
        let spec = SarimaxSpec::new((1, 0, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &no_exog(y.len()), &NelderMeadConfig::default()).unwrap();

        assert!((fit.coefficients.ar[0] - 0.6).abs() < 0.15);
        assert!(fit.aic.is_finite());
    }

    #[test]
    fn test_exogenous_effect() {
        let x: Vec<Vec<f64>> = (0..20).map(|t| vec![(t % 4) as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 10.0 + 2.0 * r[0]).collect();
        let spec = SarimaxSpec::new((0, 0, 0), (0, 0, 0, 12));
        let fit = fit(&spec, &y, &x, &NelderMeadConfig::default()).unwrap();

        assert_abs_diff_eq!(fit.coefficients.beta[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fit.forecast_next(&[3.0]).unwrap(), 16.0, epsilon = 1e-5);
        assert!(fit.forecast_next(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_too_short_for_seasonal_terms() {
        let y = vec![1.0; 12];
        let spec = SarimaxSpec::new((0, 0, 0), (1, 0, 0, 12));
        assert!(matches!(
            fit(&spec, &y, &no_exog(12), &NelderMeadConfig::default()),
            Err(ForecastError::Fit(_))
        ));
    }
}
