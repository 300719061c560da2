//! Grid search over SARIMAX structures
//!
//! Each grid point is fitted independently; failures are logged and
//! skipped. The reduction keeps the lowest AIC and, on ties, the point that
//! comes first in grid order, so parallel and sequential searches pick the
//! same model.

use crate::config::GridConfig;
use crate::data::{MonthlySeries, Period};
use crate::error::{ForecastError, Result};
use crate::features::{build_features, CalendarEncoding, FeatureRow, RegressorMatrix, Standardizer};
use crate::models::sarimax::{self, SarimaxFit, SarimaxSpec};
use crate::models::{TargetTransform, TrainedModel};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use sales_math::optimize::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Version of the serialized [`SelectedModel`] layout
pub const FORMAT_VERSION: u32 = 2;

/// The winning model of a grid search, with everything needed to rebuild
/// its regressors at serving time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedModel {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    /// Last month of the training range
    pub training_end: Period,
    pub transform: TargetTransform,
    pub encoding: CalendarEncoding,
    /// Regressor columns the model was fitted on
    pub columns: Vec<String>,
    pub scaler: Standardizer,
    pub fit: SarimaxFit,
}

impl SelectedModel {
    pub fn spec(&self) -> SarimaxSpec {
        self.fit.spec
    }

    pub fn aic(&self) -> f64 {
        self.fit.aic
    }

    /// Standardized regressor rows, checked against the trained columns
    fn design(&self, features: &[FeatureRow]) -> Result<Vec<Vec<f64>>> {
        let matrix = RegressorMatrix::from_rows(features, self.encoding);
        if matrix.columns != self.columns {
            return Err(ForecastError::FeatureMismatch {
                expected: self.columns.clone(),
                got: matrix.columns,
            });
        }
        self.scaler.transform_all(&matrix.rows)
    }
}

impl TrainedModel for SelectedModel {
    fn name(&self) -> String {
        self.fit.spec.to_string()
    }

    fn fitted_values(
        &self,
        series: &MonthlySeries,
        features: &[FeatureRow],
    ) -> Result<Vec<Option<f64>>> {
        let y = self.transform.apply_all(&series.totals());
        let exog = self.design(features)?;
        let fitted = self.fit.in_sample(&y, &exog)?;
        Ok(fitted
            .into_iter()
            .map(|value| value.map(|v| self.transform.invert(v)))
            .collect())
    }

    /// Re-filters `history` with the fitted coefficients, so the ARMA and
    /// differencing state is the one just before `row.period`
    fn forecast_row(&self, history: &MonthlySeries, row: &FeatureRow) -> Result<f64> {
        let last = history.last_period().ok_or_else(|| {
            ForecastError::InsufficientData("no history to forecast from".to_string())
        })?;
        let steps = usize::try_from(last.months_until(&row.period))
            .ok()
            .filter(|&steps| steps > 0)
            .ok_or_else(|| {
                ForecastError::InvalidPeriod(format!(
                    "{} does not follow the history ending {}",
                    row.period, last
                ))
            })?;

        let y = self.transform.apply_all(&history.totals());
        let exog = self.design(&build_features(history))?;
        let state = self.fit.state_for(&y, &exog)?;

        let target = self.design(std::slice::from_ref(row))?;
        let value = self.fit.forecast_from(&state, steps, &target[0])?;
        Ok(self.transform.invert(value))
    }
}

/// Result of reducing a grid of candidate fits
#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    pub best: T,
    /// Position of `best` in the grid
    pub best_index: usize,
    pub score: f64,
    pub attempted: usize,
    pub converged: usize,
}

/// Fit every grid point with `fit` and keep the lowest score.
///
/// `fit` returns the candidate and its score. Errors and non-finite scores
/// drop the point; if nothing survives the search fails with
/// [`ForecastError::NoConvergingModel`].
pub fn grid_search<C, T, F>(grid: &[C], parallel: bool, fit: F) -> Result<SearchOutcome<T>>
where
    C: Display + Sync,
    T: Send,
    F: Fn(&C) -> Result<(T, f64)> + Sync,
{
    if grid.is_empty() {
        return Err(ForecastError::Config("the search grid is empty".to_string()));
    }

    let results: Vec<Result<(T, f64)>> = if parallel {
        grid.par_iter().map(&fit).collect()
    } else {
        grid.iter().map(&fit).collect()
    };

    let attempted = results.len();
    let mut converged = 0;
    let best = results
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, T, f64)>, (i, result)| match result {
            Ok((candidate, score)) if score.is_finite() => {
                converged += 1;
                debug!(candidate = %grid[i], score, "grid point fitted");
                match best {
                    Some((_, _, best_score)) if best_score <= score => best,
                    _ => Some((i, candidate, score)),
                }
            }
            Ok((_, score)) => {
                warn!(candidate = %grid[i], score, "grid point skipped: non-finite score");
                best
            }
            Err(err) => {
                warn!(candidate = %grid[i], error = %err, "grid point skipped");
                best
            }
        });

    match best {
        Some((best_index, best, score)) => Ok(SearchOutcome {
            best,
            best_index,
            score,
            attempted,
            converged,
        }),
        None => Err(ForecastError::NoConvergingModel { attempted }),
    }
}

/// Chooses a SARIMAX structure by minimum AIC
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSelector {
    pub transform: TargetTransform,
    pub encoding: CalendarEncoding,
    pub parallel: bool,
    pub optimizer: NelderMeadConfig,
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self {
            transform: TargetTransform::Log1p,
            encoding: CalendarEncoding::Raw,
            parallel: true,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl ModelSelector {
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            transform: config.transform(),
            encoding: config.calendar_encoding,
            parallel: config.parallel,
            optimizer: config.optimizer,
        }
    }

    /// Select the minimum-AIC model over `grid`
    pub fn select(
        &self,
        series: &MonthlySeries,
        features: &[FeatureRow],
        grid: &[SarimaxSpec],
    ) -> Result<SelectedModel> {
        self.search(series, features, grid).map(|outcome| outcome.best)
    }

    /// Like [`ModelSelector::select`], also reporting how many points fitted
    pub fn search(
        &self,
        series: &MonthlySeries,
        features: &[FeatureRow],
        grid: &[SarimaxSpec],
    ) -> Result<SearchOutcome<SelectedModel>> {
        let training_end = series.last_period().ok_or_else(|| {
            ForecastError::InsufficientData("cannot select a model for an empty series".to_string())
        })?;
        if series.len() != features.len() {
            return Err(ForecastError::InsufficientData(format!(
                "{} months but {} feature rows",
                series.len(),
                features.len()
            )));
        }

        let y = self.transform.apply_all(&series.totals());
        let matrix = RegressorMatrix::from_rows(features, self.encoding);
        let scaler = Standardizer::fit(&matrix.rows)?;
        let exog = scaler.transform_all(&matrix.rows)?;

        let fits = grid_search(grid, self.parallel, |spec| {
            let fit = sarimax::fit(spec, &y, &exog, &self.optimizer)?;
            let aic = fit.aic;
            Ok((fit, aic))
        })?;

        let outcome = SearchOutcome {
            best: SelectedModel {
                format_version: FORMAT_VERSION,
                trained_at: Utc::now(),
                training_end,
                transform: self.transform,
                encoding: self.encoding,
                columns: matrix.columns,
                scaler,
                fit: fits.best,
            },
            best_index: fits.best_index,
            score: fits.score,
            attempted: fits.attempted,
            converged: fits.converged,
        };

        info!(
            model = %outcome.best.spec(),
            aic = outcome.score,
            attempted = outcome.attempted,
            converged = outcome.converged,
            "selected model"
        );
        Ok(outcome)
    }
}
