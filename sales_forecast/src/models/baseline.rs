//! Regression baselines reported next to the selected SARIMAX model

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::features::{CalendarEncoding, FeatureRow, RegressorMatrix, Standardizer};
use crate::metrics::{evaluate, MetricsRecord};
use crate::models::{TargetTransform, TrainedModel};
use sales_math::regression::least_squares;
use serde::Serialize;
use tracing::{debug, warn};

/// Ridge penalties tried for the ridge baseline
pub const RIDGE_ALPHAS: [f64; 4] = [0.1, 1.0, 10.0, 100.0];

const OLS_RIDGE: f64 = 1e-8;

/// Linear regression of the transformed total on the standardized regressors
#[derive(Debug, Clone)]
pub struct RegressionBaseline {
    name: String,
    transform: TargetTransform,
    encoding: CalendarEncoding,
    scaler: Standardizer,
    intercept: f64,
    beta: Vec<f64>,
}

impl RegressionBaseline {
    /// Ordinary least squares
    pub fn linear(
        series: &MonthlySeries,
        features: &[FeatureRow],
        transform: TargetTransform,
        encoding: CalendarEncoding,
    ) -> Result<Self> {
        Self::fit("LinearRegression".to_string(), OLS_RIDGE, series, features, transform, encoding)
    }

    /// Ridge regression with penalty `alpha`
    pub fn ridge(
        alpha: f64,
        series: &MonthlySeries,
        features: &[FeatureRow],
        transform: TargetTransform,
        encoding: CalendarEncoding,
    ) -> Result<Self> {
        if alpha <= 0.0 {
            return Err(ForecastError::Config(format!(
                "ridge alpha must be positive, got {}",
                alpha
            )));
        }
        Self::fit(format!("Ridge(alpha={})", alpha), alpha, series, features, transform, encoding)
    }

    fn fit(
        name: String,
        penalty: f64,
        series: &MonthlySeries,
        features: &[FeatureRow],
        transform: TargetTransform,
        encoding: CalendarEncoding,
    ) -> Result<Self> {
        if series.len() != features.len() || series.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs one feature row per month, got {} months and {} rows",
                name,
                series.len(),
                features.len()
            )));
        }

        let matrix = RegressorMatrix::from_rows(features, encoding);
        let scaler = Standardizer::fit(&matrix.rows)?;
        let design = scaler.transform_all(&matrix.rows)?;

        let y = transform.apply_all(&series.totals());
        let y_mean = sales_math::mean(&y).unwrap_or(0.0);
        let centred: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
        let beta = least_squares(&design, &centred, penalty)?;

        Ok(Self {
            name,
            transform,
            encoding,
            scaler,
            intercept: y_mean,
            beta,
        })
    }

    fn predict_transformed(&self, row: &FeatureRow) -> Result<f64> {
        let z = self.scaler.transform(&row.regressors(self.encoding))?;
        Ok(self.intercept + z.iter().zip(&self.beta).map(|(a, b)| a * b).sum::<f64>())
    }
}

impl TrainedModel for RegressionBaseline {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fitted_values(
        &self,
        _series: &MonthlySeries,
        features: &[FeatureRow],
    ) -> Result<Vec<Option<f64>>> {
        features
            .iter()
            .map(|row| Ok(Some(self.transform.invert(self.predict_transformed(row)?))))
            .collect()
    }

    fn forecast_row(&self, _history: &MonthlySeries, row: &FeatureRow) -> Result<f64> {
        Ok(self.transform.invert(self.predict_transformed(row)?))
    }
}

/// In-sample metrics of one baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineScore {
    pub name: String,
    pub metrics: MetricsRecord,
}

/// Fit every baseline and report its in-sample metrics, best MAE first.
///
/// A baseline that fails to fit is logged and left out.
pub fn compare(
    series: &MonthlySeries,
    features: &[FeatureRow],
    transform: TargetTransform,
    encoding: CalendarEncoding,
) -> Vec<BaselineScore> {
    let mut candidates = vec![RegressionBaseline::linear(series, features, transform, encoding)];
    candidates.extend(
        RIDGE_ALPHAS
            .iter()
            .map(|&alpha| RegressionBaseline::ridge(alpha, series, features, transform, encoding)),
    );

    let mut scores: Vec<BaselineScore> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let scored = candidate.and_then(|model| {
                let metrics = evaluate(&model, series, features)?;
                Ok(BaselineScore {
                    name: model.name(),
                    metrics,
                })
            });
            match scored {
                Ok(score) => {
                    debug!(baseline = %score.name, mae = score.metrics.mae, "baseline evaluated");
                    Some(score)
                }
                Err(err) => {
                    warn!(error = %err, "baseline skipped");
                    None
                }
            }
        })
        .collect();

    scores.sort_by(|a, b| a.metrics.mae.total_cmp(&b.metrics.mae));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Period;
    use crate::features::build_features;

    fn trending() -> MonthlySeries {
        let totals: Vec<f64> = (0..24).map(|i| 500.0 + 20.0 * i as f64).collect();
        MonthlySeries::from_totals(Period::new(2022, 1).unwrap(), &totals)
    }

    #[test]
    fn test_compare_reports_every_baseline() {
        let series = trending();
        let features = build_features(&series);
        let scores = compare(&series, &features, TargetTransform::Log1p, CalendarEncoding::Raw);

        assert_eq!(scores.len(), 1 + RIDGE_ALPHAS.len());
        assert!(scores.windows(2).all(|w| w[0].metrics.mae <= w[1].metrics.mae));
    }

    #[test]
    fn test_heavier_ridge_fits_worse() {
        let series = trending();
        let features = build_features(&series);
        let linear = RegressionBaseline::linear(&series, &features, TargetTransform::Identity, CalendarEncoding::Raw).unwrap();
        let ridge = RegressionBaseline::ridge(100.0, &series, &features, TargetTransform::Identity, CalendarEncoding::Raw).unwrap();

        let linear_mae = evaluate(&linear, &series, &features).unwrap().mae;
        let ridge_mae = evaluate(&ridge, &series, &features).unwrap().mae;
        assert!(linear_mae < ridge_mae);
    }

    #[test]
    fn test_rejects_non_positive_alpha() {
        let series = trending();
        let features = build_features(&series);
        assert!(RegressionBaseline::ridge(0.0, &series, &features, TargetTransform::Log1p, CalendarEncoding::Raw).is_err());
    }
}
