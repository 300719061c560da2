//! Metrics for evaluating in-sample fit

use crate::data::MonthlySeries;
use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use crate::models::TrainedModel;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

/// Error metrics of one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Symmetric Mean Absolute Percentage Error, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smape: Option<f64>,
}

impl std::fmt::Display for MetricsRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "In-sample Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  R2:    {:.4}", self.r2)?;
        if let Some(smape) = self.smape {
            writeln!(f, "  SMAPE: {:.4}%", smape)?;
        }
        Ok(())
    }
}

/// Compare a model's in-sample fitted totals with the observed totals.
///
/// Only months the model actually predicts are scored.
pub fn evaluate<M: TrainedModel + ?Sized>(
    model: &M,
    series: &MonthlySeries,
    features: &[FeatureRow],
) -> Result<MetricsRecord> {
    let fitted = model.fitted_values(series, features)?;
    if fitted.len() != series.len() {
        return Err(ForecastError::InsufficientData(format!(
            "{} fitted values for {} months",
            fitted.len(),
            series.len()
        )));
    }
    let (actual, predicted): (Vec<f64>, Vec<f64>) = series
        .totals()
        .into_iter()
        .zip(fitted)
        .filter_map(|(actual, fitted)| fitted.map(|p| (actual, p)))
        .unzip();
    let metrics = compare(&actual, &predicted)?;
    info!(
        model = %model.name(),
        scored = actual.len(),
        mae = metrics.mae,
        mse = metrics.mse,
        r2 = metrics.r2,
        "evaluated in-sample fit"
    );
    Ok(metrics)
}

/// All metrics for a pair of equally long, non-empty series
pub fn compare(actual: &[f64], predicted: &[f64]) -> Result<MetricsRecord> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "actual ({}) and predicted ({}) values must have the same non-zero length",
            actual.len(),
            predicted.len()
        )));
    }

    Ok(MetricsRecord {
        mae: mean_absolute_error(actual, predicted),
        mse: mean_squared_error(actual, predicted),
        r2: r2_score(actual, predicted),
        smape: Some(symmetric_mean_absolute_percentage_error(actual, predicted)),
    })
}

pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .mean()
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .mean()
}

/// Coefficient of determination.
///
/// A constant `actual` has no variance to explain: a perfect fit scores 1
/// and anything else 0.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let mean = actual.iter().mean();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot <= f64::EPSILON * (1.0 + mean * mean) * actual.len() as f64 {
        return if ss_res <= 1e-9 * (1.0 + mean * mean) { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// SMAPE in percent. Periods where actual and predicted are both zero
/// count as exact.
pub fn symmetric_mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let terms = actual.iter().zip(predicted).map(|(a, p)| {
        let denominator = (a.abs() + p.abs()) / 2.0;
        if denominator == 0.0 {
            0.0
        } else {
            (a - p).abs() / denominator
        }
    });
    terms.mean() * 100.0
}
