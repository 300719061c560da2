//! Forecasting models for monthly sales

use crate::data::MonthlySeries;
use crate::error::Result;
use crate::features::FeatureRow;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod baseline;
pub mod sarimax;

/// Variance-stabilising transform applied to totals before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTransform {
    /// `ln(1 + y)`, defined for every non-negative total
    #[default]
    Log1p,
    /// Totals are modelled as they are
    Identity,
}

impl TargetTransform {
    pub fn from_flag(log: bool) -> Self {
        if log {
            TargetTransform::Log1p
        } else {
            TargetTransform::Identity
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            TargetTransform::Log1p => value.ln_1p(),
            TargetTransform::Identity => value,
        }
    }

    pub fn invert(&self, value: f64) -> f64 {
        match self {
            TargetTransform::Log1p => value.exp_m1(),
            TargetTransform::Identity => value,
        }
    }

    pub fn apply_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.apply(*v)).collect()
    }

    pub fn invert_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|v| self.invert(*v)).collect()
    }
}

/// A fitted model that can be evaluated in-sample and queried for a month
pub trait TrainedModel: Debug {
    /// Name of the model
    fn name(&self) -> String;

    /// In-sample fitted totals on the original scale, one per month of
    /// `series`. `None` marks a month the model cannot predict, such as one
    /// consumed by differencing.
    fn fitted_values(
        &self,
        series: &MonthlySeries,
        features: &[FeatureRow],
    ) -> Result<Vec<Option<f64>>>;

    /// Total for the month described by `row`, given the months before it.
    ///
    /// `history` ends before `row.period`. The result is on the original
    /// scale and not yet clamped.
    fn forecast_row(&self, history: &MonthlySeries, row: &FeatureRow) -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log1p_roundtrip_at_zero() {
        let t = TargetTransform::Log1p;
        assert_eq!(t.apply(0.0), 0.0);
        assert!((t.invert(t.apply(1234.5)) - 1234.5).abs() < 1e-9);
        assert_eq!(TargetTransform::Identity.apply(-3.0), -3.0);
    }
}
