//! Exogenous regressors derived from a monthly series
//!
//! Training and serving both go through [`build_features`] /
//! [`build_future_row`] and [`FeatureRow::regressors`], so the regressor
//! vector a model sees at forecast time has the same columns, in the same
//! order, as the one it was fitted on.

use crate::data::{MonthlySeries, Period};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of preceding months averaged by `rolling_avg_3`
pub const ROLLING_WINDOW: usize = 3;

/// How month and quarter enter the regressor vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarEncoding {
    /// `month` and `quarter` as plain numbers
    #[default]
    Raw,
    /// Sine/cosine pairs with periods 12 and 4
    Cyclic,
}

impl CalendarEncoding {
    /// Regressor column names, in vector order
    pub fn columns(&self) -> Vec<String> {
        let calendar: &[&str] = match self {
            CalendarEncoding::Raw => &["month", "quarter"],
            CalendarEncoding::Cyclic => &["month_sin", "month_cos", "quarter_sin", "quarter_cos"],
        };
        calendar
            .iter()
            .chain(["prev_month_total", "rolling_avg_3"].iter())
            .map(|c| c.to_string())
            .collect()
    }
}

impl std::str::FromStr for CalendarEncoding {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(CalendarEncoding::Raw),
            "cyclic" => Ok(CalendarEncoding::Cyclic),
            other => Err(ForecastError::Config(format!(
                "unknown calendar encoding '{}'",
                other
            ))),
        }
    }
}

/// Calendar and lag features of one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub period: Period,
    pub month: u32,
    pub quarter: u32,
    pub prev_month_total: f64,
    pub rolling_avg_3: f64,
}

impl FeatureRow {
    fn new(period: Period, prev_month_total: f64, rolling_avg_3: f64) -> Self {
        Self {
            period,
            month: period.month(),
            quarter: period.quarter(),
            prev_month_total,
            rolling_avg_3,
        }
    }

    /// Regressor vector in the order of [`CalendarEncoding::columns`]
    pub fn regressors(&self, encoding: CalendarEncoding) -> Vec<f64> {
        let month = self.month as f64;
        let quarter = self.quarter as f64;
        let mut values = match encoding {
            CalendarEncoding::Raw => vec![month, quarter],
            CalendarEncoding::Cyclic => vec![
                (2.0 * PI * month / 12.0).sin(),
                (2.0 * PI * month / 12.0).cos(),
                (2.0 * PI * quarter / 4.0).sin(),
                (2.0 * PI * quarter / 4.0).cos(),
            ],
        };
        values.push(self.prev_month_total);
        values.push(self.rolling_avg_3);
        values
    }
}

/// One feature row per month of the series.
///
/// `prev_month_total` is the previous month's total; the first row has no
/// predecessor and takes the next row's value. `rolling_avg_3` averages up
/// to three strictly preceding months; the first row again takes the next
/// row's value. A single-month series has nothing to fill from and gets 0.
pub fn build_features(series: &MonthlySeries) -> Vec<FeatureRow> {
    let totals = series.totals();
    let n = totals.len();

    let prev: Vec<Option<f64>> = (0..n)
        .map(|i| if i == 0 { None } else { Some(totals[i - 1]) })
        .collect();
    let rolling: Vec<Option<f64>> = (0..n)
        .map(|i| {
            let window = &totals[i.saturating_sub(ROLLING_WINDOW)..i];
            sales_math::mean(window)
        })
        .collect();

    let prev = backfill(&prev);
    let rolling = backfill(&rolling);

    series
        .iter()
        .zip(prev.into_iter().zip(rolling))
        .map(|(entry, (p, r))| FeatureRow::new(entry.period, p, r))
        .collect()
}

/// Feature row for a month after the end of `series`.
///
/// `prev_month_total` is the last total when the series ends right before
/// `target`, otherwise the series mean. `rolling_avg_3` is the mean of the
/// last three known totals.
pub fn build_future_row(series: &MonthlySeries, target: Period) -> Result<FeatureRow> {
    let last = series.last_period().ok_or_else(|| {
        ForecastError::InsufficientData("cannot build features from an empty series".to_string())
    })?;
    if target <= last {
        return Err(ForecastError::InvalidPeriod(format!(
            "target {} is not after the series end {}",
            target, last
        )));
    }

    let totals = series.totals();
    let mean = series.mean().unwrap_or(0.0);

    let prev_month_total = match series.total_at(target.pred()) {
        Some(total) => total,
        None => mean,
    };
    let rolling_avg_3 =
        sales_math::mean(&totals[totals.len().saturating_sub(ROLLING_WINDOW)..]).unwrap_or(mean);

    Ok(FeatureRow::new(target, prev_month_total, rolling_avg_3))
}

/// Replace each missing value with the nearest later one; 0 when there is none
fn backfill(values: &[Option<f64>]) -> Vec<f64> {
    let mut out = vec![0.0; values.len()];
    let mut next: Option<f64> = None;
    for (i, value) in values.iter().enumerate().rev() {
        if value.is_some() {
            next = *value;
        }
        out[i] = next.unwrap_or(0.0);
    }
    out
}

/// Regressor rows with their column names
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl RegressorMatrix {
    pub fn from_rows(rows: &[FeatureRow], encoding: CalendarEncoding) -> Self {
        Self {
            columns: encoding.columns(),
            rows: rows.iter().map(|r| r.regressors(encoding)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column-wise centring and scaling fitted on the training range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Standardizer {
    /// Population mean and standard deviation per column.
    ///
    /// Constant columns keep a scale of 1.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows.first().map(|r| r.len()).ok_or_else(|| {
            ForecastError::InsufficientData("no regressor rows to standardize".to_string())
        })?;
        let n = rows.len() as f64;

        let mut means = vec![0.0; width];
        let mut scales = vec![1.0; width];
        for j in 0..width {
            let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n;
            let var = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
            means[j] = mean;
            if var.sqrt() > 1e-12 {
                scales[j] = var.sqrt();
            }
        }
        Ok(Self { means, scales })
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(ForecastError::Fit(format!(
                "regressor row has {} values, scaler expects {}",
                row.len(),
                self.means.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn transform_all(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(totals: &[f64]) -> MonthlySeries {
        MonthlySeries::from_totals(Period::new(2023, 1).unwrap(), totals)
    }

    #[test]
    fn test_backfill() {
        assert_eq!(backfill(&[None, Some(2.0), None, Some(4.0)]), vec![2.0, 2.0, 4.0, 4.0]);
        assert_eq!(backfill(&[None]), vec![0.0]);
    }

    #[test]
    fn test_calendar_features() {
        let rows = build_features(&series(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(rows[3].month, 4);
        assert_eq!(rows[3].quarter, 2);
    }

    #[test]
    fn test_single_month_has_zero_lags() {
        let rows = build_features(&series(&[42.0]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].prev_month_total, 0.0);
        assert_eq!(rows[0].rolling_avg_3, 0.0);
    }

    #[test]
    fn test_cyclic_regressors() {
        let row = FeatureRow::new(Period::new(2023, 3).unwrap(), 1.0, 2.0);
        let values = row.regressors(CalendarEncoding::Cyclic);
        assert_eq!(values.len(), CalendarEncoding::Cyclic.columns().len());
        assert!((values[0] - 1.0).abs() < 1e-12); // sin(pi/2)
        assert_eq!(&values[4..], &[1.0, 2.0]);
    }

    #[test]
    fn test_standardizer_constant_column() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = Standardizer::fit(&rows).unwrap();
        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.scales, vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&[3.0, 5.0]).unwrap(), vec![1.0, 0.0]);
        assert!(scaler.transform(&[1.0]).is_err());
    }
}
