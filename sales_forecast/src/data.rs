//! Transaction records and their monthly aggregation

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(ForecastError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ForecastError::InvalidPeriod(format!(
                "year {} is out of range",
                year
            )));
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Quarter of the year, 1 to 4
    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }

    /// The following month
    pub fn succ(&self) -> Self {
        self.offset(1)
    }

    /// The preceding month
    pub fn pred(&self) -> Self {
        self.offset(-1)
    }

    /// Shift by a number of months
    pub fn offset(&self, months: i64) -> Self {
        let index = self.index() + months;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: &Period) -> i64 {
        other.index() - self.index()
    }

    /// First day of the month, used as the key of persisted predictions
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Human readable label, e.g. "January 2025"
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    fn index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = ForecastError;

    /// Parse "YYYY-MM"
    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ForecastError::InvalidPeriod(format!("expected YYYY-MM, got '{}'", s)))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ForecastError::InvalidPeriod(format!("invalid year in '{}'", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| ForecastError::InvalidPeriod(format!("invalid month in '{}'", s)))?;
        Period::new(year, month)
    }
}

/// A single sales transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

impl RawRecord {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Total sales of one month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub period: Period,
    pub total: f64,
}

/// Dense monthly sales series.
///
/// Periods are strictly consecutive: every month between the first and the
/// last entry is present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonthlySeries {
    entries: Vec<MonthlyTotal>,
}

impl MonthlySeries {
    /// Build a series of consecutive months starting at `start`
    pub fn from_totals(start: Period, totals: &[f64]) -> Self {
        let entries = totals
            .iter()
            .enumerate()
            .map(|(i, &total)| MonthlyTotal {
                period: start.offset(i as i64),
                total,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MonthlyTotal] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyTotal> {
        self.entries.iter()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.total).collect()
    }

    pub fn periods(&self) -> Vec<Period> {
        self.entries.iter().map(|e| e.period).collect()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.entries.first().map(|e| e.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.entries.last().map(|e| e.period)
    }

    /// Total of a period, if the series covers it
    pub fn total_at(&self, period: Period) -> Option<f64> {
        let first = self.first_period()?;
        let offset = first.months_until(&period);
        if offset < 0 {
            return None;
        }
        self.entries.get(offset as usize).map(|e| e.total)
    }

    /// Mean total over the whole series
    pub fn mean(&self) -> Option<f64> {
        sales_math::mean(&self.totals())
    }

    /// The part of the series strictly before `period`
    pub fn before(&self, period: Period) -> MonthlySeries {
        Self {
            entries: self
                .entries
                .iter()
                .take_while(|e| e.period < period)
                .copied()
                .collect(),
        }
    }
}

/// Group records by calendar month and fill missing months with zero.
pub fn aggregate(records: &[RawRecord]) -> Result<MonthlySeries> {
    if records.is_empty() {
        return Err(ForecastError::EmptyInput(
            "no sales records to aggregate".to_string(),
        ));
    }

    let mut by_month: BTreeMap<Period, f64> = BTreeMap::new();
    for record in records {
        if !record.amount.is_finite() || record.amount < 0.0 {
            return Err(ForecastError::InvalidRecord(format!(
                "amount on {} must be a non-negative number, got {}",
                record.date, record.amount
            )));
        }
        *by_month.entry(Period::from_date(record.date)).or_insert(0.0) += record.amount;
    }

    // Non-empty input guarantees both ends exist
    let (first, last) = match (by_month.keys().next(), by_month.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Err(ForecastError::EmptyInput(
                "no sales records to aggregate".to_string(),
            ))
        }
    };

    let span = first.months_until(&last) as usize + 1;
    let totals: Vec<f64> = (0..span)
        .map(|i| {
            by_month
                .get(&first.offset(i as i64))
                .copied()
                .unwrap_or(0.0)
        })
        .collect();

    let filled = span - by_month.len();
    if filled > 0 {
        debug!(filled, "filled months without sales with zero");
    }
    info!(
        records = records.len(),
        months = span,
        first = %first,
        last = %last,
        "aggregated sales records into monthly series"
    );

    Ok(MonthlySeries::from_totals(first, &totals))
}

/// A served prediction, keyed by the month it is for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub period: Period,
    /// Clamped, rounded total returned to the caller
    pub predicted_total: f64,
}
