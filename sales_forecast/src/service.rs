//! Serving monthly forecasts

use crate::data::{aggregate, MonthlySeries, Period, PredictionRecord};
use crate::error::{ForecastError, Result};
use crate::features::build_future_row;
use crate::io::{PredictionSink, RecordFilter, RecordSource};
use crate::metrics::MetricsRecord;
use crate::models::TrainedModel;
use crate::store::ModelStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A served forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub period: Period,
    /// Non-negative total rounded to two decimals
    pub predicted_total: f64,
    /// e.g. "January 2025"
    pub period_label: String,
}

/// Optional target month of a forecast request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl ForecastQuery {
    pub fn next() -> Self {
        Self::default()
    }

    pub fn for_period(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    /// The requested month, or `None` for "the month after the data"
    pub fn target(&self) -> Result<Option<Period>> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => Period::new(year, month).map(Some),
            (None, None) => Ok(None),
            _ => Err(ForecastError::InvalidPeriod(
                "year and month must be given together".to_string(),
            )),
        }
    }
}

/// Body of a successful forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub predicted_sales: f64,
    pub next_period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r2: Option<f64>,
}

/// Body of a failed forecast response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Clamp a raw forecast at zero and round it to cents
pub fn finalize_prediction(raw: f64) -> f64 {
    if raw > 0.0 {
        (raw * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Forecast `target` (default: the month after the series) from the
/// history strictly before it.
pub fn forecast_with<M: TrainedModel + ?Sized>(
    model: &M,
    series: &MonthlySeries,
    target: Option<Period>,
) -> Result<Forecast> {
    let last = series.last_period().ok_or_else(|| {
        ForecastError::InsufficientData("no monthly sales to forecast from".to_string())
    })?;
    let target = target.unwrap_or_else(|| last.succ());

    let history = if target <= last {
        series.before(target)
    } else {
        series.clone()
    };
    if history.is_empty() {
        return Err(ForecastError::InsufficientData(format!(
            "no sales before {}",
            target
        )));
    }

    let row = build_future_row(&history, target)?;
    let raw = model.forecast_row(&history, &row)?;
    if !raw.is_finite() {
        return Err(ForecastError::Fit(format!(
            "{} produced a non-finite forecast for {}",
            model.name(),
            target
        )));
    }

    Ok(Forecast {
        period: target,
        predicted_total: finalize_prediction(raw),
        period_label: target.label(),
    })
}

/// Loads the published model per request and answers forecast queries
#[derive(Debug)]
pub struct ForecastService<S, P> {
    source: S,
    store: ModelStore,
    sink: P,
}

impl<S: RecordSource, P: PredictionSink> ForecastService<S, P> {
    pub fn new(source: S, store: ModelStore, sink: P) -> Self {
        Self {
            source,
            store,
            sink,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Forecast `target` and persist the result to the sink
    pub fn forecast(&self, target: Option<Period>) -> Result<Forecast> {
        self.forecast_with_metrics(target).map(|(forecast, _)| forecast)
    }

    fn forecast_with_metrics(
        &self,
        target: Option<Period>,
    ) -> Result<(Forecast, Option<MetricsRecord>)> {
        let (model, metrics) = self.store.load()?;

        let records = self.source.fetch(&RecordFilter::default())?;
        let series = aggregate(&records).map_err(|err| match err {
            ForecastError::EmptyInput(msg) => ForecastError::InsufficientData(msg),
            other => other,
        })?;

        let forecast = forecast_with(&model, &series, target)?;
        self.sink.upsert(&PredictionRecord {
            period: forecast.period,
            predicted_total: forecast.predicted_total,
        })?;

        info!(
            period = %forecast.period,
            predicted_total = forecast.predicted_total,
            model = %model.spec(),
            "forecast served"
        );
        Ok((forecast, metrics))
    }

    /// Full response for `query`, including the stored training metrics
    pub fn handle(&self, query: &ForecastQuery) -> Result<ForecastResponse> {
        let target = query.target()?;
        let (forecast, metrics) = self.forecast_with_metrics(target)?;
        Ok(ForecastResponse {
            predicted_sales: forecast.predicted_total,
            next_period: forecast.period_label,
            mae: metrics.map(|m| m.mae),
            mse: metrics.map(|m| m.mse),
            r2: metrics.map(|m| m.r2),
        })
    }

    /// Status code and JSON body for `query`
    pub fn respond(&self, query: &ForecastQuery) -> (u16, serde_json::Value) {
        let body = self
            .handle(query)
            .and_then(|response| Ok(serde_json::to_value(response)?));
        match body {
            Ok(value) => (200, value),
            Err(err) => {
                let status = err.status_code();
                warn!(status, error = %err, "forecast request failed");
                (status, serde_json::json!({ "error": err.to_string() }))
            }
        }
    }
}
