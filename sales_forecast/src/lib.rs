//! # Sales Forecast
//!
//! Monthly sales forecasting from raw transaction records.
//!
//! ## Features
//!
//! - Aggregation of dated transactions into a gap-free monthly series
//! - Calendar and lag regressors (`month`, `quarter`, `prev_month_total`, `rolling_avg_3`)
//! - SARIMAX model selection by AIC over a configurable order grid
//! - In-sample evaluation (MAE, MSE, R², SMAPE) and regression baselines
//! - Atomic publishing of the model artifact and its metrics
//! - Forecasts for the month after the data or any requested month
//!
//! ## Pipeline
//!
//! Training runs `Aggregator -> FeatureBuilder -> ModelSelector -> Evaluator`
//! and publishes to a [`ModelStore`]. Serving loads the published model on
//! every request, rebuilds the regressors for the target month and writes the
//! clamped, rounded forecast to a [`PredictionSink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::config::Config;
//! use sales_forecast::io::{CsvPredictionSink, CsvRecordSource};
//! use sales_forecast::service::{ForecastQuery, ForecastService};
//! use sales_forecast::store::ModelStore;
//! use sales_forecast::training::train_and_publish;
//!
//! # fn main() -> sales_forecast::Result<()> {
//! let config = Config::from_env()?;
//! let source = CsvRecordSource::new(&config.records_csv);
//! let store = ModelStore::new(&config.model_dir);
//!
//! // Select and publish a model
//! let report = train_and_publish(&source, &store, &config.grid)?;
//! println!("{}", report.metrics);
//!
//! // Forecast the month after the data
//! let service = ForecastService::new(source, store, CsvPredictionSink::new(&config.predictions_csv));
//! let forecast = service.forecast(None)?;
//! println!("{}: {:.2}", forecast.period_label, forecast.predicted_total);
//!
//! // Or answer a request for a specific month
//! let (status, body) = service.respond(&ForecastQuery::for_period(2025, 1));
//! println!("{} {}", status, body);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod io;
pub mod metrics;
pub mod models;
pub mod selection;
pub mod service;
pub mod store;
pub mod training;

// Re-export commonly used types
pub use crate::config::{Config, GridConfig};
pub use crate::data::{aggregate, MonthlySeries, Period, PredictionRecord, RawRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_features, build_future_row, CalendarEncoding, FeatureRow};
pub use crate::io::{PredictionSink, RecordFilter, RecordSource};
pub use crate::metrics::MetricsRecord;
pub use crate::models::sarimax::SarimaxSpec;
pub use crate::models::{TargetTransform, TrainedModel};
pub use crate::selection::{ModelSelector, SelectedModel};
pub use crate::service::{Forecast, ForecastQuery, ForecastService};
pub use crate::store::ModelStore;
pub use crate::training::{train, train_and_publish, TrainingReport};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
