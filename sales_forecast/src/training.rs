//! Offline training pipeline

use crate::config::GridConfig;
use crate::data::{aggregate, RawRecord};
use crate::error::Result;
use crate::features::build_features;
use crate::io::{RecordFilter, RecordSource};
use crate::metrics::{evaluate, MetricsRecord};
use crate::models::baseline::{self, BaselineScore};
use crate::selection::{ModelSelector, SelectedModel};
use crate::store::ModelStore;
use serde::Serialize;
use tracing::info;

/// Outcome of one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model: SelectedModel,
    pub metrics: MetricsRecord,
    /// Regression baselines on the same regressors, best MAE first
    pub baselines: Vec<BaselineScore>,
    /// Grid points tried
    pub attempted: usize,
    /// Grid points that fitted
    pub converged: usize,
}

/// Aggregate, build features, select a model and evaluate it
pub fn train(records: &[RawRecord], grid: &GridConfig) -> Result<TrainingReport> {
    grid.validate()?;

    let series = aggregate(records)?;
    let features = build_features(&series);

    let selector = ModelSelector::from_config(grid);
    let outcome = selector.search(&series, &features, &grid.grid())?;
    let metrics = evaluate(&outcome.best, &series, &features)?;
    let baselines = baseline::compare(&series, &features, selector.transform, selector.encoding);

    Ok(TrainingReport {
        model: outcome.best,
        metrics,
        baselines,
        attempted: outcome.attempted,
        converged: outcome.converged,
    })
}

/// Train on everything `source` holds and publish the result to `store`
pub fn train_and_publish<S: RecordSource + ?Sized>(
    source: &S,
    store: &ModelStore,
    grid: &GridConfig,
) -> Result<TrainingReport> {
    let records = source.fetch(&RecordFilter::default())?;
    let report = train(&records, grid)?;
    store.save(&report.model, &report.metrics)?;
    info!(
        model = %report.model.spec(),
        attempted = report.attempted,
        converged = report.converged,
        "training published"
    );
    Ok(report)
}
