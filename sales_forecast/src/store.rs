//! Model artifact persistence

use crate::error::{ForecastError, Result};
use crate::metrics::MetricsRecord;
use crate::selection::{SelectedModel, FORMAT_VERSION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub const MODEL_FILE: &str = "model.json";
pub const METRICS_FILE: &str = "metrics.json";

/// Directory holding the published model and its metrics.
///
/// `model.json` carries the model together with the metrics it was scored
/// with, so one rename publishes both and a reader can never pair a model
/// with another run's metrics. `metrics.json` is a standalone copy of the
/// metrics for reporting. Each file is written to a temporary file in the
/// same directory and renamed into place.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    model: &'a SelectedModel,
    metrics: Option<&'a MetricsRecord>,
}

#[derive(Deserialize)]
struct Artifact {
    model: SelectedModel,
    #[serde(default)]
    metrics: Option<MetricsRecord>,
}

impl ModelStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    /// Publish a model with its metrics, replacing any previous one
    pub fn save(&self, model: &SelectedModel, metrics: &MetricsRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        self.publish(METRICS_FILE, metrics)?;
        self.publish(
            MODEL_FILE,
            &ArtifactRef {
                model,
                metrics: Some(metrics),
            },
        )?;
        info!(
            model = %model.spec(),
            dir = %self.dir.display(),
            "model saved"
        );
        Ok(())
    }

    /// The published model and the metrics published with it
    pub fn load(&self) -> Result<(SelectedModel, Option<MetricsRecord>)> {
        let value: serde_json::Value = self.read(MODEL_FILE)?.ok_or_else(|| {
            ForecastError::ModelNotFound(format!(
                "no model at {}; run training first",
                self.model_path().display()
            ))
        })?;

        let version = value
            .get("model")
            .and_then(|model| model.get("format_version"))
            .and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(FORMAT_VERSION)) {
            return Err(ForecastError::ModelNotFound(format!(
                "model format version {} is not supported (expected {})",
                version.map_or_else(|| "unknown".to_string(), |v| v.to_string()),
                FORMAT_VERSION
            )));
        }

        let artifact: Artifact = serde_json::from_value(value)?;
        debug!(
            model = %artifact.model.spec(),
            trained_at = %artifact.model.trained_at,
            "model loaded"
        );
        Ok((artifact.model, artifact.metrics))
    }

    /// The standalone metrics report, if one was written
    pub fn load_metrics(&self) -> Result<Option<MetricsRecord>> {
        self.read(METRICS_FILE)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match std::fs::read_to_string(self.dir.join(name)) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn publish<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, value)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.dir.join(name))?;
        Ok(())
    }
}
