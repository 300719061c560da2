//! Configuration for training and serving

use crate::error::{ForecastError, Result};
use crate::features::CalendarEncoding;
use crate::models::sarimax::SarimaxSpec;
use crate::models::TargetTransform;
use sales_math::optimize::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub const ENV_MODEL_DIR: &str = "SALES_MODEL_DIR";
pub const ENV_RECORDS_CSV: &str = "SALES_RECORDS_CSV";
pub const ENV_PREDICTIONS_CSV: &str = "SALES_PREDICTIONS_CSV";
pub const ENV_LOG_TRANSFORM: &str = "SALES_LOG_TRANSFORM";
pub const ENV_PARALLEL: &str = "SALES_PARALLEL";

/// Inclusive range of one model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRange {
    pub min: usize,
    pub max: usize,
}

impl OrderRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// A range holding a single order
    pub fn fixed(order: usize) -> Self {
        Self::new(order, order)
    }

    pub fn values(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Default for OrderRange {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

/// Search space and fitting options for model selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub p: OrderRange,
    pub d: OrderRange,
    pub q: OrderRange,
    pub seasonal_p: OrderRange,
    pub seasonal_d: OrderRange,
    pub seasonal_q: OrderRange,
    pub season_length: usize,
    /// Model `ln(1 + total)` instead of the raw total
    pub log_transform: bool,
    pub calendar_encoding: CalendarEncoding,
    /// Fit grid points on the rayon pool
    pub parallel: bool,
    pub optimizer: NelderMeadConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            p: OrderRange::default(),
            d: OrderRange::default(),
            q: OrderRange::default(),
            seasonal_p: OrderRange::default(),
            seasonal_d: OrderRange::default(),
            seasonal_q: OrderRange::default(),
            season_length: 12,
            log_transform: true,
            calendar_encoding: CalendarEncoding::Raw,
            parallel: true,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("p", self.p),
            ("d", self.d),
            ("q", self.q),
            ("seasonal_p", self.seasonal_p),
            ("seasonal_d", self.seasonal_d),
            ("seasonal_q", self.seasonal_q),
        ];
        for (name, range) in ranges {
            if range.is_empty() {
                return Err(ForecastError::Config(format!(
                    "range {} is empty ({}..={})",
                    name, range.min, range.max
                )));
            }
        }
        if self.season_length < 2 {
            return Err(ForecastError::Config(format!(
                "season_length must be at least 2, got {}",
                self.season_length
            )));
        }
        if self.optimizer.max_iter == 0 {
            return Err(ForecastError::Config(
                "optimizer.max_iter must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn transform(&self) -> TargetTransform {
        TargetTransform::from_flag(self.log_transform)
    }

    /// Cross product of the order ranges, ordered by p, d, q, P, D, Q
    pub fn grid(&self) -> Vec<SarimaxSpec> {
        let mut grid = Vec::new();
        for p in self.p.values() {
            for d in self.d.values() {
                for q in self.q.values() {
                    for sp in self.seasonal_p.values() {
                        for sd in self.seasonal_d.values() {
                            for sq in self.seasonal_q.values() {
                                grid.push(SarimaxSpec::new(
                                    (p, d, q),
                                    (sp, sd, sq, self.season_length),
                                ));
                            }
                        }
                    }
                }
            }
        }
        grid
    }
}

/// Locations and model options shared by the binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `model.json` and `metrics.json`
    pub model_dir: PathBuf,
    pub records_csv: PathBuf,
    pub predictions_csv: PathBuf,
    pub grid: GridConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./model"),
            records_csv: PathBuf::from("./data/laundry.csv"),
            predictions_csv: PathBuf::from("./data/sales_predictions.csv"),
            grid: GridConfig::default(),
        }
    }
}

impl Config {
    /// Read a JSON config; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the `SALES_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply settings found by `lookup` on top of `self`
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_MODEL_DIR) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup(ENV_RECORDS_CSV) {
            self.records_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_PREDICTIONS_CSV) {
            self.predictions_csv = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_LOG_TRANSFORM) {
            self.grid.log_transform = parse_flag(ENV_LOG_TRANSFORM, &flag)?;
        }
        if let Some(flag) = lookup(ENV_PARALLEL) {
            self.grid.parallel = parse_flag(ENV_PARALLEL, &flag)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ForecastError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_grid_order() {
        let grid = GridConfig::default().grid();
        assert_eq!(grid.len(), 64);
        assert_eq!(grid[0], SarimaxSpec::new((0, 0, 0), (0, 0, 0, 12)));
        assert_eq!(grid[1], SarimaxSpec::new((0, 0, 0), (0, 0, 1, 12)));
        assert_eq!(grid[63], SarimaxSpec::new((1, 1, 1), (1, 1, 1, 12)));
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        let config = GridConfig {
            q: OrderRange::new(2, 1),
            ..GridConfig::default()
        };
        assert!(matches!(config.validate(), Err(ForecastError::Config(_))));

        let config = GridConfig {
            season_length: 1,
            ..GridConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlay_from_environment() {
        let vars: HashMap<&str, &str> = [
            (ENV_MODEL_DIR, "/tmp/models"),
            (ENV_LOG_TRANSFORM, "false"),
            (ENV_PARALLEL, "0"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .overlay(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/tmp/models"));
        assert!(!config.grid.log_transform);
        assert!(!config.grid.parallel);
        assert_eq!(config.records_csv, PathBuf::from("./data/laundry.csv"));
    }

    #[test]
    fn test_overlay_rejects_bad_flag() {
        let result = Config::default().overlay(|key| {
            (key == ENV_PARALLEL).then(|| "maybe".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"grid": {"p": {"min": 0, "max": 2}, "calendar_encoding": "cyclic"}}"#)
                .unwrap();
        assert_eq!(config.grid.p, OrderRange::new(0, 2));
        assert_eq!(config.grid.calendar_encoding, CalendarEncoding::Cyclic);
        assert_eq!(config.grid.season_length, 12);
        assert_eq!(config.model_dir, PathBuf::from("./model"));
    }
}
