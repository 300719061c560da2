//! Record sources and prediction sinks

use crate::data::{Period, PredictionRecord, RawRecord};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Optional date components a record must match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl RecordFilter {
    /// True when every set component equals the date's
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.year.map_or(true, |y| date.year() == y)
            && self.month.map_or(true, |m| date.month() == m)
            && self.day.map_or(true, |d| date.day() == d)
    }
}

/// Where transaction records come from
pub trait RecordSource {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>>;
}

/// Where served predictions are written
pub trait PredictionSink {
    /// Insert the prediction or replace the one stored for its period
    fn upsert(&self, record: &PredictionRecord) -> Result<()>;
}

/// Records held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Vec<RawRecord>,
}

impl MemoryRecordSource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemoryRecordSource {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r.date))
            .cloned()
            .collect())
    }
}

/// Records read from a CSV file with `DATE` and `TOTAL` columns
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                ForecastError::InvalidRecord(format!("no {} column in sales records", name))
            })
    }
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`
fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ForecastError::InvalidRecord(format!("unparseable date '{}'", value)))
}

impl RecordSource for CsvRecordSource {
    fn fetch(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            info!(path = %self.path.display(), "sales records file is empty");
            return Ok(Vec::new());
        }
        let date_idx = Self::find_column(&headers, "date")?;
        let total_idx = Self::find_column(&headers, "total")?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let field = |idx: usize| row.get(idx).unwrap_or_default();
            let date = parse_date(field(date_idx))?;
            if !filter.matches(date) {
                continue;
            }
            let amount: f64 = field(total_idx).parse().map_err(|_| {
                ForecastError::InvalidRecord(format!(
                    "unparseable total '{}' on {}",
                    field(total_idx),
                    date
                ))
            })?;
            records.push(RawRecord::new(date, amount));
        }

        info!(path = %self.path.display(), records = records.len(), "fetched sales records");
        Ok(records)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Predictions kept in memory, one per period
#[derive(Debug, Default)]
pub struct MemoryPredictionSink {
    records: Mutex<BTreeMap<Period, f64>>,
}

impl MemoryPredictionSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored predictions in period order
    pub fn records(&self) -> Vec<PredictionRecord> {
        lock(&self.records)
            .iter()
            .map(|(&period, &predicted_total)| PredictionRecord {
                period,
                predicted_total,
            })
            .collect()
    }

    pub fn get(&self, period: Period) -> Option<f64> {
        lock(&self.records).get(&period).copied()
    }
}

impl PredictionSink for MemoryPredictionSink {
    fn upsert(&self, record: &PredictionRecord) -> Result<()> {
        lock(&self.records).insert(record.period, record.predicted_total);
        Ok(())
    }
}

/// Predictions stored in a CSV file with `prediction_date,predicted_sales`
/// columns, one row per month
#[derive(Debug)]
pub struct CsvPredictionSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvPredictionSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored prediction, empty if the file does not exist yet
    pub fn read_all(&self) -> Result<BTreeMap<Period, f64>> {
        let mut stored = BTreeMap::new();
        if !self.path.exists() {
            return Ok(stored);
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        for row in reader.records() {
            let row = row?;
            let date = parse_date(row.get(0).unwrap_or_default())?;
            let value: f64 = row.get(1).unwrap_or_default().trim().parse().map_err(|_| {
                ForecastError::InvalidRecord(format!("unparseable prediction for {}", date))
            })?;
            stored.insert(Period::from_date(date), value);
        }
        Ok(stored)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl PredictionSink for CsvPredictionSink {
    fn upsert(&self, record: &PredictionRecord) -> Result<()> {
        let _guard = lock(&self.write_lock);

        let mut stored = self.read_all()?;
        stored.insert(record.period, record.predicted_total);

        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(["prediction_date", "predicted_sales"])?;
            for (period, value) in &stored {
                writer.write_record([period.first_day().to_string(), format!("{:.2}", value)])?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(period = %record.period, path = %self.path.display(), "prediction upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let filter = RecordFilter {
            year: Some(2024),
            month: Some(3),
            day: None,
        };
        assert!(filter.matches(date(2024, 3, 9)));
        assert!(!filter.matches(date(2024, 4, 9)));
        assert!(!filter.matches(date(2023, 3, 9)));
        assert!(RecordFilter::default().matches(date(1999, 1, 1)));
    }

    #[test]
    fn test_empty_records_file_has_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        std::fs::write(&path, "").unwrap();

        let records = CsvRecordSource::new(&path).fetch(&RecordFilter::default()).unwrap();
        assert!(records.is_empty());
        assert!(matches!(
            crate::data::aggregate(&records),
            Err(ForecastError::EmptyInput(_))
        ));

        // A header without a total column is still malformed
        std::fs::write(&path, "date,cashier\n").unwrap();
        assert!(matches!(
            CsvRecordSource::new(&path).fetch(&RecordFilter::default()),
            Err(ForecastError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));
        assert_eq!(parse_date("2024-02-29 13:45:00").unwrap(), date(2024, 2, 29));
        assert!(parse_date("29/02/2024").is_err());
    }

    #[test]
    fn test_memory_sink_replaces_period() {
        let sink = MemoryPredictionSink::new();
        let period = Period::new(2024, 5).unwrap();
        sink.upsert(&PredictionRecord { period, predicted_total: 10.0 }).unwrap();
        sink.upsert(&PredictionRecord { period, predicted_total: 12.5 }).unwrap();
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.get(period), Some(12.5));
    }
}
