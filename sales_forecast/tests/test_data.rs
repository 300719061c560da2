use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;
use sales_forecast::data::{aggregate, MonthlySeries, Period, RawRecord};
use sales_forecast::io::{CsvRecordSource, MemoryRecordSource, RecordFilter, RecordSource};
use sales_forecast::ForecastError;
use std::io::Write;
use tempfile::NamedTempFile;

fn record(y: i32, m: u32, d: u32, amount: f64) -> RawRecord {
    RawRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), amount)
}

#[rstest]
#[case(vec![record(2023, 1, 5, 10.0), record(2023, 6, 1, 5.0)], 6)]
#[case(vec![record(2022, 11, 30, 1.0), record(2023, 2, 1, 1.0)], 4)]
#[case(vec![record(2024, 2, 29, 3.0)], 1)]
#[case(vec![record(2021, 12, 1, 1.0), record(2019, 1, 1, 2.0), record(2020, 7, 9, 0.0)], 36)]
fn test_aggregate_has_no_gaps(#[case] records: Vec<RawRecord>, #[case] months: usize) {
    let series = aggregate(&records).unwrap();
    assert_eq!(series.len(), months);

    let periods = series.periods();
    for pair in periods.windows(2) {
        assert_eq!(pair[0].months_until(&pair[1]), 1);
        assert_eq!(pair[0].succ(), pair[1]);
    }
}

#[test]
fn test_aggregate_sums_and_fills_zero() {
    let records = vec![
        record(2023, 1, 3, 100.0),
        record(2023, 1, 20, 50.0),
        record(2023, 3, 9, 25.5),
    ];
    let series = aggregate(&records).unwrap();
    assert_eq!(series.totals(), vec![150.0, 0.0, 25.5]);
    assert_eq!(series.first_period(), Some(Period::new(2023, 1).unwrap()));
    assert_eq!(series.last_period(), Some(Period::new(2023, 3).unwrap()));
}

#[test]
fn test_aggregate_empty_input() {
    assert!(matches!(aggregate(&[]), Err(ForecastError::EmptyInput(_))));
}

#[test]
fn test_aggregate_rejects_negative_amount() {
    let result = aggregate(&[record(2023, 1, 1, -1.0)]);
    assert!(matches!(result, Err(ForecastError::InvalidRecord(_))));
}

#[test]
fn test_series_before() {
    let series = MonthlySeries::from_totals(Period::new(2023, 11).unwrap(), &[1.0, 2.0, 3.0]);
    let head = series.before(Period::new(2024, 1).unwrap());
    assert_eq!(head.totals(), vec![1.0, 2.0]);
    assert!(series.before(Period::new(2023, 11).unwrap()).is_empty());
}

#[test]
fn test_csv_record_source() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Total,Cashier").unwrap();
    writeln!(file, "2023-01-01,100.0,a").unwrap();
    writeln!(file, "2023-01-15 14:30:00,50.0,b").unwrap();
    writeln!(file, "2023-02-02,75.25,a").unwrap();

    let source = CsvRecordSource::new(file.path());
    let all = source.fetch(&RecordFilter::default()).unwrap();
    assert_eq!(all.len(), 3);

    let february = source
        .fetch(&RecordFilter {
            year: Some(2023),
            month: Some(2),
            day: None,
        })
        .unwrap();
    assert_eq!(february, vec![record(2023, 2, 2, 75.25)]);

    let series = aggregate(&all).unwrap();
    assert_eq!(series.totals(), vec![150.0, 75.25]);
}

#[test]
fn test_csv_record_source_errors() {
    let source = CsvRecordSource::new("/nonexistent/sales.csv");
    assert!(matches!(
        source.fetch(&RecordFilter::default()),
        Err(ForecastError::Io(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "when,amount").unwrap();
    writeln!(file, "2023-01-01,1.0").unwrap();
    let source = CsvRecordSource::new(file.path());
    assert!(matches!(
        source.fetch(&RecordFilter::default()),
        Err(ForecastError::InvalidRecord(_))
    ));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,total").unwrap();
    writeln!(file, "2023-01-01,lots").unwrap();
    let source = CsvRecordSource::new(file.path());
    assert!(source.fetch(&RecordFilter::default()).is_err());
}

#[test]
fn test_memory_record_source_filters_by_day() {
    let source = MemoryRecordSource::new(vec![
        record(2023, 1, 1, 1.0),
        record(2023, 1, 2, 2.0),
        record(2023, 2, 1, 3.0),
    ]);
    let firsts = source
        .fetch(&RecordFilter {
            year: None,
            month: None,
            day: Some(1),
        })
        .unwrap();
    assert_eq!(firsts.len(), 2);
}
