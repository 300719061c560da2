use approx::assert_relative_eq;
use rstest::rstest;
use sales_forecast::data::{MonthlySeries, Period};
use sales_forecast::features::{build_features, FeatureRow};
use sales_forecast::metrics::{
    compare, evaluate, mean_absolute_error, mean_squared_error, r2_score,
    symmetric_mean_absolute_percentage_error,
};
use sales_forecast::models::TrainedModel;
use sales_forecast::{ForecastError, Result};

#[test]
fn test_known_values() {
    let actual = [100.0, 200.0, 300.0];
    let predicted = [110.0, 190.0, 300.0];

    assert_relative_eq!(mean_absolute_error(&actual, &predicted), 20.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(mean_squared_error(&actual, &predicted), 200.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(r2_score(&actual, &predicted), 1.0 - 200.0 / 20000.0, epsilon = 1e-12);

    let smape = symmetric_mean_absolute_percentage_error(&actual, &predicted);
    let expected = (10.0 / 105.0 + 10.0 / 195.0 + 0.0) / 3.0 * 100.0;
    assert_relative_eq!(smape, expected, epsilon = 1e-12);
}

#[rstest]
#[case(&[0.0, 0.0], &[0.0, 0.0], 0.0)]
#[case(&[0.0, 10.0], &[0.0, 10.0], 0.0)]
#[case(&[0.0, 10.0], &[0.0, 0.0], 100.0)]
fn test_smape_guards_double_zero(#[case] actual: &[f64], #[case] predicted: &[f64], #[case] expected: f64) {
    let smape = symmetric_mean_absolute_percentage_error(actual, predicted);
    assert!(smape.is_finite());
    assert_relative_eq!(smape, expected);
}

#[test]
fn test_mismatched_lengths() {
    assert!(mean_absolute_error(&[1.0], &[]).is_nan());
    assert!(compare(&[1.0, 2.0], &[1.0]).is_err());
}

#[derive(Debug)]
struct Echo;

impl TrainedModel for Echo {
    fn name(&self) -> String {
        "echo".to_string()
    }

    fn fitted_values(&self, series: &MonthlySeries, _features: &[FeatureRow]) -> Result<Vec<Option<f64>>> {
        Ok(series.totals().into_iter().map(Some).collect())
    }

    fn forecast_row(&self, _history: &MonthlySeries, row: &FeatureRow) -> Result<f64> {
        Ok(row.prev_month_total)
    }
}

/// Predicts 10 for every month after the first and nothing for the first
#[derive(Debug)]
struct SkipsFirst;

impl TrainedModel for SkipsFirst {
    fn name(&self) -> String {
        "skips-first".to_string()
    }

    fn fitted_values(&self, series: &MonthlySeries, _features: &[FeatureRow]) -> Result<Vec<Option<f64>>> {
        Ok((0..series.len()).map(|i| (i > 0).then_some(10.0)).collect())
    }

    fn forecast_row(&self, _history: &MonthlySeries, _row: &FeatureRow) -> Result<f64> {
        Ok(10.0)
    }
}

#[test]
fn test_evaluate_scores_only_predicted_months() {
    let series = MonthlySeries::from_totals(Period::new(2023, 1).unwrap(), &[500.0, 10.0, 12.0, 8.0]);
    let features = build_features(&series);
    let metrics = evaluate(&SkipsFirst, &series, &features).unwrap();

    // The unpredicted 500 is left out: errors are 0, 2 and 2
    assert_relative_eq!(metrics.mae, 4.0 / 3.0);
    assert_relative_eq!(metrics.mse, 8.0 / 3.0);
}

#[test]
fn test_evaluate_without_predictions() {
    let series = MonthlySeries::from_totals(Period::new(2023, 1).unwrap(), &[5.0]);
    let features = build_features(&series);
    assert!(matches!(
        evaluate(&SkipsFirst, &series, &features),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_evaluate_perfect_model() {
    let series = MonthlySeries::from_totals(Period::new(2023, 1).unwrap(), &[5.0, 0.0, 7.0, 9.0]);
    let features = build_features(&series);
    let metrics = evaluate(&Echo, &series, &features).unwrap();

    assert_eq!(metrics.mae, 0.0);
    assert_eq!(metrics.mse, 0.0);
    assert_relative_eq!(metrics.r2, 1.0);
    assert_eq!(metrics.smape, Some(0.0));
}

#[test]
fn test_metrics_display() {
    let metrics = compare(&[1.0, 2.0], &[1.0, 3.0]).unwrap();
    let text = metrics.to_string();
    assert!(text.contains("MAE"));
    assert!(text.contains("SMAPE"));
}
