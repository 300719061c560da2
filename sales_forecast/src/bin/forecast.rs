//! Forecast one month from the published model and print the JSON response.

use clap::Parser;
use sales_forecast::config::Config;
use sales_forecast::io::{CsvPredictionSink, CsvRecordSource};
use sales_forecast::service::{ForecastQuery, ForecastService};
use sales_forecast::store::ModelStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Forecast monthly sales with the published model", long_about = None)]
struct Cli {
    /// Target year; requires --month
    #[arg(short, long, requires = "month")]
    year: Option<i32>,

    /// Target month (1-12); requires --year
    #[arg(short, long, requires = "year")]
    month: Option<u32>,

    /// JSON config file; SALES_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn load_config(cli: &Cli) -> sales_forecast::Result<Config> {
    let base = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    base.overlay(|key| std::env::var(key).ok())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let service = ForecastService::new(
        CsvRecordSource::new(&config.records_csv),
        ModelStore::new(&config.model_dir),
        CsvPredictionSink::new(&config.predictions_csv),
    );
    let query = ForecastQuery {
        year: cli.year,
        month: cli.month,
    };

    let (status, body) = service.respond(&query);
    println!("{}", body);
    if status == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
