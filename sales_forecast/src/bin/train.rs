//! Train a sales model and publish it to the model directory.

use clap::Parser;
use sales_forecast::config::Config;
use sales_forecast::io::CsvRecordSource;
use sales_forecast::store::ModelStore;
use sales_forecast::training::train_and_publish;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Select and publish a monthly sales model", long_about = None)]
struct Cli {
    /// JSON config file; SALES_* environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV with DATE and TOTAL columns
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Directory to publish model.json and metrics.json to
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Fit grid points one at a time
    #[arg(long)]
    sequential: bool,
}

fn load_config(cli: &Cli) -> sales_forecast::Result<Config> {
    let base = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    let mut config = base.overlay(|key| std::env::var(key).ok())?;
    if let Some(records) = &cli.records {
        config.records_csv = records.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    if cli.sequential {
        config.grid.parallel = false;
    }
    Ok(config)
}

fn run(cli: &Cli) -> sales_forecast::Result<()> {
    let config = load_config(cli)?;
    let source = CsvRecordSource::new(&config.records_csv);
    let store = ModelStore::new(&config.model_dir);

    let report = train_and_publish(&source, &store, &config.grid)?;

    println!(
        "Selected {} (AIC {:.3}); {} of {} grid points converged",
        report.model.spec(),
        report.model.aic(),
        report.converged,
        report.attempted
    );
    print!("{}", report.metrics);
    if !report.baselines.is_empty() {
        println!("Baselines:");
        for baseline in &report.baselines {
            println!(
                "  {:<20} MAE {:.4}  R2 {:.4}",
                baseline.name, baseline.metrics.mae, baseline.metrics.r2
            );
        }
    }
    println!("Model written to {}", store.model_path().display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sales_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
