// src/main.rs

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use restock_advisor::forecasting::calendar::HolidayCalendar;
use restock_advisor::io::demand;
use restock_advisor::io::reporting::{self, round2};
use restock_advisor::pipeline::planner::category_series;
use restock_advisor::strategy::safety_stock::z_for_service_level;
use restock_advisor::{RestockConfig, RestockPlanner, SeasonalRegression, Transaction};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Holidays {
    Us,
    None,
}

#[derive(Parser, Debug)]
#[command(name = "restock-advisor")]
#[command(about = "Category restocking plan from sales history", long_about = None)]
struct Cli {
    /// Transactions CSV with order_date, category and sales columns
    #[arg(short, long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
    input: Option<PathBuf>,

    /// Generate three years of demo transactions from this seed instead of reading a file
    #[arg(long)]
    synthetic: Option<u64>,

    /// Restocking plan output
    #[arg(short, long, default_value = "category_restocking_plan.csv")]
    output: PathBuf,

    /// Also write one forecast table per category into this directory
    #[arg(long)]
    forecast_dir: Option<PathBuf>,

    /// Months to forecast
    #[arg(long, default_value = "12")]
    horizon: usize,

    /// z-score applied to the model error
    #[arg(long, conflicts_with = "service_level")]
    service_level_z: Option<f64>,

    /// One-sided service level in (0, 1), converted to a z-score
    #[arg(long)]
    service_level: Option<f64>,

    /// Months of history required before tuning
    #[arg(long, default_value = "24")]
    min_history: usize,

    /// Skip the grid search and use in-sample residual error
    #[arg(long)]
    no_tune: bool,

    /// Worker threads (default: one per core)
    #[arg(long)]
    workers: Option<usize>,

    #[arg(long, value_enum, default_value = "us")]
    holidays: Holidays,
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restock_advisor=info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    // 1. SETUP CONFIGURATION
    let config = build_config(&cli)?;

    // 2. LOAD DEMAND
    let transactions = load_transactions(&cli)?;
    if transactions.is_empty() {
        warn!("no transactions to plan from");
    }

    // 3. FORECAST AND ADVISE
    let planner = RestockPlanner::new(config, Arc::new(SeasonalRegression::new()))?;
    let report = planner.plan(&transactions)?;

    // 4. EXPORT RESULTS
    reporting::write_report(&cli.output, &report)?;
    if let Some(dir) = &cli.forecast_dir {
        fs::create_dir_all(dir)?;
        for rec in &report.recommendations {
            let series = category_series(&transactions, &rec.segment);
            let output = planner.forecast_segment(&rec.segment, &series)?;
            let path = dir.join(format!("{}_forecast.csv", reporting::segment_file_stem(&rec.segment)));
            reporting::write_forecast(&path, output.forecast.future())?;
        }
        info!(dir = %dir.display(), "exported forecast tables");
    }

    // 5. PRINT FINAL ADVICE
    println!("\n=== Restocking Plan ===");
    println!(
        "{:<20} {:<12} {:>14} {:>12} {:>12} {:>14} {}",
        "segment", "period", "predicted", "error", "safety", "order", "error via"
    );
    for rec in &report.recommendations {
        println!(
            "{:<20} {:<12} {:>14.2} {:>12.2} {:>12.2} {:>14.2} {:?}",
            rec.segment,
            rec.forecast_period.to_string(),
            round2(rec.predicted_demand),
            round2(rec.model_error),
            round2(rec.safety_stock),
            round2(rec.recommended_order),
            rec.error_source,
        );
    }
    for skipped in &report.skipped {
        println!("{:<20} skipped: {}", skipped.segment, skipped.reason);
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<RestockConfig, Box<dyn Error>> {
    let mut config = if cli.no_tune {
        RestockConfig::interactive()
    } else {
        RestockConfig::default()
    };
    config.horizon_periods = cli.horizon;
    config.min_history_periods = cli.min_history;
    config.workers = cli.workers;
    config.holidays = match cli.holidays {
        Holidays::Us => HolidayCalendar::UsFederal,
        Holidays::None => HolidayCalendar::None,
    };
    if let Some(z) = cli.service_level_z {
        config.service_level_z = z;
    } else if let Some(p) = cli.service_level {
        config.service_level_z = z_for_service_level(p)?;
    }
    config.validate()?;
    Ok(config)
}

fn load_transactions(cli: &Cli) -> Result<Vec<Transaction>, Box<dyn Error>> {
    match (&cli.input, cli.synthetic) {
        (Some(path), _) => Ok(reporting::read_transactions(path)?),
        (None, Some(seed)) => {
            let start = NaiveDate::from_ymd_opt(2014, 1, 1).ok_or("invalid start date")?;
            let txs = demand::generate_transactions(seed, start, 36, &demand::default_profiles())?;
            info!(seed, rows = txs.len(), "generated synthetic transactions");
            Ok(txs)
        }
        (None, None) => Err("either --input or --synthetic is required".into()),
    }
}
