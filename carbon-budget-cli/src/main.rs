//! Country carbon budget reporter
//!
//! Prints the carbon budget summary for a country and a global budget.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p carbon-budget-cli -- \
//!   --data data.csv \
//!   --country Belgium \
//!   --budget 580
//! ```
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=debug`).

use carbon_budget_core::reporter::BudgetReport;
use carbon_budget_core::{BudgetCalculator, BudgetResult, FloatValue, GlobalParameters, YearValue};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Country carbon budget calculator
#[derive(Parser, Debug)]
#[command(name = "carbon-budget")]
#[command(about = "Estimate the remaining carbon budget of a country on an equal per capita basis")]
struct Args {
    /// CSV file with per-country emissions
    #[arg(short, long)]
    data: PathBuf,

    /// TOML file overriding the global parameters
    #[arg(short = 'p', long)]
    config: Option<PathBuf>,

    /// Country to report on (defaults to the configured default country)
    #[arg(short, long)]
    country: Option<String>,

    /// Global carbon budget from 2018 in Gt CO2 (defaults to the configured default budget)
    #[arg(short, long)]
    budget: Option<FloatValue>,

    /// List the available countries and exit
    #[arg(long)]
    list: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Include the historical and projected yearly series in the text output
    #[arg(long)]
    series: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Carbon budget calculation failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> BudgetResult<()> {
    let parameters = match &args.config {
        Some(path) => GlobalParameters::from_toml_file(path)?,
        None => GlobalParameters::default(),
    };
    let calculator = BudgetCalculator::from_path(&args.data, parameters)?;

    if args.list {
        for country in calculator.list_countries() {
            println!("{country}");
        }
        return Ok(());
    }

    let country = match (&args.country, calculator.default_country()) {
        (Some(country), _) => country.clone(),
        (None, Some(country)) => country.to_string(),
        (None, None) => {
            println!("The emissions table is empty.");
            return Ok(());
        }
    };
    let budget = args
        .budget
        .unwrap_or(calculator.parameters().default_global_budget);
    let report = calculator.compute(&country, budget)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .expect("reports only contain finite numbers and strings");
        println!("{json}");
        return Ok(());
    }

    for message in report.messages() {
        println!("{message}");
    }
    if args.series {
        print_series(
            "Historical emissions (Mton CO2)",
            &calculator.historical_series(&country)?,
        );
        print_projection(&report);
    }
    Ok(())
}

fn print_projection(report: &BudgetReport) {
    if let Some(estimate) = report.estimate() {
        print_series("Future emissions (Mton CO2)", &estimate.future_series);
        if let Some(personal) = &estimate.future_series_personal {
            print_series("Future emissions per person (t CO2)", personal);
        }
    }
}

fn print_series(title: &str, series: &[YearValue]) {
    println!();
    println!("{title}");
    for (year, value) in series {
        println!("{year}\t{value:.3}");
    }
}
