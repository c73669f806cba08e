//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the requested analysis pipeline
//! - prints tables, comparisons, and rankings
//! - writes CSV exports

use std::path::Path;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{
    AirArgs, AllArgs, Command, EsgArgs, MobilityArgs, PricesArgs, SectorArgs, TransportArgs,
};
use crate::domain::Value;
use crate::error::AppError;
use crate::table::Table;

pub mod pipeline;

const PREVIEW_ROWS: usize = 10;

/// Entry point for the `habits` binary.
pub fn run() -> Result<(), AppError> {
    crate::logging::init();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Air(args) => handle_air(args),
        Command::Transport(args) => handle_transport(args),
        Command::Mobility(args) => handle_mobility(args),
        Command::Sectors(args) => handle_sectors(args),
        Command::Esg(args) => handle_esg(args),
        Command::Prices(args) => handle_prices(args),
        Command::All(args) => handle_all(args),
    }
}

fn handle_air(args: AirArgs) -> Result<(), AppError> {
    let out = pipeline::run_air(&args)?;

    println!(
        "{}",
        crate::report::format_table(&out.monthly.to_table()?, PREVIEW_ROWS)
    );
    println!(
        "{}",
        crate::report::format_comparison(&out.comparison, "Air quality and stringency by month")
    );
    println!("{}", crate::report::format_rankings(&out.rankings, "monthly mean"));

    ensure_out_dir(&args.out_dir)?;
    crate::io::export::write_table_csv(&args.out_dir.join("air_cleaned.csv"), &out.cleaned)?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("air_monthly_means.csv"),
        &out.monthly.to_table()?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("air_comparison.csv"),
        &out.comparison.to_table()?,
    )?;

    info!(family = "air", "complete");
    Ok(())
}

fn handle_transport(args: TransportArgs) -> Result<(), AppError> {
    let out = pipeline::run_transport(&args)?;

    println!(
        "{}",
        crate::report::format_table(&out.monthly.to_table()?, PREVIEW_ROWS)
    );
    println!(
        "{}",
        crate::report::format_comparison(&out.comparison, "Transport use by month")
    );
    println!("{}", crate::report::format_rankings(&out.rankings, "monthly usage"));

    ensure_out_dir(&args.out_dir)?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("transport_cleaned.csv"),
        &out.cleaned,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("transport_monthly_means.csv"),
        &out.monthly.to_table()?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("transport_comparison.csv"),
        &out.comparison.to_table()?,
    )?;

    info!(family = "transport", "complete");
    Ok(())
}

fn handle_mobility(args: MobilityArgs) -> Result<(), AppError> {
    let out = pipeline::run_mobility(&args)?;

    println!(
        "{}",
        crate::report::format_table(&out.spring.to_table()?, PREVIEW_ROWS)
    );
    println!(
        "{}",
        crate::report::format_table(&out.late_summer.to_table()?, PREVIEW_ROWS)
    );
    println!(
        "{}",
        crate::report::format_comparison(&out.comparison, "Regional mobility by window")
    );
    println!("{}", crate::report::format_rankings(&out.rankings, &args.metric));

    ensure_out_dir(&args.out_dir)?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("mobility_cleaned.csv"),
        &out.cleaned,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("mobility_spring.csv"),
        &out.spring.to_table()?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("mobility_late_summer.csv"),
        &out.late_summer.to_table()?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("mobility_comparison.csv"),
        &out.comparison.to_table()?,
    )?;

    info!(family = "mobility", "complete");
    Ok(())
}

fn handle_sectors(args: SectorArgs) -> Result<(), AppError> {
    let out = pipeline::run_sectors(&args)?;

    println!(
        "{}",
        crate::report::format_comparison(&out.industry_comparison, "Share prices by industry")
    );
    println!(
        "{}",
        crate::report::format_rankings(&out.industry_rankings, "industry price")
    );
    if let Some(day) = &out.day_comparison {
        println!(
            "{}",
            crate::report::format_comparison(day, "Share prices, single-day pair")
        );
    }
    if let Some(rankings) = &out.day_industry_rankings {
        println!(
            "{}",
            crate::report::format_column_rankings(rankings, "single-day price change pct")
        );
    }

    ensure_out_dir(&args.out_dir)?;
    crate::io::export::write_table_csv(&args.out_dir.join("sectors_joined.csv"), &out.joined)?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("sectors_ticker_comparison.csv"),
        &out.ticker_comparison.to_table()?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("sectors_industry_comparison.csv"),
        &out.industry_comparison.to_table()?,
    )?;
    if let Some(day) = &out.day_comparison {
        crate::io::export::write_table_csv(
            &args.out_dir.join("sectors_day_comparison.csv"),
            &day.to_table()?,
        )?;
    }
    if let Some(industry) = &out.day_industry {
        crate::io::export::write_table_csv(
            &args.out_dir.join("sectors_day_industry.csv"),
            &industry.to_table()?,
        )?;
    }

    info!(family = "sectors", "complete");
    Ok(())
}

fn handle_esg(args: EsgArgs) -> Result<(), AppError> {
    let out = pipeline::run_esg(&args)?;

    println!(
        "{}",
        crate::report::format_table(&out.industry_scores.to_table()?, PREVIEW_ROWS)
    );
    println!(
        "{}",
        crate::report::format_column_rankings(&out.panels, "ESG risk score")
    );
    for summary in [&out.top_summary, &out.bottom_summary] {
        println!(
            "{}: mean ESG score {}, mean price change {}",
            summary.label,
            fmt_mean(summary.mean_score),
            summary
                .mean_change
                .map(|v| format!("{v:+.2}%"))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    ensure_out_dir(&args.out_dir)?;
    crate::io::export::write_table_csv(&args.out_dir.join("esg_joined.csv"), &out.joined)?;
    crate::io::export::write_table_csv(
        &args.out_dir.join("esg_industry_scores.csv"),
        &out.industry_scores.to_table()?,
    )?;

    let mut panels = Table::new(vec![
        "Panel".to_string(),
        "Mean ESG Score".to_string(),
        "Mean Price Change Pct".to_string(),
    ])?;
    for summary in [&out.top_summary, &out.bottom_summary] {
        panels.push_row(vec![
            Value::Text(summary.label.clone()),
            summary.mean_score.map(Value::Number).unwrap_or(Value::Missing),
            summary.mean_change.map(Value::Number).unwrap_or(Value::Missing),
        ])?;
    }
    crate::io::export::write_table_csv(&args.out_dir.join("esg_panels.csv"), &panels)?;

    info!(family = "esg", "complete");
    Ok(())
}

fn handle_prices(args: PricesArgs) -> Result<(), AppError> {
    let out = pipeline::run_prices(&args)?;

    println!(
        "{}",
        crate::report::format_summary_stats(&out.stats, &format!("{} Close", args.symbol))
    );
    println!("{}", crate::report::format_table(&out.series, PREVIEW_ROWS));
    println!(
        "Train: {} rows, holdout: {} rows",
        out.train.len(),
        out.holdout.len()
    );
    if let Some(rmse) = out.rmse {
        println!("Holdout RMSE vs predictions: {rmse:.4}");
    }

    ensure_out_dir(&args.out_dir)?;
    let stem = args.symbol.trim().to_ascii_lowercase();
    crate::io::export::write_table_csv(
        &args.out_dir.join(format!("prices_{stem}.csv")),
        &out.series,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join(format!("prices_{stem}_train.csv")),
        &crate::stats::series_to_table(&out.train, "Date", "Close")?,
    )?;
    crate::io::export::write_table_csv(
        &args.out_dir.join(format!("prices_{stem}_holdout.csv")),
        &crate::stats::series_to_table(&out.holdout, "Date", "Close")?,
    )?;
    crate::io::summary::write_summary_json(
        &args.out_dir.join(format!("prices_{stem}_summary.json")),
        &args.symbol,
        &out.series,
        &out.stats,
        out.rmse,
    )?;

    info!(family = "prices", "complete");
    Ok(())
}

/// Run every file-based family in sequence. One family failing does not
/// stop the rest; the first failure becomes the process exit.
fn handle_all(args: AllArgs) -> Result<(), AppError> {
    let mut first_failure: Option<AppError> = None;

    let mut air = default_args::<AirArgs>("air")?;
    air.data_dir = args.data_dir.clone();
    air.out_dir = args.out_dir.clone();
    if let Err(err) = handle_air(air) {
        warn!(family = "air", %err, "family failed");
        first_failure.get_or_insert(err);
    }

    let mut transport = default_args::<TransportArgs>("transport")?;
    transport.data_dir = args.data_dir.clone();
    transport.out_dir = args.out_dir.clone();
    if let Err(err) = handle_transport(transport) {
        warn!(family = "transport", %err, "family failed");
        first_failure.get_or_insert(err);
    }

    let mut mobility = default_args::<MobilityArgs>("mobility")?;
    mobility.data_dir = args.data_dir.clone();
    mobility.out_dir = args.out_dir.clone();
    if let Err(err) = handle_mobility(mobility) {
        warn!(family = "mobility", %err, "family failed");
        first_failure.get_or_insert(err);
    }

    let mut sectors = default_args::<SectorArgs>("sectors")?;
    sectors.data_dir = args.data_dir.clone();
    sectors.out_dir = args.out_dir.clone();
    if let Err(err) = handle_sectors(sectors) {
        warn!(family = "sectors", %err, "family failed");
        first_failure.get_or_insert(err);
    }

    let mut esg = default_args::<EsgArgs>("esg")?;
    esg.data_dir = args.data_dir.clone();
    esg.out_dir = args.out_dir.clone();
    if let Err(err) = handle_esg(esg) {
        warn!(family = "esg", %err, "family failed");
        first_failure.get_or_insert(err);
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Parse a family's argument struct with no flags, yielding its defaults.
fn default_args<T: Parser>(family: &str) -> Result<T, AppError> {
    T::try_parse_from(["habits"]).map_err(|e| AppError::Arg {
        name: family.to_string(),
        detail: e.to_string(),
    })
}

fn ensure_out_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| AppError::Export {
        path: dir.display().to_string(),
        detail: e.to_string(),
    })
}

fn fmt_mean(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}
