//! Command-line parsing for the habit-shift pipelines.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the table/statistics code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "habits", version, about = "Lockdown habit-shift analysis pipelines")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands, one per analysis family.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare city NO2 levels and the stringency index across two months.
    Air(AirArgs),
    /// Compare transport mode usage shifts across two months.
    Transport(TransportArgs),
    /// Compare regional mobility between two date windows.
    Mobility(MobilityArgs),
    /// Compare sector share prices across windows and join industries.
    Sectors(SectorArgs),
    /// Relate sector price changes to ESG risk scores.
    Esg(EsgArgs),
    /// Fetch one symbol's prices, summarize, and evaluate a holdout.
    Prices(PricesArgs),
    /// Run every file-based family in sequence.
    All(AllArgs),
}

/// Options for the air-quality family.
#[derive(Debug, Parser, Clone)]
pub struct AirArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Baseline month (YYYY-MM).
    #[arg(long, default_value = "2020-02")]
    pub baseline_month: String,

    /// Comparison month (YYYY-MM).
    #[arg(long, default_value = "2020-04")]
    pub comparison_month: String,

    /// Show top-N risers and fallers.
    #[arg(long, default_value_t = 3)]
    pub top: usize,
}

/// Options for the transport-use family.
#[derive(Debug, Parser, Clone)]
pub struct TransportArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Baseline month (YYYY-MM).
    #[arg(long, default_value = "2020-04")]
    pub baseline_month: String,

    /// Comparison month (YYYY-MM).
    #[arg(long, default_value = "2020-08")]
    pub comparison_month: String,

    /// Show top-N risers and fallers.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Options for the regional-mobility family.
#[derive(Debug, Parser, Clone)]
pub struct MobilityArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// First day of the spring window.
    #[arg(long, default_value = "2020-03-23")]
    pub spring_start: String,

    /// Last day of the spring window.
    #[arg(long, default_value = "2020-04-05")]
    pub spring_end: String,

    /// First day of the late-summer window.
    #[arg(long, default_value = "2020-08-24")]
    pub summer_start: String,

    /// Last day of the late-summer window.
    #[arg(long, default_value = "2020-09-06")]
    pub summer_end: String,

    /// Mobility category to rank regions by.
    #[arg(long, default_value = "Workplaces")]
    pub metric: String,

    /// Show top-N risers and fallers.
    #[arg(long, default_value_t = 3)]
    pub top: usize,
}

/// Options for the sector-prices family.
#[derive(Debug, Parser, Clone)]
pub struct SectorArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// First day of the baseline window.
    #[arg(long, default_value = "2019-04-01")]
    pub baseline_start: String,

    /// Last day of the baseline window.
    #[arg(long, default_value = "2019-06-30")]
    pub baseline_end: String,

    /// First day of the comparison window.
    #[arg(long, default_value = "2020-04-01")]
    pub comparison_start: String,

    /// Last day of the comparison window.
    #[arg(long, default_value = "2020-06-30")]
    pub comparison_end: String,

    /// Single baseline day for the day-pair comparison.
    #[arg(long, default_value = "2020-01-02")]
    pub day_baseline: String,

    /// Single comparison day for the day-pair comparison.
    #[arg(long, default_value = "2020-08-03")]
    pub day_comparison: String,

    /// Show top-N risers and fallers.
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Options for the ESG family.
#[derive(Debug, Parser, Clone)]
pub struct EsgArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// First day of the baseline window.
    #[arg(long, default_value = "2019-04-01")]
    pub baseline_start: String,

    /// Last day of the baseline window.
    #[arg(long, default_value = "2019-06-30")]
    pub baseline_end: String,

    /// First day of the comparison window.
    #[arg(long, default_value = "2020-04-01")]
    pub comparison_start: String,

    /// Last day of the comparison window.
    #[arg(long, default_value = "2020-06-30")]
    pub comparison_end: String,

    /// Tickers per high/low ESG panel.
    #[arg(long, default_value_t = 5)]
    pub panel_size: usize,
}

/// Options for the remote price-history family.
#[derive(Debug, Parser, Clone)]
pub struct PricesArgs {
    /// Ticker symbol to fetch.
    #[arg(short = 's', long)]
    pub symbol: String,

    /// First day of the range.
    #[arg(long, default_value = "2020-01-01")]
    pub start: String,

    /// Last day of the range.
    #[arg(long, default_value = "2020-08-01")]
    pub end: String,

    /// Moving-average windows in days.
    #[arg(long = "ma", value_delimiter = ',', default_values_t = [10usize, 20, 50])]
    pub ma_windows: Vec<usize>,

    /// Leading fraction of the series kept for training.
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Optional CSV of predicted closes to score against the holdout.
    #[arg(long)]
    pub predictions: Option<PathBuf>,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
}

/// Options for running every file-based family.
#[derive(Debug, Parser, Clone)]
pub struct AllArgs {
    /// Directory holding the input CSVs.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory for exported CSVs.
    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,
}
