//! Shared pipeline logic behind the CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> normalize -> join/filter -> aggregate -> compare -> rank
//!
//! The CLI handlers can then focus on presentation (printing and exports).

use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;

use crate::cli::{AirArgs, EsgArgs, MobilityArgs, PricesArgs, SectorArgs, TransportArgs};
use crate::data::families::{
    AIR_READING_COLUMN, AIR_SITES, AVG_TRANSIT_COLUMN, BASELINE_MEAN_COLUMN,
    COMPARISON_MEAN_COLUMN, DATE_COLUMN, ESG_FILE, ESG_RENAMES, ESG_SCORE_COLUMN,
    INDUSTRY_COLUMN, MOBILITY_CATEGORIES, MOBILITY_DATE_RAW, MOBILITY_FILE, MOBILITY_REGIONS,
    MOBILITY_RENAMES, MONTH_COLUMN, PREDICTED_COLUMN, PRICE_COLUMNS, REGION_COLUMN,
    SECTOR_LIST_FILE, SECTOR_PRICES_FILE, SECTOR_RENAMES, STRINGENCY_COLUMN, STRINGENCY_FILE,
    STRINGENCY_RENAMES, TICKER_COLUMN, TRANSIT_MODES, TRANSPORT_DATE_RAW, TRANSPORT_FILE,
    TRANSPORT_MODES, TRANSPORT_RENAMES,
};
use crate::data::StooqClient;
use crate::domain::{DateWindow, number_values};
use crate::error::AppError;
use crate::io::{load_dated_table, load_table};
use crate::stats::{SummaryStats, describe, holdout_split, prepare_series, rmse, rolling_mean};
use crate::table::{
    ColumnRankings, Comparison, GroupAggregate, Rankings, Table, compare_aggregates,
    compare_columns, compare_rows, group_mean, inner_join, mean_ignoring_missing, normalize,
    parse_date, rank_changes, rank_groups, row_mean,
};

/// All computed outputs of one air-quality run.
#[derive(Debug, Clone)]
pub struct AirOutput {
    pub cleaned: Table,
    pub monthly: GroupAggregate,
    pub comparison: Comparison,
    pub rankings: Rankings,
}

/// All computed outputs of one transport-use run.
#[derive(Debug, Clone)]
pub struct TransportOutput {
    pub cleaned: Table,
    pub monthly: GroupAggregate,
    pub comparison: Comparison,
    pub rankings: Rankings,
}

/// All computed outputs of one regional-mobility run.
#[derive(Debug, Clone)]
pub struct MobilityOutput {
    pub cleaned: Table,
    pub spring: GroupAggregate,
    pub late_summer: GroupAggregate,
    pub comparison: Comparison,
    pub rankings: Rankings,
}

/// All computed outputs of one sector-prices run.
#[derive(Debug, Clone)]
pub struct SectorsOutput {
    pub joined: Table,
    pub ticker_comparison: Comparison,
    pub industry_comparison: Comparison,
    pub industry_rankings: Rankings,
    /// Absent when the requested single days are not columns of the file.
    pub day_comparison: Option<Comparison>,
    /// Industry means of the day-pair percentage changes, ranked both ways.
    pub day_industry: Option<GroupAggregate>,
    pub day_industry_rankings: Option<ColumnRankings>,
}

/// Mean score and mean price change over one ESG panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSummary {
    pub label: String,
    pub mean_score: Option<f64>,
    pub mean_change: Option<f64>,
}

/// All computed outputs of one ESG run.
#[derive(Debug, Clone)]
pub struct EsgOutput {
    pub joined: Table,
    pub industry_scores: GroupAggregate,
    pub panels: ColumnRankings,
    pub top_summary: PanelSummary,
    pub bottom_summary: PanelSummary,
}

/// All computed outputs of one price-history run.
#[derive(Debug, Clone)]
pub struct PricesOutput {
    pub series: Table,
    pub stats: SummaryStats,
    pub train: Vec<(NaiveDate, f64)>,
    pub holdout: Vec<(NaiveDate, f64)>,
    pub rmse: Option<f64>,
}

/// Execute the full air-quality pipeline.
pub fn run_air(args: &AirArgs) -> Result<AirOutput, AppError> {
    let baseline = parse_month_arg("--baseline-month", &args.baseline_month)?;
    let comparison_month = parse_month_arg("--comparison-month", &args.comparison_month)?;

    // 1) Load each monitoring site and join them on the reading date.
    let mut joined: Option<Table> = None;
    for (stem, city) in AIR_SITES {
        let path = args.data_dir.join(format!("{stem}.csv"));
        let site = load_dated_table(&path, DATE_COLUMN)?;
        let site = normalize(&site, &[(AIR_READING_COLUMN, city)], &[city])?;
        let site = site.select(&[DATE_COLUMN, city])?;
        joined = Some(match joined {
            None => site,
            Some(acc) => inner_join(&acc, &site, DATE_COLUMN)?,
        });
    }
    let joined = joined
        .ok_or_else(|| AppError::Series("no monitoring sites configured".to_string()))?;

    // 2) Join the stringency index on the same dates.
    let stringency = load_dated_table(&args.data_dir.join(STRINGENCY_FILE), DATE_COLUMN)?;
    let stringency = normalize(&stringency, &STRINGENCY_RENAMES, &[STRINGENCY_COLUMN])?;
    let stringency = stringency.select(&[DATE_COLUMN, STRINGENCY_COLUMN])?;
    let cleaned = inner_join(&joined, &stringency, DATE_COLUMN)?;

    // 3) Aggregate every series to monthly means.
    let mut series: Vec<&str> = AIR_SITES.iter().map(|(_, city)| *city).collect();
    series.push(STRINGENCY_COLUMN);
    let monthly = group_mean(
        &cleaned.with_month_column(DATE_COLUMN, MONTH_COLUMN)?,
        MONTH_COLUMN,
        &series,
    )?;

    // 4) Compare the two months and rank the steepest-moving cities.
    //    The stringency index stays in the comparison, not the rankings.
    let comparison = compare_rows(&monthly, &baseline, &comparison_month, "series")?;
    let rankings = rank_changes(&comparison.excluding(STRINGENCY_COLUMN), args.top);

    Ok(AirOutput {
        cleaned,
        monthly,
        comparison,
        rankings,
    })
}

/// Execute the full transport-use pipeline.
pub fn run_transport(args: &TransportArgs) -> Result<TransportOutput, AppError> {
    let baseline = parse_month_arg("--baseline-month", &args.baseline_month)?;
    let comparison_month = parse_month_arg("--comparison-month", &args.comparison_month)?;

    // 1) Load the usage table; its date column carries a footnoted header.
    let raw = load_dated_table(&args.data_dir.join(TRANSPORT_FILE), TRANSPORT_DATE_RAW)?;
    let cleaned = normalize(&raw, &TRANSPORT_RENAMES, &TRANSPORT_MODES)?;

    // 2) Recenter: the published figures are percent of a pre-pandemic
    //    baseline, so 100 becomes 0 and every reading a signed shift.
    let shifted = cleaned.offset_columns(&TRANSPORT_MODES, -100.0)?;

    // 3) Average the public-transit modes into one extra series.
    let transit = row_mean(&shifted, &TRANSIT_MODES)?;
    let cleaned = shifted.with_column(AVG_TRANSIT_COLUMN, number_values(transit))?;

    // 4) Aggregate to monthly means, compare the two months, rank.
    let mut series: Vec<&str> = TRANSPORT_MODES.to_vec();
    series.push(AVG_TRANSIT_COLUMN);
    let monthly = group_mean(
        &cleaned.with_month_column(DATE_COLUMN, MONTH_COLUMN)?,
        MONTH_COLUMN,
        &series,
    )?;
    let comparison = compare_rows(&monthly, &baseline, &comparison_month, "mode")?;
    let rankings = rank_changes(&comparison, args.top);

    Ok(TransportOutput {
        cleaned,
        monthly,
        comparison,
        rankings,
    })
}

/// Execute the full regional-mobility pipeline.
pub fn run_mobility(args: &MobilityArgs) -> Result<MobilityOutput, AppError> {
    let spring = window_from_args(
        "--spring-start",
        &args.spring_start,
        "--spring-end",
        &args.spring_end,
    )?;
    let summer = window_from_args(
        "--summer-start",
        &args.summer_start,
        "--summer-end",
        &args.summer_end,
    )?;

    // 1) Load, rename, and clean the regional report.
    let raw = load_dated_table(&args.data_dir.join(MOBILITY_FILE), MOBILITY_DATE_RAW)?;
    let renamed = normalize(&raw, &MOBILITY_RENAMES, &MOBILITY_CATEGORIES)?;

    // 2) Keep only the tracked regions.
    let cleaned = renamed.filter_text_in(REGION_COLUMN, &MOBILITY_REGIONS)?;

    // 3) Mean mobility per region inside each window.
    let spring_agg = group_mean(
        &cleaned.filter_date_window(DATE_COLUMN, spring)?,
        REGION_COLUMN,
        &MOBILITY_CATEGORIES,
    )?;
    let late_summer = group_mean(
        &cleaned.filter_date_window(DATE_COLUMN, summer)?,
        REGION_COLUMN,
        &MOBILITY_CATEGORIES,
    )?;

    // 4) Compare the chosen category between windows and rank regions.
    let comparison = compare_aggregates(&spring_agg, &late_summer, &args.metric)?;
    let rankings = rank_changes(&comparison, args.top);

    Ok(MobilityOutput {
        cleaned,
        spring: spring_agg,
        late_summer,
        comparison,
        rankings,
    })
}

/// Execute the full sector-prices pipeline.
pub fn run_sectors(args: &SectorArgs) -> Result<SectorsOutput, AppError> {
    let baseline = window_from_args(
        "--baseline-start",
        &args.baseline_start,
        "--baseline-end",
        &args.baseline_end,
    )?;
    let comparison_window = window_from_args(
        "--comparison-start",
        &args.comparison_start,
        "--comparison-end",
        &args.comparison_end,
    )?;
    let day_baseline = parse_date_arg("--day-baseline", &args.day_baseline)?;
    let day_comparison_date = parse_date_arg("--day-comparison", &args.day_comparison)?;

    let (joined, ticker_comparison) =
        sector_window_table(&args.data_dir, baseline, comparison_window)?;

    // Industry-level view of the same window means.
    let industry_agg = group_mean(
        &joined,
        INDUSTRY_COLUMN,
        &[BASELINE_MEAN_COLUMN, COMPARISON_MEAN_COLUMN],
    )?;
    let industry_comparison = compare_columns(
        &industry_agg,
        BASELINE_MEAN_COLUMN,
        COMPARISON_MEAN_COLUMN,
        "price",
    )?;
    let industry_rankings = rank_changes(&industry_comparison, args.top);

    // Single-day pair, only when both days are columns of the file.
    let (day_comparison, day_industry, day_industry_rankings) = match (
        day_column(&joined, day_baseline),
        day_column(&joined, day_comparison_date),
    ) {
        (Some(b), Some(c)) => {
            let day_agg = group_mean(&joined, TICKER_COLUMN, &[b.as_str(), c.as_str()])?;
            let day_comparison = compare_columns(&day_agg, &b, &c, "day price")?;

            // Roll the per-ticker day changes up to industries and rank.
            let changes = day_comparison.to_table()?;
            let industries = joined.select(&[TICKER_COLUMN, INDUSTRY_COLUMN])?;
            let with_industry = inner_join(&changes, &industries, TICKER_COLUMN)?;
            let day_industry = group_mean(&with_industry, INDUSTRY_COLUMN, &["pct_change"])?;
            let day_rankings = rank_groups(&day_industry, "pct_change", args.top)?;

            (Some(day_comparison), Some(day_industry), Some(day_rankings))
        }
        _ => {
            warn!(
                baseline = %day_baseline,
                comparison = %day_comparison_date,
                "day pair not present in price columns, skipping"
            );
            (None, None, None)
        }
    };

    Ok(SectorsOutput {
        joined,
        ticker_comparison,
        industry_comparison,
        industry_rankings,
        day_comparison,
        day_industry,
        day_industry_rankings,
    })
}

/// Execute the full ESG pipeline.
pub fn run_esg(args: &EsgArgs) -> Result<EsgOutput, AppError> {
    let baseline = window_from_args(
        "--baseline-start",
        &args.baseline_start,
        "--baseline-end",
        &args.baseline_end,
    )?;
    let comparison_window = window_from_args(
        "--comparison-start",
        &args.comparison_start,
        "--comparison-end",
        &args.comparison_end,
    )?;

    // 1) Reuse the sector window means and their per-ticker changes.
    let (sectors, ticker_comparison) =
        sector_window_table(&args.data_dir, baseline, comparison_window)?;

    // 2) Attach industries and ESG scores to the per-ticker changes.
    let changes = ticker_comparison.to_table()?;
    let industries = sectors.select(&[TICKER_COLUMN, INDUSTRY_COLUMN])?;
    let with_industry = inner_join(&changes, &industries, TICKER_COLUMN)?;

    let esg = load_table(&args.data_dir.join(ESG_FILE))?;
    let esg = normalize(&esg, &ESG_RENAMES, &[ESG_SCORE_COLUMN])?;
    let joined = inner_join(&with_industry, &esg, TICKER_COLUMN)?;

    // 3) Mean score per industry, then per-ticker panels at both ends.
    let industry_scores = group_mean(&joined, INDUSTRY_COLUMN, &[ESG_SCORE_COLUMN])?;
    let ticker_agg = group_mean(&joined, TICKER_COLUMN, &[ESG_SCORE_COLUMN, "pct_change"])?;
    let panels = rank_groups(&ticker_agg, ESG_SCORE_COLUMN, args.panel_size)?;

    let top_summary = panel_summary("Highest ESG risk", &panels.top, &ticker_agg);
    let bottom_summary = panel_summary("Lowest ESG risk", &panels.bottom, &ticker_agg);

    Ok(EsgOutput {
        joined,
        industry_scores,
        panels,
        top_summary,
        bottom_summary,
    })
}

/// Fetch a symbol's history and run the price pipeline on it.
pub fn run_prices(args: &PricesArgs) -> Result<PricesOutput, AppError> {
    let start = parse_date_arg("--start", &args.start)?;
    let end = parse_date_arg("--end", &args.end)?;
    if end < start {
        return Err(AppError::Arg {
            name: "--end".to_string(),
            detail: format!("end {end} precedes start {start}"),
        });
    }

    let client = StooqClient::from_env();
    let table = client.fetch_daily(&args.symbol, start, end)?;
    run_prices_with_table(args, table)
}

/// Run the price pipeline on a pre-fetched table.
///
/// This keeps the full pipeline testable without touching the network.
pub fn run_prices_with_table(args: &PricesArgs, table: Table) -> Result<PricesOutput, AppError> {
    // 1) Validate knobs up front for clearer errors.
    for &window in &args.ma_windows {
        if window == 0 {
            return Err(AppError::Arg {
                name: "--ma".to_string(),
                detail: "window must be at least 1 day".to_string(),
            });
        }
    }
    if !(args.train_fraction > 0.0 && args.train_fraction < 1.0) {
        return Err(AppError::Arg {
            name: "--train-fraction".to_string(),
            detail: format!("{} is not inside (0, 1)", args.train_fraction),
        });
    }
    let mut windows = args.ma_windows.clone();
    windows.sort_unstable();
    windows.dedup();

    // 2) Sort and clean whichever price columns the source provided.
    let table = table.sort_by_date(DATE_COLUMN)?;
    let present: Vec<&str> = PRICE_COLUMNS
        .iter()
        .copied()
        .filter(|c| table.has_column(c))
        .collect();
    let mut table = normalize(&table, &[], &present)?;

    // 3) Summarize the close and annotate moving averages.
    let closes = table.numbers("Close")?;
    let stats = describe(&closes)
        .ok_or_else(|| AppError::Series("no defined Close observations".to_string()))?;
    for window in windows {
        let ma = rolling_mean(&closes, window);
        table = table.with_column(&format!("Close MA{window}"), number_values(ma))?;
    }

    // 4) Split the close series into train and holdout halves.
    let series = prepare_series(&table, DATE_COLUMN, "Close")?;
    let split = holdout_split(series.len(), args.train_fraction);
    let (train, holdout) = series.split_at(split);
    let train = train.to_vec();
    let holdout = holdout.to_vec();

    // 5) Score supplied predictions against the holdout, date-aligned.
    let rmse_value = match &args.predictions {
        Some(path) => {
            let predicted = load_dated_table(path, DATE_COLUMN)?;
            let predicted = normalize(&predicted, &[], &[PREDICTED_COLUMN])?;
            let predicted = prepare_series(&predicted, DATE_COLUMN, PREDICTED_COLUMN)?;
            let score = rmse(&holdout, &predicted);
            if score.is_none() {
                warn!("predictions share no dates with the holdout window");
            }
            score
        }
        None => None,
    };

    Ok(PricesOutput {
        series: table,
        stats,
        train,
        holdout,
        rmse: rmse_value,
    })
}

/// Load the wide price table and the industry list, join them on ticker,
/// and annotate per-window mean columns plus the per-ticker comparison.
fn sector_window_table(
    data_dir: &Path,
    baseline: DateWindow,
    comparison: DateWindow,
) -> Result<(Table, Comparison), AppError> {
    // Prices arrive wide: one row per ticker, one column per trading day.
    let prices = load_table(&data_dir.join(SECTOR_PRICES_FILE))?;
    let date_columns = prices.date_columns();
    let date_refs: Vec<&str> = date_columns.iter().map(String::as_str).collect();
    let prices = normalize(&prices, &SECTOR_RENAMES, &date_refs)?;

    let industries = load_table(&data_dir.join(SECTOR_LIST_FILE))?;
    let industries = normalize(&industries, &SECTOR_RENAMES, &[])?;

    let mut joined = inner_join(&prices, &industries, TICKER_COLUMN)?;

    for (window, name) in [
        (baseline, BASELINE_MEAN_COLUMN),
        (comparison, COMPARISON_MEAN_COLUMN),
    ] {
        let in_window = joined.columns_in_window(window);
        if in_window.is_empty() {
            return Err(AppError::Series(format!(
                "no price columns inside {}",
                window.label()
            )));
        }
        let refs: Vec<&str> = in_window.iter().map(String::as_str).collect();
        let means = row_mean(&joined, &refs)?;
        joined = joined.with_column(name, number_values(means))?;
    }

    let ticker_agg = group_mean(
        &joined,
        TICKER_COLUMN,
        &[BASELINE_MEAN_COLUMN, COMPARISON_MEAN_COLUMN],
    )?;
    let ticker_comparison = compare_columns(
        &ticker_agg,
        BASELINE_MEAN_COLUMN,
        COMPARISON_MEAN_COLUMN,
        "price",
    )?;

    Ok((joined, ticker_comparison))
}

/// Find the column whose header names the given day, whatever its format.
fn day_column(table: &Table, day: NaiveDate) -> Option<String> {
    table
        .columns()
        .iter()
        .find(|c| parse_date(c).ok() == Some(day))
        .cloned()
}

fn panel_summary(label: &str, panel: &[(String, f64)], agg: &GroupAggregate) -> PanelSummary {
    let scores: Vec<Option<f64>> = panel.iter().map(|(_, score)| Some(*score)).collect();
    let changes: Vec<Option<f64>> = panel
        .iter()
        .map(|(ticker, _)| agg.value(ticker, "pct_change"))
        .collect();
    PanelSummary {
        label: label.to_string(),
        mean_score: mean_ignoring_missing(&scores),
        mean_change: mean_ignoring_missing(&changes),
    }
}

fn parse_date_arg(flag: &str, raw: &str) -> Result<NaiveDate, AppError> {
    parse_date(raw).map_err(|detail| AppError::Arg {
        name: flag.to_string(),
        detail,
    })
}

/// Validate a `YYYY-MM` month argument without altering it.
fn parse_month_arg(flag: &str, raw: &str) -> Result<String, AppError> {
    parse_date(&format!("{raw}-01")).map_err(|_| AppError::Arg {
        name: flag.to_string(),
        detail: format!("invalid month '{raw}' (expected YYYY-MM)"),
    })?;
    Ok(raw.to_string())
}

fn window_from_args(
    start_flag: &str,
    start_raw: &str,
    end_flag: &str,
    end_raw: &str,
) -> Result<DateWindow, AppError> {
    let start = parse_date_arg(start_flag, start_raw)?;
    let end = parse_date_arg(end_flag, end_raw)?;
    if end < start {
        return Err(AppError::Arg {
            name: end_flag.to_string(),
            detail: format!("window end {end} precedes start {start}"),
        });
    }
    Ok(DateWindow::new(start, end))
}
