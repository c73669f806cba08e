//! Read/write price-run summary JSON files.
//!
//! The summary is the portable record of one `prices` run: the symbol, the
//! date range actually covered, the Close summary statistics, and the
//! holdout RMSE. The schema is defined by `RunSummary`.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::families::DATE_COLUMN;
use crate::error::AppError;
use crate::stats::SummaryStats;
use crate::table::Table;

/// A saved price-run summary (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub close: SummaryStats,
    pub holdout_rmse: Option<f64>,
}

/// Write a run summary JSON file. The date range is taken from the series
/// itself, not from the requested window.
pub fn write_summary_json(
    path: &Path,
    symbol: &str,
    series: &Table,
    close: &SummaryStats,
    holdout_rmse: Option<f64>,
) -> Result<(), AppError> {
    let dates: Vec<NaiveDate> = series.dates(DATE_COLUMN)?.into_iter().flatten().collect();
    let (Some(&start), Some(&end)) = (dates.first(), dates.last()) else {
        return Err(AppError::Series(
            "cannot summarize a series with no dated rows".to_string(),
        ));
    };

    let summary = RunSummary {
        tool: "habits".to_string(),
        symbol: symbol.to_string(),
        start,
        end,
        close: close.clone(),
        holdout_rmse,
    };

    let file = File::create(path).map_err(|e| AppError::Export {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    serde_json::to_writer_pretty(file, &summary).map_err(|e| AppError::Export {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    Ok(())
}

/// Read a run summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path).map_err(|e| AppError::Load {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::Load {
        path: path.display().to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;
    use crate::stats::describe;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> Table {
        Table::with_rows(
            vec!["Date".to_string(), "Close".to_string()],
            vec![
                vec![Value::Date(ymd(2020, 1, 2)), Value::Number(10.0)],
                vec![Value::Date(ymd(2020, 1, 3)), Value::Number(12.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn written_summary_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let close = describe(&[Some(10.0), Some(12.0)]).unwrap();

        write_summary_json(&path, "azn.uk", &series(), &close, Some(0.5)).unwrap();
        let back = read_summary_json(&path).unwrap();

        assert_eq!(back.tool, "habits");
        assert_eq!(back.symbol, "azn.uk");
        assert_eq!(back.start, ymd(2020, 1, 2));
        assert_eq!(back.end, ymd(2020, 1, 3));
        assert_eq!(back.close, close);
        assert_eq!(back.holdout_rmse, Some(0.5));
    }

    #[test]
    fn series_without_dated_rows_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let empty = Table::new(vec!["Date".to_string(), "Close".to_string()]).unwrap();
        let close = describe(&[Some(1.0)]).unwrap();

        assert!(matches!(
            write_summary_json(&path, "azn.uk", &empty, &close, None),
            Err(AppError::Series(_))
        ));
        assert!(!path.exists());
    }
}
