//! Series statistics: summaries, rolling means, holdout splits, RMSE.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Value;
use crate::error::AppError;
use crate::table::Table;

/// Summary of a numeric column, missing cells excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two observations.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Describe the defined entries of a series; `None` when all are missing.
pub fn describe(values: &[Option<f64>]) -> Option<SummaryStats> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        return None;
    }
    let count = defined.len();
    let mean = defined.iter().sum::<f64>() / count as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in &defined {
        min = min.min(*v);
        max = max.max(*v);
    }
    let std = if count < 2 {
        None
    } else {
        let variance =
            defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(variance.sqrt())
    };
    Some(SummaryStats {
        count,
        mean,
        std,
        min,
        max,
    })
}

/// Trailing moving average. A position only carries a value once a full
/// window of defined observations sits behind it; a missing observation
/// anywhere in the window blanks that position.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().flatten().sum();
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Index splitting a series into train and holdout halves: the train part
/// takes `ceil(len * fraction)` leading observations.
pub fn holdout_split(len: usize, fraction: f64) -> usize {
    ((len as f64) * fraction).ceil().min(len as f64) as usize
}

/// Extract a dated numeric series from a table, dropping rows where either
/// side is missing and sorting by date. Empty or date-duplicated series are
/// rejected.
pub fn prepare_series(
    table: &Table,
    date_column: &str,
    value_column: &str,
) -> Result<Vec<(NaiveDate, f64)>, AppError> {
    let dates = table.dates(date_column)?;
    let values = table.numbers(value_column)?;
    let mut series: Vec<(NaiveDate, f64)> = dates
        .into_iter()
        .zip(values)
        .filter_map(|(d, v)| Some((d?, v?)))
        .collect();
    series.sort_by_key(|(d, _)| *d);
    if series.is_empty() {
        return Err(AppError::Series(format!(
            "no defined `{value_column}` observations"
        )));
    }
    for pair in series.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(AppError::Series(format!(
                "duplicate date {} in `{value_column}` series",
                pair[0].0
            )));
        }
    }
    Ok(series)
}

/// Render a dated series as a two-column table.
pub fn series_to_table(
    series: &[(NaiveDate, f64)],
    date_name: &str,
    value_name: &str,
) -> Result<Table, AppError> {
    let mut out = Table::new(vec![date_name.to_string(), value_name.to_string()])?;
    for (date, value) in series {
        out.push_row(vec![Value::Date(*date), Value::Number(*value)])?;
    }
    Ok(out)
}

/// Root mean squared error over the dates both series share; `None` when
/// they share none.
pub fn rmse(actual: &[(NaiveDate, f64)], predicted: &[(NaiveDate, f64)]) -> Option<f64> {
    let by_date: HashMap<NaiveDate, f64> = predicted.iter().copied().collect();
    let mut sum_sq = 0.0;
    let mut n = 0usize;
    for (date, a) in actual {
        if let Some(p) = by_date.get(date) {
            sum_sq += (a - p).powi(2);
            n += 1;
        }
    }
    if n == 0 {
        None
    } else {
        Some((sum_sq / n as f64).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn describe_uses_sample_std() {
        let stats = describe(&[Some(1.0), None, Some(3.0), Some(5.0)]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.std, Some(2.0));
    }

    #[test]
    fn describe_single_point_has_no_std() {
        let stats = describe(&[Some(4.0)]).unwrap();
        assert_eq!(stats.std, None);
        assert!(describe(&[None, None]).is_none());
    }

    #[test]
    fn rolling_mean_needs_a_full_defined_window() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), None, Some(5.0), Some(7.0)];
        let means = rolling_mean(&values, 2);
        assert_eq!(
            means,
            vec![None, Some(1.5), Some(2.5), None, None, Some(6.0)]
        );
    }

    #[test]
    fn degenerate_windows_yield_nothing() {
        let values = vec![Some(1.0), Some(2.0)];
        assert_eq!(rolling_mean(&values, 0), vec![None, None]);
        assert_eq!(rolling_mean(&values, 3), vec![None, None]);
    }

    #[test]
    fn holdout_split_rounds_up() {
        assert_eq!(holdout_split(10, 0.8), 8);
        assert_eq!(holdout_split(5, 0.5), 3);
        assert_eq!(holdout_split(1, 0.8), 1);
        assert_eq!(holdout_split(0, 0.8), 0);
    }

    #[test]
    fn rmse_aligns_by_date() {
        let actual = vec![(date(1), 10.0), (date(2), 20.0), (date(3), 30.0)];
        let predicted = vec![(date(2), 26.0), (date(3), 22.0), (date(4), 99.0)];
        // Overlap on days 2 and 3: errors -6 and 8.
        let err = rmse(&actual, &predicted).unwrap();
        assert!((err - 50.0_f64.sqrt()).abs() < 1e-12);

        let disjoint = vec![(date(9), 1.0)];
        assert_eq!(rmse(&actual, &disjoint), None);
    }

    #[test]
    fn series_extraction_sorts_and_validates() {
        let table = Table::with_rows(
            vec!["Date".to_string(), "Close".to_string()],
            vec![
                vec![Value::Date(date(3)), Value::Number(3.0)],
                vec![Value::Date(date(1)), Value::Number(1.0)],
                vec![Value::Date(date(2)), Value::Missing],
            ],
        )
        .unwrap();
        let series = prepare_series(&table, "Date", "Close").unwrap();
        assert_eq!(series, vec![(date(1), 1.0), (date(3), 3.0)]);

        let empty = Table::with_rows(
            vec!["Date".to_string(), "Close".to_string()],
            vec![vec![Value::Date(date(1)), Value::Missing]],
        )
        .unwrap();
        assert!(matches!(
            prepare_series(&empty, "Date", "Close"),
            Err(AppError::Series(_))
        ));

        let dup = Table::with_rows(
            vec!["Date".to_string(), "Close".to_string()],
            vec![
                vec![Value::Date(date(1)), Value::Number(1.0)],
                vec![Value::Date(date(1)), Value::Number(2.0)],
            ],
        )
        .unwrap();
        assert!(matches!(
            prepare_series(&dup, "Date", "Close"),
            Err(AppError::Series(_))
        ));
    }
}
