//! Tabular pipeline stages.
//!
//! The `Table` type lives here, alongside the stage modules:
//!
//! - `normalize`: header renames + numeric cleanup
//! - `join`: inner joins on a shared key column
//! - `group`: per-group means that ignore missing cells
//! - `compare`: baseline/comparison deltas and rankings
//!
//! Every stage returns a new `Table`; no stage mutates its input.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{DateWindow, Value};
use crate::error::AppError;

pub mod compare;
pub mod group;
pub mod join;
pub mod normalize;

pub use compare::*;
pub use group::*;
pub use join::*;
pub use normalize::*;

/// Column-ordered, row-major table.
///
/// Every row has exactly one cell per column and column names are unique;
/// both are enforced at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column set.
    pub fn new(columns: Vec<String>) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (pos, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), pos).is_some() {
                return Err(AppError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self {
            columns,
            index,
            rows: Vec::new(),
        })
    }

    /// Create a table from column names and pre-built rows.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AppError> {
        let mut table = Table::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), AppError> {
        if row.len() != self.columns.len() {
            return Err(AppError::Table(format!(
                "row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize, AppError> {
        self.index.get(name).copied().ok_or_else(|| AppError::Column {
            name: name.to_string(),
        })
    }

    pub fn cell(&self, row: usize, column: &str) -> Result<&Value, AppError> {
        let idx = self.column_index(column)?;
        self.rows
            .get(row)
            .map(|r| &r[idx])
            .ok_or_else(|| AppError::Table(format!("row {row} out of bounds")))
    }

    /// All cells of one column as optional numbers (missing/non-numeric -> None).
    pub fn numbers(&self, column: &str) -> Result<Vec<Option<f64>>, AppError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r[idx].as_number()).collect())
    }

    /// All cells of one column as optional dates.
    pub fn dates(&self, column: &str) -> Result<Vec<Option<NaiveDate>>, AppError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r[idx].as_date()).collect())
    }

    /// A new table with only the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Table, AppError> {
        let idxs = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Table::new(columns.iter().map(|c| c.to_string()).collect())?;
        for row in &self.rows {
            out.push_row(idxs.iter().map(|&i| row[i].clone()).collect())?;
        }
        Ok(out)
    }

    /// A new table with one extra column appended.
    pub fn with_column(&self, name: &str, values: Vec<Value>) -> Result<Table, AppError> {
        if self.has_column(name) {
            return Err(AppError::DuplicateColumn {
                name: name.to_string(),
            });
        }
        if values.len() != self.rows.len() {
            return Err(AppError::Table(format!(
                "column `{name}` has {} values, expected {}",
                values.len(),
                self.rows.len()
            )));
        }
        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let mut out = Table::new(columns)?;
        for (row, value) in self.rows.iter().zip(values) {
            let mut row = row.clone();
            row.push(value);
            out.push_row(row)?;
        }
        Ok(out)
    }

    /// A new table with a constant offset added to each numeric cell of the
    /// named columns. Missing cells stay missing.
    pub fn offset_columns(&self, columns: &[&str], delta: f64) -> Result<Table, AppError> {
        let idxs = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mut out = Table::new(self.columns.clone())?;
        for row in &self.rows {
            let mut row = row.clone();
            for &i in &idxs {
                if let Value::Number(v) = row[i] {
                    row[i] = Value::Number(v + delta);
                }
            }
            out.push_row(row)?;
        }
        Ok(out)
    }

    /// A new table keeping only rows whose text cell is one of `allowed`.
    pub fn filter_text_in(&self, column: &str, allowed: &[&str]) -> Result<Table, AppError> {
        let idx = self.column_index(column)?;
        let mut out = Table::new(self.columns.clone())?;
        for row in &self.rows {
            let keep = row[idx]
                .as_text()
                .map(|s| allowed.contains(&s))
                .unwrap_or(false);
            if keep {
                out.push_row(row.clone())?;
            }
        }
        Ok(out)
    }

    /// A new table keeping only rows whose date falls inside the closed window.
    ///
    /// Rows without a date in that column are excluded.
    pub fn filter_date_window(&self, column: &str, window: DateWindow) -> Result<Table, AppError> {
        let idx = self.column_index(column)?;
        let mut out = Table::new(self.columns.clone())?;
        for row in &self.rows {
            let keep = row[idx]
                .as_date()
                .map(|d| window.contains(d))
                .unwrap_or(false);
            if keep {
                out.push_row(row.clone())?;
            }
        }
        Ok(out)
    }

    /// A new table sorted by the named date column, ascending and stable.
    ///
    /// Rows without a date in that column sort first.
    pub fn sort_by_date(&self, column: &str) -> Result<Table, AppError> {
        let idx = self.column_index(column)?;
        let mut rows = self.rows.clone();
        rows.sort_by_key(|r| r[idx].as_date());
        Table::with_rows(self.columns.clone(), rows)
    }

    /// A new table with a derived `%Y-%m` text column computed from a date
    /// column, for calendar-month grouping.
    pub fn with_month_column(&self, date_column: &str, name: &str) -> Result<Table, AppError> {
        let dates = self.dates(date_column)?;
        let cells = dates
            .into_iter()
            .map(|d| match d {
                Some(d) => Value::Text(month_key(d)),
                None => Value::Missing,
            })
            .collect();
        self.with_column(name, cells)
    }

    /// Names of all columns whose header parses as a calendar date.
    pub fn date_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| parse_date(c).is_ok())
            .cloned()
            .collect()
    }

    /// Names of all date-headed columns whose date falls inside the window.
    pub fn columns_in_window(&self, window: DateWindow) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| parse_date(c).map(|d| window.contains(d)).unwrap_or(false))
            .cloned()
            .collect()
    }
}

/// Calendar-month key used for month-level grouping.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parse a date in one of the formats seen across the source publications.
///
/// ISO (`YYYY-MM-DD`) is preferred, but government spreadsheets routinely use
/// `DD/MM/YYYY` or `DD-MM-YYYY`. First matching format wins.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "invalid date '{s}' (expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD)"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated_table() -> Table {
        Table::with_rows(
            vec!["Date".to_string(), "Cars".to_string()],
            vec![
                vec![Value::Date(ymd(2020, 4, 2)), Value::Number(40.0)],
                vec![Value::Date(ymd(2020, 3, 30)), Value::Number(35.0)],
                vec![Value::Date(ymd(2020, 4, 6)), Value::Number(45.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        assert_eq!(parse_date("2020-03-23").unwrap(), ymd(2020, 3, 23));
        assert_eq!(parse_date("23/03/2020").unwrap(), ymd(2020, 3, 23));
        assert_eq!(parse_date("23-03-2020").unwrap(), ymd(2020, 3, 23));
        assert_eq!(parse_date("2020/03/23").unwrap(), ymd(2020, 3, 23));
        assert!(parse_date("March 23rd").is_err());
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = Table::new(vec!["a".to_string(), "a".to_string()]).unwrap_err();
        assert!(matches!(err, AppError::DuplicateColumn { .. }));
    }

    #[test]
    fn window_filter_keeps_closed_range() {
        let t = dated_table();
        let w = DateWindow::new(ymd(2020, 3, 30), ymd(2020, 4, 2));
        let sliced = t.filter_date_window("Date", w).unwrap();
        assert_eq!(sliced.n_rows(), 2);
        let dates: Vec<_> = sliced.dates("Date").unwrap().into_iter().flatten().collect();
        assert!(dates.iter().all(|d| w.contains(*d)));
    }

    #[test]
    fn sort_by_date_orders_ascending() {
        let sorted = dated_table().sort_by_date("Date").unwrap();
        let dates: Vec<_> = sorted.dates("Date").unwrap().into_iter().flatten().collect();
        assert_eq!(dates, vec![ymd(2020, 3, 30), ymd(2020, 4, 2), ymd(2020, 4, 6)]);
    }

    #[test]
    fn offset_leaves_missing_cells_alone() {
        let t = Table::with_rows(
            vec!["Cars".to_string()],
            vec![vec![Value::Number(100.0)], vec![Value::Missing]],
        )
        .unwrap();
        let shifted = t.offset_columns(&["Cars"], -100.0).unwrap();
        assert_eq!(shifted.rows()[0][0], Value::Number(0.0));
        assert_eq!(shifted.rows()[1][0], Value::Missing);
        // Input untouched.
        assert_eq!(t.rows()[0][0], Value::Number(100.0));
    }

    #[test]
    fn month_column_derives_calendar_keys() {
        let t = dated_table().with_month_column("Date", "Month").unwrap();
        assert_eq!(t.cell(0, "Month").unwrap(), &Value::Text("2020-04".to_string()));
        assert_eq!(t.cell(1, "Month").unwrap(), &Value::Text("2020-03".to_string()));
    }

    #[test]
    fn date_headed_columns_are_detected() {
        let t = Table::new(vec![
            "Ticker".to_string(),
            "2020-01-02".to_string(),
            "2020-08-03".to_string(),
        ])
        .unwrap();
        assert_eq!(t.date_columns(), vec!["2020-01-02", "2020-08-03"]);
        let w = DateWindow::new(ymd(2020, 1, 1), ymd(2020, 1, 31));
        assert_eq!(t.columns_in_window(w), vec!["2020-01-02"]);
    }
}
