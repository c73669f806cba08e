//! CSV loading.
//!
//! Everything comes in as text first: cells only become numbers or dates
//! through the normalization and date-parsing steps, so a stray footnote
//! marker never silently turns into a zero.

use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::Value;
use crate::error::AppError;
use crate::table::{Table, parse_date};

/// Read a CSV stream into a table of text cells. `origin` names the source
/// in errors and logs (usually the file path).
///
/// Rows shorter than the header are padded with missing cells; rows longer
/// than the header are skipped with a warning. Empty cells come in missing.
pub fn read_csv_table<R: std::io::Read>(reader: R, origin: &str) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Load {
            path: origin.to_string(),
            detail: format!("failed to read CSV headers: {e}"),
        })?
        .clone();

    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, column lookups miss.
    let columns: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let width = columns.len();

    let mut table = Table::new(columns)?;
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::Load {
            path: origin.to_string(),
            detail: format!("row {}: {e}", idx + 2),
        })?;
        if record.len() > width {
            warn!(origin, row = idx + 2, "row wider than header, skipping");
            continue;
        }
        let mut row: Vec<Value> = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Value::Missing
                } else {
                    Value::Text(cell.to_string())
                }
            })
            .collect();
        row.resize(width, Value::Missing);
        table.push_row(row)?;
    }

    debug!(origin, rows = table.n_rows(), "read CSV");
    Ok(table)
}

/// Load a CSV file into a table of text cells.
pub fn load_table(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path).map_err(|e| AppError::Load {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    read_csv_table(file, &path.display().to_string())
}

/// Parse a table's date column in place and sort rows by it ascending.
///
/// Every row must carry a parseable date; a bad or absent date aborts the
/// run rather than letting a misread row slide into the wrong period.
pub fn parse_date_column(table: &Table, column: &str, origin: &str) -> Result<Table, AppError> {
    let idx = table.column_index(column)?;
    let mut rows = Vec::with_capacity(table.n_rows());
    for (i, row) in table.rows().iter().enumerate() {
        let mut row = row.clone();
        row[idx] = match &row[idx] {
            Value::Date(d) => Value::Date(*d),
            Value::Text(s) => {
                let date = parse_date(s).map_err(|detail| AppError::Parse {
                    context: format!("{origin}: row {}", i + 1),
                    detail,
                })?;
                Value::Date(date)
            }
            Value::Missing | Value::Number(_) => {
                return Err(AppError::Parse {
                    context: format!("{origin}: row {}", i + 1),
                    detail: format!("missing date in column `{column}`"),
                });
            }
        };
        rows.push(row);
    }
    let parsed = Table::with_rows(table.columns().to_vec(), rows)?;
    parsed.sort_by_date(column)
}

/// Load a CSV file and parse + sort its date column in one step.
pub fn load_dated_table(path: &Path, date_column: &str) -> Result<Table, AppError> {
    let table = load_table(path)?;
    parse_date_column(&table, date_column, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bom_is_stripped_from_first_header() {
        let csv = "\u{feff}Date,Value\n2020-01-02,5\n";
        let table = read_csv_table(csv.as_bytes(), "test").unwrap();
        assert_eq!(table.columns(), &["Date", "Value"]);
    }

    #[test]
    fn short_rows_are_padded_with_missing() {
        let csv = "a,b,c\n1,2\n";
        let table = read_csv_table(csv.as_bytes(), "test").unwrap();
        assert_eq!(table.cell(0, "c").unwrap(), &Value::Missing);
    }

    #[test]
    fn date_column_parses_and_sorts() {
        let csv = "Date,Value\n05/01/2020,b\n2020-01-02,a\n";
        let table = read_csv_table(csv.as_bytes(), "test").unwrap();
        let dated = parse_date_column(&table, "Date", "test").unwrap();
        assert_eq!(
            dated.cell(0, "Date").unwrap(),
            &Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
        );
        assert_eq!(
            dated.cell(1, "Date").unwrap(),
            &Value::Date(NaiveDate::from_ymd_opt(2020, 1, 5).unwrap())
        );
    }

    #[test]
    fn unparseable_date_aborts() {
        let csv = "Date,Value\nnot-a-date,1\n";
        let table = read_csv_table(csv.as_bytes(), "test").unwrap();
        assert!(matches!(
            parse_date_column(&table, "Date", "test"),
            Err(AppError::Parse { .. })
        ));
    }
}
