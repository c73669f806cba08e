//! Export tables to CSV.
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Missing cells come out empty, dates as ISO.

use std::fs::File;
use std::path::Path;

use crate::error::AppError;
use crate::table::Table;

/// Write a table to a CSV file.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::Export {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(table.columns())
        .map_err(|e| AppError::Export {
            path: path.display().to_string(),
            detail: format!("header: {e}"),
        })?;
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writer.write_record(&cells).map_err(|e| AppError::Export {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    }
    writer.flush().map_err(|e| AppError::Export {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;
    Ok(())
}
