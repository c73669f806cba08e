//! Header renames and numeric cleanup.
//!
//! One uniform contract for every dataset family:
//!
//! - raw headers are renamed to canonical semantic names
//! - designated numeric columns are stripped of textual artifacts
//!   (`%` suffixes, `r ` revision prefixes) and coerced to numbers
//! - the missing tokens are `""`, `"."` and `".."`; anything else that still
//!   fails to parse also becomes missing, never an error
//! - rows flagged provisional (`p ` prefix in a designated cell) are dropped
//!   whole, and the drop is counted and logged
//!
//! Re-running on already-cleaned output is a no-op.

use tracing::{debug, info};

use crate::domain::Value;
use crate::error::AppError;
use crate::table::Table;

const MISSING_TOKENS: [&str; 3] = ["", ".", ".."];
const REVISION_PREFIX: &str = "r ";
const PROVISIONAL_PREFIX: &str = "p ";

/// True for the placeholder tokens the source publications use for "no value".
pub fn is_missing_token(s: &str) -> bool {
    MISSING_TOKENS.contains(&s.trim())
}

/// Rename columns according to a raw -> canonical map.
///
/// Raw headers absent from the table are skipped, so the rename map can cover
/// the union of header spellings seen across publication revisions. A rename
/// that would collide with an existing column is an error.
pub fn rename_columns(table: &Table, renames: &[(&str, &str)]) -> Result<Table, AppError> {
    let columns = table
        .columns()
        .iter()
        .map(|name| {
            renames
                .iter()
                .find(|(raw, _)| raw == name)
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or_else(|| name.clone())
        })
        .collect();
    Table::with_rows(columns, table.rows().to_vec())
}

/// Coerce the designated columns to numbers, dropping provisional rows.
pub fn clean_numeric_columns(table: &Table, columns: &[&str]) -> Result<Table, AppError> {
    let idxs = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Table::new(table.columns().to_vec())?;
    let mut provisional = 0usize;
    let mut coerced_missing = 0usize;

    'rows: for row in table.rows() {
        for &i in &idxs {
            if let Value::Text(s) = &row[i] {
                if s.trim_start().starts_with(PROVISIONAL_PREFIX) {
                    provisional += 1;
                    continue 'rows;
                }
            }
        }

        let mut row = row.clone();
        for &i in &idxs {
            if let Value::Text(s) = &row[i] {
                match clean_cell(s) {
                    Some(v) => row[i] = Value::Number(v),
                    None => {
                        if !is_missing_token(s) {
                            coerced_missing += 1;
                        }
                        row[i] = Value::Missing;
                    }
                }
            }
        }
        out.push_row(row)?;
    }

    if provisional > 0 {
        info!("dropped {provisional} provisional rows");
    }
    if coerced_missing > 0 {
        debug!("coerced {coerced_missing} unparseable cells to missing");
    }

    Ok(out)
}

/// Full normalizer pass: rename headers, then clean the canonical numeric
/// columns. Returns a new table; the input is untouched.
pub fn normalize(
    table: &Table,
    renames: &[(&str, &str)],
    numeric_columns: &[&str],
) -> Result<Table, AppError> {
    let renamed = rename_columns(table, renames)?;
    clean_numeric_columns(&renamed, numeric_columns)
}

/// Strip artifacts from one raw cell and parse the remainder.
fn clean_cell(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix(REVISION_PREFIX) {
        s = rest.trim();
    }
    // Unit suffixes: keep everything left of the first percent sign.
    let s = match s.split_once('%') {
        Some((left, _)) => left.trim(),
        None => s,
    };
    if is_missing_token(s) {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> Table {
        Table::with_rows(
            vec!["Date".to_string(), "Cars2".to_string()],
            vec![
                vec![
                    Value::Text("2020-04-01".to_string()),
                    Value::Text("36%".to_string()),
                ],
                vec![
                    Value::Text("2020-04-02".to_string()),
                    Value::Text("r 38%".to_string()),
                ],
                vec![
                    Value::Text("2020-04-03".to_string()),
                    Value::Text("..".to_string()),
                ],
                vec![
                    Value::Text("2020-04-04".to_string()),
                    Value::Text("p 41%".to_string()),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn artifacts_are_stripped_and_parsed() {
        let cleaned = normalize(&raw_table(), &[("Cars2", "Cars")], &["Cars"]).unwrap();
        assert_eq!(cleaned.columns()[1], "Cars");
        // Provisional row dropped.
        assert_eq!(cleaned.n_rows(), 3);
        assert_eq!(cleaned.cell(0, "Cars").unwrap(), &Value::Number(36.0));
        assert_eq!(cleaned.cell(1, "Cars").unwrap(), &Value::Number(38.0));
        assert_eq!(cleaned.cell(2, "Cars").unwrap(), &Value::Missing);
    }

    #[test]
    fn unparseable_cells_become_missing_not_errors() {
        let t = Table::with_rows(
            vec!["x".to_string()],
            vec![vec![Value::Text("n/a*".to_string())]],
        )
        .unwrap();
        let cleaned = clean_numeric_columns(&t, &["x"]).unwrap();
        assert_eq!(cleaned.cell(0, "x").unwrap(), &Value::Missing);
    }

    #[test]
    fn missing_tokens_cover_source_placeholders() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("."));
        assert!(is_missing_token(".."));
        assert!(is_missing_token("  .. "));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn renames_skip_absent_headers() {
        let t = Table::new(vec!["Cars".to_string()]).unwrap();
        let renamed =
            rename_columns(&t, &[("Cars2", "Cars"), ("Cycling10,11", "Cycling")]).unwrap();
        assert_eq!(renamed.columns(), &["Cars".to_string()]);
    }

    #[test]
    fn rename_collision_is_an_error() {
        let t = Table::new(vec!["Cars2".to_string(), "Cars".to_string()]).unwrap();
        let err = rename_columns(&t, &[("Cars2", "Cars")]).unwrap_err();
        assert!(matches!(err, AppError::DuplicateColumn { .. }));
    }

    #[test]
    fn normalizer_is_idempotent() {
        let renames = [("Cars2", "Cars")];
        let numeric = ["Cars"];
        let once = normalize(&raw_table(), &renames, &numeric).unwrap();
        let twice = normalize(&once, &renames, &numeric).unwrap();
        assert_eq!(once, twice);
    }
}
