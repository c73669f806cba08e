//! Inner join on a shared key column.

use std::collections::HashMap;

use tracing::debug;

use crate::error::AppError;
use crate::table::Table;

/// Join two tables on a shared key column, keeping only keys present on both
/// sides.
///
/// The key column is materialized once (from the left side). Right-hand
/// columns whose names collide with a left column come out as `{name}_right`.
/// A key appearing k times on the left and m times on the right yields k*m
/// rows; rows with a missing key on either side never match. Keys absent from
/// one side are dropped silently, surfaced only as a row-count change in the
/// debug log.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table, AppError> {
    let left_key = left.column_index(key)?;
    let right_key = right.column_index(key)?;

    // Key -> row positions on the right, in row order.
    let mut right_rows: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, row) in right.rows().iter().enumerate() {
        if let Some(k) = row[right_key].key_string() {
            right_rows.entry(k).or_default().push(pos);
        }
    }

    let mut columns = left.columns().to_vec();
    let mut right_cols = Vec::new();
    for (pos, name) in right.columns().iter().enumerate() {
        if pos == right_key {
            continue;
        }
        let out_name = if left.has_column(name) {
            format!("{name}_right")
        } else {
            name.clone()
        };
        columns.push(out_name);
        right_cols.push(pos);
    }

    let mut out = Table::new(columns)?;
    for row in left.rows() {
        let Some(k) = row[left_key].key_string() else {
            continue;
        };
        let Some(matches) = right_rows.get(&k) else {
            continue;
        };
        for &pos in matches {
            let mut cells = row.clone();
            let right_row = &right.rows()[pos];
            cells.extend(right_cols.iter().map(|&i| right_row[i].clone()));
            out.push_row(cells)?;
        }
    }

    debug!(
        "inner join on `{key}`: {} x {} rows -> {}",
        left.n_rows(),
        right.n_rows(),
        out.n_rows()
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn tickers_and_prices() -> Table {
        Table::with_rows(
            vec![
                "ticker".to_string(),
                "industry".to_string(),
                "price".to_string(),
            ],
            vec![
                vec![text("X"), text("Tech"), Value::Number(100.0)],
                vec![text("Y"), text("Tech"), Value::Number(200.0)],
            ],
        )
        .unwrap()
    }

    fn tickers_and_codes() -> Table {
        Table::with_rows(
            vec!["ticker".to_string(), "sector_code".to_string()],
            vec![
                vec![text("X"), Value::Number(1.0)],
                vec![text("Z"), Value::Number(2.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn join_keeps_only_shared_keys() {
        let joined = inner_join(&tickers_and_prices(), &tickers_and_codes(), "ticker").unwrap();
        assert_eq!(joined.n_rows(), 1);
        assert_eq!(joined.cell(0, "ticker").unwrap(), &text("X"));
        assert_eq!(joined.cell(0, "sector_code").unwrap(), &Value::Number(1.0));
        assert_eq!(
            joined.columns(),
            &["ticker", "industry", "price", "sector_code"]
        );
    }

    #[test]
    fn join_multiplicity_is_k_times_m() {
        let left = Table::with_rows(
            vec!["k".to_string(), "a".to_string()],
            vec![
                vec![text("p"), Value::Number(1.0)],
                vec![text("p"), Value::Number(2.0)],
                vec![text("q"), Value::Number(3.0)],
            ],
        )
        .unwrap();
        let right = Table::with_rows(
            vec!["k".to_string(), "b".to_string()],
            vec![
                vec![text("p"), Value::Number(10.0)],
                vec![text("p"), Value::Number(20.0)],
                vec![text("q"), Value::Number(30.0)],
            ],
        )
        .unwrap();
        let joined = inner_join(&left, &right, "k").unwrap();
        // p: 2x2, q: 1x1.
        assert_eq!(joined.n_rows(), 5);
    }

    #[test]
    fn missing_keys_never_match() {
        let left = Table::with_rows(
            vec!["k".to_string(), "a".to_string()],
            vec![vec![Value::Missing, Value::Number(1.0)]],
        )
        .unwrap();
        let right = Table::with_rows(
            vec!["k".to_string(), "b".to_string()],
            vec![vec![Value::Missing, Value::Number(2.0)]],
        )
        .unwrap();
        let joined = inner_join(&left, &right, "k").unwrap();
        assert_eq!(joined.n_rows(), 0);
    }

    #[test]
    fn colliding_right_columns_get_suffixed() {
        let left = Table::with_rows(
            vec!["k".to_string(), "score".to_string()],
            vec![vec![text("p"), Value::Number(1.0)]],
        )
        .unwrap();
        let right = Table::with_rows(
            vec!["k".to_string(), "score".to_string()],
            vec![vec![text("p"), Value::Number(2.0)]],
        )
        .unwrap();
        let joined = inner_join(&left, &right, "k").unwrap();
        assert_eq!(joined.columns(), &["k", "score", "score_right"]);
        assert_eq!(joined.cell(0, "score").unwrap(), &Value::Number(1.0));
        assert_eq!(joined.cell(0, "score_right").unwrap(), &Value::Number(2.0));
    }

    #[test]
    fn numeric_and_text_keys_compare_textually() {
        let left = Table::with_rows(
            vec!["k".to_string(), "a".to_string()],
            vec![vec![Value::Number(1.0), text("left")]],
        )
        .unwrap();
        let right = Table::with_rows(
            vec!["k".to_string(), "b".to_string()],
            vec![vec![text("1"), text("right")]],
        )
        .unwrap();
        let joined = inner_join(&left, &right, "k").unwrap();
        assert_eq!(joined.n_rows(), 1);
    }
}
