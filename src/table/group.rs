//! Group-by-mean aggregation.

use std::collections::BTreeMap;

use crate::domain::{Value, number_values};
use crate::error::AppError;
use crate::table::Table;

/// Per-group means for a set of numeric columns.
///
/// Groups are keyed by the key cell's textual form and held in a `BTreeMap`
/// so iteration (and every downstream report) is deterministic. A group only
/// exists if at least one row carried its key; a cell is `None` when every
/// contributing value was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub key_column: String,
    pub value_columns: Vec<String>,
    pub groups: BTreeMap<String, Vec<Option<f64>>>,
}

impl GroupAggregate {
    /// Mean for one group/column pair, `None` if the group or column is
    /// absent or the cell is missing.
    pub fn value(&self, group: &str, column: &str) -> Option<f64> {
        let pos = self.value_columns.iter().position(|c| c == column)?;
        self.groups.get(group).and_then(|cells| cells[pos])
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Render as a table (key column first), for exports and previews.
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns = vec![self.key_column.clone()];
        columns.extend(self.value_columns.iter().cloned());
        let mut out = Table::new(columns)?;
        for (group, cells) in &self.groups {
            let mut row = vec![Value::Text(group.clone())];
            row.extend(number_values(cells.clone()));
            out.push_row(row)?;
        }
        Ok(out)
    }
}

/// Group rows by a key column and compute the mean of each value column per
/// group, ignoring missing cells. Rows with a missing key join no group.
pub fn group_mean(
    table: &Table,
    key_column: &str,
    value_columns: &[&str],
) -> Result<GroupAggregate, AppError> {
    let key_idx = table.column_index(key_column)?;
    let value_idxs = value_columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut members: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (pos, row) in table.rows().iter().enumerate() {
        if let Some(k) = row[key_idx].key_string() {
            members.entry(k).or_default().push(pos);
        }
    }

    let mut groups = BTreeMap::new();
    for (group, rows) in members {
        let cells = value_idxs
            .iter()
            .map(|&i| {
                let values: Vec<Option<f64>> = rows
                    .iter()
                    .map(|&r| table.rows()[r][i].as_number())
                    .collect();
                mean_ignoring_missing(&values)
            })
            .collect();
        groups.insert(group, cells);
    }

    Ok(GroupAggregate {
        key_column: key_column.to_string(),
        value_columns: value_columns.iter().map(|c| c.to_string()).collect(),
        groups,
    })
}

/// Arithmetic mean over the defined entries; `None` when every entry is
/// missing.
pub fn mean_ignoring_missing(values: &[Option<f64>]) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values.iter().flatten() {
        sum += v;
        n += 1;
    }
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Per-row mean over the designated columns, missing-propagating in the
/// all-missing case only (a partial row still averages its defined cells).
pub fn row_mean(table: &Table, columns: &[&str]) -> Result<Vec<Option<f64>>, AppError> {
    let idxs = columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let values: Vec<Option<f64>> = idxs.iter().map(|&i| row[i].as_number()).collect();
            mean_ignoring_missing(&values)
        })
        .collect())
}
