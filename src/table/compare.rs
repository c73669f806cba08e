//! Baseline-vs-comparison deltas and top-N rankings.

use std::cmp::Ordering;

use tracing::debug;

use crate::domain::Value;
use crate::error::AppError;
use crate::table::{GroupAggregate, Table};

/// One series' change between the baseline and comparison periods.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonEntry {
    pub group: String,
    pub baseline: f64,
    pub comparison: f64,
    pub abs_change: f64,
    pub pct_change: Option<f64>,
}

/// A set of per-group changes for one metric, ordered by group name.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub key_column: String,
    pub metric: String,
    pub entries: Vec<ComparisonEntry>,
}

/// Percentage change from `baseline` to `comparison`, undefined when the
/// baseline is zero.
pub fn percentage_change(baseline: f64, comparison: f64) -> Option<f64> {
    if baseline == 0.0 {
        None
    } else {
        Some((comparison - baseline) / baseline * 100.0)
    }
}

fn entry(group: &str, baseline: f64, comparison: f64) -> ComparisonEntry {
    ComparisonEntry {
        group: group.to_string(),
        baseline,
        comparison,
        abs_change: comparison - baseline,
        pct_change: percentage_change(baseline, comparison),
    }
}

/// Compare one metric across two aggregates of the same key. Only groups
/// present in both with a defined mean on both sides produce an entry.
pub fn compare_aggregates(
    baseline: &GroupAggregate,
    comparison: &GroupAggregate,
    metric: &str,
) -> Result<Comparison, AppError> {
    for agg in [baseline, comparison] {
        if !agg.value_columns.iter().any(|c| c == metric) {
            return Err(AppError::Column {
                name: metric.to_string(),
            });
        }
    }
    let mut entries = Vec::new();
    for group in baseline.groups.keys() {
        let (Some(b), Some(c)) = (
            baseline.value(group, metric),
            comparison.value(group, metric),
        ) else {
            continue;
        };
        entries.push(entry(group, b, c));
    }
    debug!(
        metric,
        entries = entries.len(),
        "compared aggregates"
    );
    Ok(Comparison {
        key_column: baseline.key_column.clone(),
        metric: metric.to_string(),
        entries,
    })
}

/// Compare two value columns of a single aggregate group-by-group.
pub fn compare_columns(
    agg: &GroupAggregate,
    baseline_column: &str,
    comparison_column: &str,
    metric: &str,
) -> Result<Comparison, AppError> {
    for column in [baseline_column, comparison_column] {
        if !agg.value_columns.iter().any(|c| c == column) {
            return Err(AppError::Column {
                name: column.to_string(),
            });
        }
    }
    let mut entries = Vec::new();
    for group in agg.groups.keys() {
        let (Some(b), Some(c)) = (
            agg.value(group, baseline_column),
            agg.value(group, comparison_column),
        ) else {
            continue;
        };
        entries.push(entry(group, b, c));
    }
    Ok(Comparison {
        key_column: agg.key_column.clone(),
        metric: metric.to_string(),
        entries,
    })
}

/// Compare two groups of a single aggregate column-by-column. The entries
/// are keyed by value-column name, so this turns a per-month aggregate into
/// a per-series month-on-month comparison.
pub fn compare_rows(
    agg: &GroupAggregate,
    baseline_group: &str,
    comparison_group: &str,
    key_label: &str,
) -> Result<Comparison, AppError> {
    for group in [baseline_group, comparison_group] {
        if !agg.contains_group(group) {
            return Err(AppError::Series(format!(
                "no rows for {} `{group}`",
                agg.key_column
            )));
        }
    }
    let mut entries = Vec::new();
    for column in &agg.value_columns {
        let (Some(b), Some(c)) = (
            agg.value(baseline_group, column),
            agg.value(comparison_group, column),
        ) else {
            continue;
        };
        entries.push(entry(column, b, c));
    }
    entries.sort_by(|a, b| a.group.cmp(&b.group));
    Ok(Comparison {
        key_column: key_label.to_string(),
        metric: format!("{baseline_group} vs {comparison_group}"),
        entries,
    })
}

impl Comparison {
    /// Render as a table, one row per entry. Undefined percentage changes
    /// come out as missing cells.
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut out = Table::new(vec![
            self.key_column.clone(),
            "baseline".to_string(),
            "comparison".to_string(),
            "abs_change".to_string(),
            "pct_change".to_string(),
        ])?;
        for e in &self.entries {
            out.push_row(vec![
                Value::Text(e.group.clone()),
                Value::Number(e.baseline),
                Value::Number(e.comparison),
                Value::Number(e.abs_change),
                e.pct_change.map(Value::Number).unwrap_or(Value::Missing),
            ])?;
        }
        Ok(out)
    }

    /// Copy of the comparison without the named group.
    pub fn excluding(&self, group: &str) -> Comparison {
        Comparison {
            key_column: self.key_column.clone(),
            metric: self.metric.clone(),
            entries: self
                .entries
                .iter()
                .filter(|e| e.group != group)
                .cloned()
                .collect(),
        }
    }
}

/// The steepest percentage risers and fallers of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Rankings {
    pub risers: Vec<ComparisonEntry>,
    pub fallers: Vec<ComparisonEntry>,
}

/// Rank entries by percentage change. Entries with an undefined percentage
/// are left out entirely; ties break lexically by group name so repeated
/// runs agree.
pub fn rank_changes(comparison: &Comparison, top_n: usize) -> Rankings {
    let defined: Vec<ComparisonEntry> = comparison
        .entries
        .iter()
        .filter(|e| e.pct_change.is_some())
        .cloned()
        .collect();

    let mut risers = defined.clone();
    risers.sort_by(|a, b| {
        b.pct_change
            .partial_cmp(&a.pct_change)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    risers.truncate(top_n);

    let mut fallers = defined;
    fallers.sort_by(|a, b| {
        a.pct_change
            .partial_cmp(&b.pct_change)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.group.cmp(&b.group))
    });
    fallers.truncate(top_n);

    Rankings { risers, fallers }
}

/// Groups ranked by one aggregate column, highest and lowest ends.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRankings {
    pub top: Vec<(String, f64)>,
    pub bottom: Vec<(String, f64)>,
}

/// Rank an aggregate's groups by one column, skipping missing cells. Ties
/// break lexically by group name.
pub fn rank_groups(
    agg: &GroupAggregate,
    column: &str,
    top_n: usize,
) -> Result<ColumnRankings, AppError> {
    if !agg.value_columns.iter().any(|c| c == column) {
        return Err(AppError::Column {
            name: column.to_string(),
        });
    }
    let scored: Vec<(String, f64)> = agg
        .groups
        .keys()
        .filter_map(|g| agg.value(g, column).map(|v| (g.clone(), v)))
        .collect();

    let mut top = scored.clone();
    top.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    top.truncate(top_n);

    let mut bottom = scored;
    bottom.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    bottom.truncate(top_n);

    Ok(ColumnRankings { top, bottom })
}
