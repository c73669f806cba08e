//! Fixed-width text rendering for tables, comparisons, and rankings.

use crate::domain::Value;
use crate::stats::SummaryStats;
use crate::table::{ColumnRankings, Comparison, Rankings, Table};

const KEY_WIDTH: usize = 20;
const CELL_WIDTH: usize = 14;

/// Format a table preview: header, separator, then at most `max_rows` rows
/// with a trailing count of anything elided.
pub fn format_table(table: &Table, max_rows: usize) -> String {
    let mut out = String::new();

    let mut header = String::new();
    let mut dashes = String::new();
    for (i, name) in table.columns().iter().enumerate() {
        if i == 0 {
            header.push_str(&format!("{:<KEY_WIDTH$}", truncate(name, KEY_WIDTH)));
            dashes.push_str(&format!("{:-<KEY_WIDTH$}", ""));
        } else {
            header.push_str(&format!(" {:>CELL_WIDTH$}", truncate(name, CELL_WIDTH)));
            dashes.push_str(&format!(" {:-<CELL_WIDTH$}", ""));
        }
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(dashes.trim_end());
    out.push('\n');

    for row in table.rows().iter().take(max_rows) {
        let mut line = String::new();
        for (i, value) in row.iter().enumerate() {
            let text = cell_text(value);
            if i == 0 {
                line.push_str(&format!("{:<KEY_WIDTH$}", truncate(&text, KEY_WIDTH)));
            } else {
                line.push_str(&format!(" {:>CELL_WIDTH$}", truncate(&text, CELL_WIDTH)));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if table.n_rows() > max_rows {
        out.push_str(&format!("... ({} more rows)\n", table.n_rows() - max_rows));
    }

    out
}

/// Format a comparison with its title, one line per entry. Undefined
/// percentage changes print as `undefined` rather than a number.
pub fn format_comparison(comparison: &Comparison, title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {title} ===\n"));
    out.push_str(&format!(
        "{} by {} ({} entries)\n\n",
        comparison.metric,
        comparison.key_column,
        comparison.entries.len()
    ));

    out.push_str(
        format!(
            "{:<KEY_WIDTH$} {:>12} {:>12} {:>12} {:>12}\n",
            comparison.key_column, "baseline", "comparison", "abs_change", "pct_change"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<KEY_WIDTH$} {:-<12} {:-<12} {:-<12} {:-<12}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for e in &comparison.entries {
        out.push_str(
            format!(
                "{:<KEY_WIDTH$} {:>12.2} {:>12.2} {:>12.2} {:>12}\n",
                truncate(&e.group, KEY_WIDTH),
                e.baseline,
                e.comparison,
                e.abs_change,
                fmt_pct(e.pct_change),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the top risers and fallers of a ranked comparison.
pub fn format_rankings(rankings: &Rankings, metric: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Top risers by {metric} change:\n"));
    for e in &rankings.risers {
        out.push_str(&format!(
            "  {:<KEY_WIDTH$} {:>10}  ({:.2} to {:.2})\n",
            truncate(&e.group, KEY_WIDTH),
            fmt_pct(e.pct_change),
            e.baseline,
            e.comparison,
        ));
    }

    out.push_str(&format!("Top fallers by {metric} change:\n"));
    for e in &rankings.fallers {
        out.push_str(&format!(
            "  {:<KEY_WIDTH$} {:>10}  ({:.2} to {:.2})\n",
            truncate(&e.group, KEY_WIDTH),
            fmt_pct(e.pct_change),
            e.baseline,
            e.comparison,
        ));
    }

    out
}

/// Format the high and low ends of a column ranking.
pub fn format_column_rankings(rankings: &ColumnRankings, value_label: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("Highest {value_label}:\n"));
    for (group, value) in &rankings.top {
        out.push_str(&format!(
            "  {:<KEY_WIDTH$} {value:>10.2}\n",
            truncate(group, KEY_WIDTH)
        ));
    }

    out.push_str(&format!("Lowest {value_label}:\n"));
    for (group, value) in &rankings.bottom {
        out.push_str(&format!(
            "  {:<KEY_WIDTH$} {value:>10.2}\n",
            truncate(group, KEY_WIDTH)
        ));
    }

    out
}

/// One-line numeric summary.
pub fn format_summary_stats(stats: &SummaryStats, label: &str) -> String {
    format!(
        "{label}: n={} mean={:.2} std={} min={:.2} max={:.2}\n",
        stats.count,
        stats.mean,
        stats
            .std
            .map(|s| format!("{s:.2}"))
            .unwrap_or_else(|| "-".to_string()),
        stats.min,
        stats.max,
    )
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Number(v) => format!("{v:.2}"),
        Value::Missing => "-".to_string(),
        other => other.to_string(),
    }
}

fn fmt_pct(pct: Option<f64>) -> String {
    match pct {
        Some(v) => format!("{v:+.2}%"),
        None => "undefined".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
