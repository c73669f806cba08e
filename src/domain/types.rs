//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - used in-memory by every pipeline stage
//! - exported to CSV for the visualization handoff
//! - constructed directly in tests

use chrono::NaiveDate;

/// A single table cell.
///
/// `Missing` is an explicit state distinct from zero: arithmetic over cells
/// treats it as absorbing, so any derived value that depends on a missing
/// input is itself missing. No silent zero-fill anywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Missing,
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Textual form used for join and group keys.
    ///
    /// `None` for missing cells, so they never form a key. Numbers render in
    /// their shortest form (`1.0` keys as `"1"`), dates as ISO.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::Number(v) => Some(format!("{v}")),
            Value::Text(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::Missing => None,
        }
    }
}

impl std::fmt::Display for Value {
    /// Serialized form used by CSV exports. Missing cells render empty.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Missing => Ok(()),
        }
    }
}

/// Convert a list of optional numbers into cells, mapping `None` to `Missing`.
pub fn number_values(values: Vec<Option<f64>>) -> Vec<Value> {
    values
        .into_iter()
        .map(|v| match v {
            Some(v) => Value::Number(v),
            None => Value::Missing,
        })
        .collect()
}

/// A closed date range used for baseline/comparison slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn label(&self) -> String {
        format!("{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_string_normalizes_numbers() {
        assert_eq!(Value::Number(1.0).key_string().unwrap(), "1");
        assert_eq!(Value::Number(1.5).key_string().unwrap(), "1.5");
        assert_eq!(Value::Text("1".to_string()).key_string().unwrap(), "1");
        assert!(Value::Missing.key_string().is_none());
    }

    #[test]
    fn missing_displays_empty() {
        assert_eq!(Value::Missing.to_string(), "");
        let d = NaiveDate::from_ymd_opt(2020, 3, 23).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2020-03-23");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = DateWindow::new(
            NaiveDate::from_ymd_opt(2020, 3, 23).unwrap(),
            NaiveDate::from_ymd_opt(2020, 4, 5).unwrap(),
        );
        assert!(w.contains(NaiveDate::from_ymd_opt(2020, 3, 23).unwrap()));
        assert!(w.contains(NaiveDate::from_ymd_opt(2020, 4, 5).unwrap()));
        assert!(!w.contains(NaiveDate::from_ymd_opt(2020, 4, 6).unwrap()));
    }
}
