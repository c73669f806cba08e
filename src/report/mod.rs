//! Terminal reporting.
//!
//! Formatting lives in one place so the table and stats code stays clean
//! and output changes are localized.

pub mod format;

pub use format::*;
