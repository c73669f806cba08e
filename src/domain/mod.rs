//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - table cell values with an explicit missing marker (`Value`)
//! - closed date ranges for baseline/comparison slicing (`DateWindow`)

pub mod types;

pub use types::*;
