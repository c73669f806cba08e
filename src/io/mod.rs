//! CSV input and output.
//!
//! - `load`: read CSVs into tables, with date-column parsing and sorting
//! - `export`: write tables back out as CSV
//! - `summary`: JSON run summaries for the prices family

pub mod export;
pub mod load;
pub mod summary;

pub use export::*;
pub use load::*;
pub use summary::*;
