//! Data sources.
//!
//! - `families`: the fixed input files, raw headers, and canonical renames
//!   for each analysis family
//! - `stooq`: daily OHLCV price history from the Stooq CSV endpoint

pub mod families;
pub mod stooq;

pub use families::*;
pub use stooq::*;
