//! Application error type shared across the pipeline.

use thiserror::Error;

/// Crate-level error with a process exit code attached.
///
/// Exit codes group the failure classes:
///
/// - `2`: bad input or usage (missing file, unknown column, malformed flag,
///   unwritable output)
/// - `3`: no valid data (unparseable dates, empty series after cleaning)
/// - `4`: remote fetch failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read '{path}': {detail}")]
    Load { path: String, detail: String },

    #[error("unknown column `{name}`")]
    Column { name: String },

    #[error("duplicate column `{name}`")]
    DuplicateColumn { name: String },

    #[error("invalid value for {name}: {detail}")]
    Arg { name: String, detail: String },

    #[error("table error: {0}")]
    Table(String),

    #[error("{context}: {detail}")]
    Parse { context: String, detail: String },

    #[error("{0}")]
    Series(String),

    #[error("failed to write '{path}': {detail}")]
    Export { path: String, detail: String },

    #[error("fetch failed: {0}")]
    Fetch(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Load { .. }
            | AppError::Column { .. }
            | AppError::DuplicateColumn { .. }
            | AppError::Arg { .. }
            | AppError::Table(_)
            | AppError::Export { .. } => 2,
            AppError::Parse { .. } | AppError::Series(_) => 3,
            AppError::Fetch(_) => 4,
        }
    }
}
