//! Daily price history from the Stooq CSV endpoint.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::info;

use crate::data::families::DATE_COLUMN;
use crate::error::AppError;
use crate::io::{parse_date_column, read_csv_table};
use crate::table::Table;

const BASE_URL: &str = "https://stooq.com/q/d/l/";

pub struct StooqClient {
    client: Client,
    suffix: Option<String>,
}

impl StooqClient {
    /// Build a client, picking up an optional `STOOQ_SUFFIX` (market suffix
    /// such as `us` or `uk`) from the environment or a `.env` file.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let suffix = std::env::var("STOOQ_SUFFIX")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Self {
            client: Client::new(),
            suffix,
        }
    }

    /// Fetch one symbol's daily OHLCV rows for an inclusive date range.
    pub fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Table, AppError> {
        let resolved = self.resolve_symbol(symbol);
        let d1 = start.format("%Y%m%d").to_string();
        let d2 = end.format("%Y%m%d").to_string();

        info!(symbol = resolved.as_str(), %start, %end, "fetching daily prices");
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("s", resolved.as_str()),
                ("d1", d1.as_str()),
                ("d2", d2.as_str()),
                ("i", "d"),
            ])
            .send()
            .map_err(|e| AppError::Fetch(format!("request for `{resolved}` failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Fetch(format!(
                "request for `{resolved}` failed with status {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::Fetch(format!("reading response for `{resolved}`: {e}")))?;
        table_from_body(&body, &resolved)
    }

    /// Lowercase the symbol and append the market suffix unless the caller
    /// already qualified it with one.
    fn resolve_symbol(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_ascii_lowercase();
        match &self.suffix {
            Some(suffix) if !symbol.contains('.') => format!("{symbol}.{suffix}"),
            _ => symbol,
        }
    }
}

/// Parse a response body into a dated price table. Stooq answers unknown
/// symbols with a short plain-text body, which shows up here as a CSV with
/// none of the expected columns.
fn table_from_body(body: &str, symbol: &str) -> Result<Table, AppError> {
    let table = read_csv_table(body.as_bytes(), symbol)
        .map_err(|e| AppError::Fetch(format!("unreadable response for `{symbol}`: {e}")))?;

    for required in [DATE_COLUMN, "Close"] {
        if !table.has_column(required) {
            return Err(AppError::Fetch(format!(
                "response for `{symbol}` has no `{required}` column (unknown symbol?)"
            )));
        }
    }

    let table = parse_date_column(&table, DATE_COLUMN, symbol)
        .map_err(|e| AppError::Fetch(format!("response for `{symbol}`: {e}")))?;
    if table.n_rows() == 0 {
        return Err(AppError::Fetch(format!(
            "no rows returned for `{symbol}` in the requested range"
        )));
    }
    Ok(table)
}
