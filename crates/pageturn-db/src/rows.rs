//! Conversions between stored columns and domain values.

use crate::error::{DbError, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(column: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| DbError::Decode {
        column,
        value: value.to_string(),
    })
}

/// Fixed-width UTC timestamp, so text order matches time order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub(crate) fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| DbError::Decode {
            column,
            value: value.to_string(),
        })
}

/// Search key for a title or name. Search patterns are folded the same way,
/// since SQLite `LOWER()` only folds ASCII letters.
pub(crate) fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// `(offset, limit)` for a `LIMIT`/`OFFSET` clause. Negative values are rejected.
pub(crate) fn page_bounds(offset: i64, limit: i64) -> Result<(u64, u64)> {
    let offset = u64::try_from(offset)
        .map_err(|_| DbError::Invalid(format!("offset must not be negative, got {offset}")))?;
    let limit = u64::try_from(limit)
        .map_err(|_| DbError::Invalid(format!("limit must not be negative, got {limit}")))?;
    Ok((offset, limit))
}
