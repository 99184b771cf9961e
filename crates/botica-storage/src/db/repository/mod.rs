//! Per-table SQL. Every function takes a `&Connection`, so it runs the same
//! way on a plain connection or inside a transaction.

pub mod evaluation;
pub mod patient;
pub mod recommendation;
pub mod user;

use crate::error::StorageError;

pub(crate) fn parse_timestamp(text: &str) -> Result<jiff::Timestamp, StorageError> {
    text.parse::<jiff::Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("bad timestamp {text:?}: {e}")))
}

pub(crate) fn parse_list(text: &str) -> Result<Vec<String>, StorageError> {
    Ok(serde_json::from_str(text)?)
}
