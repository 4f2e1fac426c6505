//! Shared utilities for SQLite adapter
//!
//! Helper functions and error mapping utilities used across all domain modules.

use planbase_types::prelude::*;
use std::str::FromStr;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Log and collapse an sqlx error into `Error::DbError`
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

/// Collect an iterator of row mapping results, translating errors
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> PbResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.map_err(db_err)?);
	}
	Ok(items)
}

/// Parse a stored enum name, reporting failures as decode errors
pub(crate) fn decode_enum<T>(s: &str) -> Result<T, sqlx::Error>
where
	T: FromStr<Err = Error>,
{
	s.parse::<T>().map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Parse a stored JSON column
pub(crate) fn decode_json<T>(s: &str) -> Result<T, sqlx::Error>
where
	T: serde::de::DeserializeOwned,
{
	serde_json::from_str(s).map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Empty string is the stored form of an absent key part
pub(crate) fn none_if_empty(s: String) -> Option<Box<str>> {
	if s.is_empty() { None } else { Some(s.into_boxed_str()) }
}


// vim: ts=4
