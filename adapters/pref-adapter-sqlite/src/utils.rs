//! Shared utilities for the SQLite adapter
//!
//! Helper macros and error mapping used by the settings and consent modules.

use prefvault::prelude::*;
use sqlx::sqlite::SqliteRow;

/// Appends `, <field>=?` for a present patch field
///
/// Evaluates to true if the field was added (for tracking has_updates).
/// The query must already contain at least one assignment.
macro_rules! push_patch {
	// For bindable values (strings, numbers, bools)
	($query:expr, $has_updates:expr, $field:literal, $patch:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Value(v) => {
				$query.push(concat!(", ", $field, "=")).push_bind(*v);
				true
			}
		}
	}};
	// For values that need conversion before binding
	($query:expr, $has_updates:expr, $field:literal, $patch:expr, |$v:ident| $convert:expr) => {{
		match $patch {
			Patch::Undefined => $has_updates,
			Patch::Value($v) => {
				$query.push(concat!(", ", $field, "=")).push_bind($convert);
				true
			}
		}
	}};
}

pub(crate) use push_patch;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Translate a database error
///
/// Uniqueness conflicts must never reach callers through the conditional
/// insert paths, so one showing up here is reported as an invariant violation.
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	match &err {
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
			error!("DB: unexpected uniqueness conflict: {:#?}", err);
			Error::InvariantViolation(format!("uniqueness conflict: {}", db_err.message()))
		}
		_ => {
			inspect(&err);
			Error::DbError
		}
	}
}

/// Map an optional single-row query result, translating SQL errors
pub(crate) fn map_opt<T, F>(row: Result<Option<SqliteRow>, sqlx::Error>, f: F) -> PvResult<Option<T>>
where
	F: FnOnce(SqliteRow) -> Result<T, sqlx::Error>,
{
	match row {
		Ok(Some(row)) => f(row).map(Some).map_err(db_err),
		Ok(None) => Ok(None),
		Err(err) => Err(db_err(err)),
	}
}

/// Collect an iterator of query results, translating errors
pub(crate) fn collect_res<T>(
	iter: impl Iterator<Item = Result<T, sqlx::Error>> + Unpin,
) -> PvResult<Vec<T>> {
	let mut items = Vec::new();
	for item in iter {
		items.push(item.map_err(db_err)?);
	}
	Ok(items)
}

/// Build a decode error for a column holding an unexpected value
pub(crate) fn decode_err(column: &str, err: Error) -> sqlx::Error {
	sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(err) }
}

// vim: ts=4
