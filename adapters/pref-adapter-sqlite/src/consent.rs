//! Consent ledger: append-only records, latest-per-type queries

use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use prefvault::consent::*;
use prefvault::prelude::*;
use prefvault::types::now;

const CONSENT_COLS: &str =
	"c_id, consent_type, granted, version, ip_address, user_agent, recorded_at";

fn row_to_consent(user_id: UserId, row: &SqliteRow) -> Result<ConsentRecord, sqlx::Error> {
	let consent_type: &str = row.try_get("consent_type")?;
	Ok(ConsentRecord {
		id: row.try_get("c_id")?,
		user_id,
		consent_type: consent_type.parse().map_err(|err| decode_err("consent_type", err))?,
		granted: row.try_get("granted")?,
		version: row.try_get("version")?,
		ip_address: row.try_get("ip_address")?,
		user_agent: row.try_get("user_agent")?,
		recorded_at: Timestamp(row.try_get("recorded_at")?),
	})
}

/// Append a consent record
pub(crate) async fn create(
	db: &SqlitePool,
	user_id: UserId,
	consent: &RecordConsent,
) -> PvResult<ConsentRecord> {
	let consent = consent.clone().validated()?;
	let recorded_at = now();

	let row = sqlx::query(
		"INSERT INTO consents (user_id, consent_type, granted, version, ip_address, user_agent,
		recorded_at) VALUES (?, ?, ?, ?, ?, ?, ?)
		RETURNING c_id",
	)
	.bind(user_id.to_string())
	.bind(consent.consent_type.as_str())
	.bind(consent.granted)
	.bind(consent.version.as_deref())
	.bind(consent.ip_address.as_deref())
	.bind(consent.user_agent.as_deref())
	.bind(recorded_at.0)
	.fetch_one(db)
	.await
	.map_err(db_err)?;
	let id: i64 = row.try_get("c_id").map_err(db_err)?;

	debug!(
		"Recorded consent {} for user {}: {} (granted={})",
		id, user_id, consent.consent_type, consent.granted
	);

	Ok(ConsentRecord {
		id,
		user_id,
		consent_type: consent.consent_type,
		granted: consent.granted,
		version: consent.version,
		ip_address: consent.ip_address,
		user_agent: consent.user_agent,
		recorded_at,
	})
}

/// Read the current record of a consent type
pub(crate) async fn read_latest(
	db: &SqlitePool,
	user_id: UserId,
	consent_type: ConsentType,
) -> PvResult<Option<ConsentRecord>> {
	let res = sqlx::query(&format!(
		"SELECT {CONSENT_COLS} FROM consents WHERE user_id=? AND consent_type=?
		ORDER BY recorded_at DESC, c_id DESC LIMIT 1"
	))
	.bind(user_id.to_string())
	.bind(consent_type.as_str())
	.fetch_optional(db)
	.await;

	map_opt(res, |row| row_to_consent(user_id, &row))
}

/// List records oldest first
///
/// With a limit, the most recent `limit` records are selected first and then
/// returned in ascending order.
pub(crate) async fn list(
	db: &SqlitePool,
	user_id: UserId,
	opts: &ListConsentOptions,
) -> PvResult<Vec<ConsentRecord>> {
	let user_key = user_id.to_string();
	let mut query = QueryBuilder::<Sqlite>::new(format!(
		"SELECT {CONSENT_COLS} FROM (SELECT {CONSENT_COLS} FROM consents WHERE user_id="
	));
	query.push_bind(user_key.as_str());
	if let Some(consent_type) = opts.consent_type {
		query.push(" AND consent_type=").push_bind(consent_type.as_str());
	}
	// SQLite treats a negative limit as unbounded
	query
		.push(" ORDER BY recorded_at DESC, c_id DESC LIMIT ")
		.push_bind(opts.limit.map_or(-1, i64::from));
	query.push(") ORDER BY recorded_at, c_id");

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(|row| row_to_consent(user_id, row)))
}

/// List the current record of every recorded consent type, in type order
pub(crate) async fn list_status(db: &SqlitePool, user_id: UserId) -> PvResult<Vec<ConsentRecord>> {
	let res = sqlx::query(&format!(
		"SELECT {CONSENT_COLS} FROM (
			SELECT {CONSENT_COLS}, ROW_NUMBER() OVER (
				PARTITION BY consent_type ORDER BY recorded_at DESC, c_id DESC
			) AS rn
			FROM consents WHERE user_id=?
		) WHERE rn=1"
	))
	.bind(user_id.to_string())
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let mut records = collect_res(res.iter().map(|row| row_to_consent(user_id, row)))?;
	records.sort_by_key(|record| record.consent_type);

	Ok(records)
}

/// Remove every consent record of a user
pub(crate) async fn delete_for_user(conn: &mut SqliteConnection, user_id: UserId) -> PvResult<u64> {
	let res = sqlx::query("DELETE FROM consents WHERE user_id=?")
		.bind(user_id.to_string())
		.execute(&mut *conn)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected())
}

// vim: ts=4
