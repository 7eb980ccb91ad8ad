//! Database schema initialization
//!
//! Creates tables and indexes idempotently. The primary keys on the settings
//! tables are what guarantee at most one row per (user, kind).

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Settings
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings_general (
		user_id text NOT NULL,
		language text NOT NULL,
		currency text NOT NULL,
		timezone text NOT NULL,
		theme text NOT NULL,			-- 'light', 'dark', 'auto'
		transaction_pin_enabled boolean NOT NULL,
		biometric_enabled boolean NOT NULL,
		created_at integer NOT NULL,
		updated_at integer NOT NULL,
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings_notification (
		user_id text NOT NULL,
		email_enabled boolean NOT NULL,
		email_transaction_alerts boolean NOT NULL,
		email_security_alerts boolean NOT NULL,
		email_marketing boolean NOT NULL,
		email_product_updates boolean NOT NULL,
		sms_enabled boolean NOT NULL,
		sms_transaction_alerts boolean NOT NULL,
		sms_security_alerts boolean NOT NULL,
		sms_marketing boolean NOT NULL,
		push_enabled boolean NOT NULL,
		push_transaction_alerts boolean NOT NULL,
		push_security_alerts boolean NOT NULL,
		push_marketing boolean NOT NULL,
		created_at integer NOT NULL,
		updated_at integer NOT NULL,
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings_privacy (
		user_id text NOT NULL,
		profile_visible boolean NOT NULL,
		show_email boolean NOT NULL,
		show_phone boolean NOT NULL,
		show_transaction_history boolean NOT NULL,
		allow_data_collection boolean NOT NULL,
		allow_analytics boolean NOT NULL,
		allow_third_party_sharing boolean NOT NULL,
		created_at integer NOT NULL,
		updated_at integer NOT NULL,
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Consent ledger
	//****************
	// AUTOINCREMENT keeps c_id strictly increasing even after deletes
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS consents (
		c_id integer PRIMARY KEY AUTOINCREMENT,
		user_id text NOT NULL,
		consent_type text NOT NULL,
		granted boolean NOT NULL,
		version varchar(20),
		ip_address varchar(45),
		user_agent varchar(500),
		recorded_at integer NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_consents_user_type
		ON consents(user_id, consent_type, recorded_at, c_id)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_consents_user_time ON consents(user_id, recorded_at, c_id)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
