//! Settings rows: race-safe get-or-create and partial updates
//!
//! Creation is always a conditional insert (`ON CONFLICT(user_id) DO NOTHING`)
//! followed by a read, never check-then-insert. The per-kind primary key on
//! `user_id` is the only thing allowed to decide which concurrent creator wins.

use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, sqlite::SqliteRow};

use crate::utils::*;
use prefvault::prelude::*;
use prefvault::settings::*;
use prefvault::types::now;

fn table(kind: SettingsKind) -> &'static str {
	match kind {
		SettingsKind::General => "settings_general",
		SettingsKind::Notification => "settings_notification",
		SettingsKind::Privacy => "settings_privacy",
	}
}

fn select_sql(kind: SettingsKind) -> &'static str {
	match kind {
		SettingsKind::General => {
			"SELECT language, currency, timezone, theme, transaction_pin_enabled, biometric_enabled,
			created_at, updated_at
			FROM settings_general WHERE user_id=?"
		}
		SettingsKind::Notification => {
			"SELECT email_enabled, email_transaction_alerts, email_security_alerts, email_marketing,
			email_product_updates, sms_enabled, sms_transaction_alerts, sms_security_alerts,
			sms_marketing, push_enabled, push_transaction_alerts, push_security_alerts, push_marketing,
			created_at, updated_at
			FROM settings_notification WHERE user_id=?"
		}
		SettingsKind::Privacy => {
			"SELECT profile_visible, show_email, show_phone, show_transaction_history,
			allow_data_collection, allow_analytics, allow_third_party_sharing,
			created_at, updated_at
			FROM settings_privacy WHERE user_id=?"
		}
	}
}

fn row_to_data(kind: SettingsKind, row: &SqliteRow) -> Result<SettingsData, sqlx::Error> {
	Ok(match kind {
		SettingsKind::General => {
			let theme: &str = row.try_get("theme")?;
			SettingsData::General(GeneralSettings {
				language: row.try_get("language")?,
				currency: row.try_get("currency")?,
				timezone: row.try_get("timezone")?,
				theme: theme.parse().map_err(|err| decode_err("theme", err))?,
				transaction_pin_enabled: row.try_get("transaction_pin_enabled")?,
				biometric_enabled: row.try_get("biometric_enabled")?,
			})
		}
		SettingsKind::Notification => SettingsData::Notification(NotificationSettings {
			email_enabled: row.try_get("email_enabled")?,
			email_transaction_alerts: row.try_get("email_transaction_alerts")?,
			email_security_alerts: row.try_get("email_security_alerts")?,
			email_marketing: row.try_get("email_marketing")?,
			email_product_updates: row.try_get("email_product_updates")?,
			sms_enabled: row.try_get("sms_enabled")?,
			sms_transaction_alerts: row.try_get("sms_transaction_alerts")?,
			sms_security_alerts: row.try_get("sms_security_alerts")?,
			sms_marketing: row.try_get("sms_marketing")?,
			push_enabled: row.try_get("push_enabled")?,
			push_transaction_alerts: row.try_get("push_transaction_alerts")?,
			push_security_alerts: row.try_get("push_security_alerts")?,
			push_marketing: row.try_get("push_marketing")?,
		}),
		SettingsKind::Privacy => SettingsData::Privacy(PrivacySettings {
			profile_visible: row.try_get("profile_visible")?,
			show_email: row.try_get("show_email")?,
			show_phone: row.try_get("show_phone")?,
			show_transaction_history: row.try_get("show_transaction_history")?,
			allow_data_collection: row.try_get("allow_data_collection")?,
			allow_analytics: row.try_get("allow_analytics")?,
			allow_third_party_sharing: row.try_get("allow_third_party_sharing")?,
		}),
	})
}

/// Read the row of one kind
pub(crate) async fn read(
	conn: &mut SqliteConnection,
	user_id: UserId,
	kind: SettingsKind,
) -> PvResult<Option<SettingsProfile>> {
	let res = sqlx::query(select_sql(kind))
		.bind(user_id.to_string())
		.fetch_optional(&mut *conn)
		.await;

	map_opt(res, |row| {
		Ok(SettingsProfile {
			user_id,
			settings: row_to_data(kind, &row)?,
			created_at: Timestamp(row.try_get("created_at")?),
			updated_at: Timestamp(row.try_get("updated_at")?),
		})
	})
}

/// Insert the default row unless one exists. Returns true if this call created it.
async fn insert_defaults(
	conn: &mut SqliteConnection,
	user_id: UserId,
	defaults: &SettingsData,
	ts: Timestamp,
) -> PvResult<bool> {
	let user_key = user_id.to_string();
	let query = match defaults {
		SettingsData::General(s) => sqlx::query(
			"INSERT INTO settings_general (user_id, language, currency, timezone, theme,
			transaction_pin_enabled, biometric_enabled, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(user_id) DO NOTHING",
		)
		.bind(user_key.as_str())
		.bind(s.language.as_str())
		.bind(s.currency.as_str())
		.bind(s.timezone.as_str())
		.bind(s.theme.as_str())
		.bind(s.transaction_pin_enabled)
		.bind(s.biometric_enabled),
		SettingsData::Notification(s) => sqlx::query(
			"INSERT INTO settings_notification (user_id,
			email_enabled, email_transaction_alerts, email_security_alerts, email_marketing,
			email_product_updates, sms_enabled, sms_transaction_alerts, sms_security_alerts,
			sms_marketing, push_enabled, push_transaction_alerts, push_security_alerts,
			push_marketing, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(user_id) DO NOTHING",
		)
		.bind(user_key.as_str())
		.bind(s.email_enabled)
		.bind(s.email_transaction_alerts)
		.bind(s.email_security_alerts)
		.bind(s.email_marketing)
		.bind(s.email_product_updates)
		.bind(s.sms_enabled)
		.bind(s.sms_transaction_alerts)
		.bind(s.sms_security_alerts)
		.bind(s.sms_marketing)
		.bind(s.push_enabled)
		.bind(s.push_transaction_alerts)
		.bind(s.push_security_alerts)
		.bind(s.push_marketing),
		SettingsData::Privacy(s) => sqlx::query(
			"INSERT INTO settings_privacy (user_id, profile_visible, show_email, show_phone,
			show_transaction_history, allow_data_collection, allow_analytics,
			allow_third_party_sharing, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(user_id) DO NOTHING",
		)
		.bind(user_key.as_str())
		.bind(s.profile_visible)
		.bind(s.show_email)
		.bind(s.show_phone)
		.bind(s.show_transaction_history)
		.bind(s.allow_data_collection)
		.bind(s.allow_analytics)
		.bind(s.allow_third_party_sharing),
	};

	let res = query.bind(ts.0).bind(ts.0).execute(&mut *conn).await.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}

fn missing_row(user_id: UserId, kind: SettingsKind) -> Error {
	error!("{} settings row of user {} missing after conditional insert", kind, user_id);
	Error::InvariantViolation(format!("{} settings row missing for user {}", kind, user_id))
}

/// Return the row of `defaults.kind()`, creating it from `defaults` if absent
pub(crate) async fn get_or_create(
	db: &SqlitePool,
	user_id: UserId,
	defaults: &SettingsData,
) -> PvResult<SettingsProfile> {
	let kind = defaults.kind();
	let mut conn = db.acquire().await.map_err(db_err)?;

	// Fast path: plain read, no write lock
	if let Some(profile) = read(&mut conn, user_id, kind).await? {
		return Ok(profile);
	}

	if insert_defaults(&mut conn, user_id, defaults, now()).await? {
		info!("Created default {} settings for user {}", kind, user_id);
	} else {
		debug!("{} settings for user {} created concurrently", kind, user_id);
	}

	read(&mut conn, user_id, kind).await?.ok_or_else(|| missing_row(user_id, kind))
}

fn push_general<'a>(query: &mut QueryBuilder<'a, Sqlite>, p: &'a GeneralPatch) -> bool {
	let mut has_updates = false;
	has_updates = push_patch!(query, has_updates, "language", &p.language, |v| v.as_str());
	has_updates = push_patch!(query, has_updates, "currency", &p.currency, |v| v.as_str());
	has_updates = push_patch!(query, has_updates, "timezone", &p.timezone, |v| v.as_str());
	has_updates = push_patch!(query, has_updates, "theme", &p.theme, |v| v.as_str());
	has_updates =
		push_patch!(query, has_updates, "transaction_pin_enabled", &p.transaction_pin_enabled);
	push_patch!(query, has_updates, "biometric_enabled", &p.biometric_enabled)
}

fn push_notification<'a>(query: &mut QueryBuilder<'a, Sqlite>, p: &'a NotificationPatch) -> bool {
	let mut has_updates = false;
	has_updates = push_patch!(query, has_updates, "email_enabled", &p.email_enabled);
	has_updates =
		push_patch!(query, has_updates, "email_transaction_alerts", &p.email_transaction_alerts);
	has_updates =
		push_patch!(query, has_updates, "email_security_alerts", &p.email_security_alerts);
	has_updates = push_patch!(query, has_updates, "email_marketing", &p.email_marketing);
	has_updates =
		push_patch!(query, has_updates, "email_product_updates", &p.email_product_updates);
	has_updates = push_patch!(query, has_updates, "sms_enabled", &p.sms_enabled);
	has_updates =
		push_patch!(query, has_updates, "sms_transaction_alerts", &p.sms_transaction_alerts);
	has_updates = push_patch!(query, has_updates, "sms_security_alerts", &p.sms_security_alerts);
	has_updates = push_patch!(query, has_updates, "sms_marketing", &p.sms_marketing);
	has_updates = push_patch!(query, has_updates, "push_enabled", &p.push_enabled);
	has_updates =
		push_patch!(query, has_updates, "push_transaction_alerts", &p.push_transaction_alerts);
	has_updates = push_patch!(query, has_updates, "push_security_alerts", &p.push_security_alerts);
	push_patch!(query, has_updates, "push_marketing", &p.push_marketing)
}

fn push_privacy<'a>(query: &mut QueryBuilder<'a, Sqlite>, p: &'a PrivacyPatch) -> bool {
	let mut has_updates = false;
	has_updates = push_patch!(query, has_updates, "profile_visible", &p.profile_visible);
	has_updates = push_patch!(query, has_updates, "show_email", &p.show_email);
	has_updates = push_patch!(query, has_updates, "show_phone", &p.show_phone);
	has_updates =
		push_patch!(query, has_updates, "show_transaction_history", &p.show_transaction_history);
	has_updates =
		push_patch!(query, has_updates, "allow_data_collection", &p.allow_data_collection);
	has_updates = push_patch!(query, has_updates, "allow_analytics", &p.allow_analytics);
	push_patch!(query, has_updates, "allow_third_party_sharing", &p.allow_third_party_sharing)
}

/// Apply a patch, creating the row from `defaults` first if it is absent
///
/// Runs in one transaction. Only patched columns are written, so concurrent
/// patches to disjoint fields both survive; same-field patches are last write wins.
pub(crate) async fn update(
	db: &SqlitePool,
	user_id: UserId,
	defaults: &SettingsData,
	patch: &SettingsPatch,
) -> PvResult<SettingsProfile> {
	let kind = patch.kind();
	if defaults.kind() != kind {
		error!("settings defaults kind {} does not match patch kind {}", defaults.kind(), kind);
		return Err(Error::InvariantViolation(format!(
			"defaults of kind {} used for {} patch",
			defaults.kind(),
			kind
		)));
	}

	let ts = now();
	let user_key = user_id.to_string();
	let mut tx = db.begin().await.map_err(db_err)?;

	if insert_defaults(&mut tx, user_id, defaults, ts).await? {
		info!("Created default {} settings for user {} on update", kind, user_id);
	}

	let mut query = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET updated_at=", table(kind)));
	query.push_bind(ts.0);
	let has_updates = match patch {
		SettingsPatch::General(p) => push_general(&mut query, p),
		SettingsPatch::Notification(p) => push_notification(&mut query, p),
		SettingsPatch::Privacy(p) => push_privacy(&mut query, p),
	};
	query.push(" WHERE user_id=").push_bind(user_key.as_str());

	let res = query.build().execute(&mut *tx).await.map_err(db_err)?;
	if res.rows_affected() == 0 {
		return Err(missing_row(user_id, kind));
	}

	let profile = read(&mut tx, user_id, kind).await?.ok_or_else(|| missing_row(user_id, kind))?;
	tx.commit().await.map_err(db_err)?;

	if has_updates {
		debug!("Updated {} settings for user {}", kind, user_id);
	} else {
		debug!("Empty {} settings patch for user {}, touched updated_at", kind, user_id);
	}

	Ok(profile)
}

/// Remove the rows of all kinds for a user
pub(crate) async fn delete_for_user(conn: &mut SqliteConnection, user_id: UserId) -> PvResult<()> {
	let user_key = user_id.to_string();
	for kind in SettingsKind::ALL {
		sqlx::query(&format!("DELETE FROM {} WHERE user_id=?", table(kind)))
			.bind(user_key.as_str())
			.execute(&mut *conn)
			.await
			.map_err(db_err)?;
	}
	Ok(())
}

// vim: ts=4
