//! SQLite storage adapter for Prefvault
//!
//! Stores one table per settings kind (keyed by `user_id`) and the consent
//! ledger in a single database file, opened in WAL mode.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::{path::Path, time::Duration};

use prefvault::{
	consent::{ConsentRecord, ConsentType, ListConsentOptions, RecordConsent},
	pref_adapter::PrefAdapter,
	prelude::*,
	settings::{SettingsData, SettingsKind, SettingsPatch, SettingsProfile},
};

mod consent;
mod schema;
mod settings;
mod utils;

use crate::utils::{db_err, inspect};

const DB_FILE: &str = "prefs.db";

/// Connection pool options
#[derive(Debug, Clone)]
pub struct SqliteOptions {
	pub max_connections: u32,
	/// How long a writer waits for the database lock before failing
	pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
	fn default() -> Self {
		Self { max_connections: 5, busy_timeout: Duration::from_millis(5000) }
	}
}

#[derive(Debug)]
pub struct PrefAdapterSqlite {
	db: SqlitePool,
}

impl PrefAdapterSqlite {
	/// Open (or create) the database in `dir` with default pool options
	pub async fn new(dir: impl AsRef<Path>) -> PvResult<Self> {
		Self::with_options(dir, &SqliteOptions::default()).await
	}

	pub async fn with_options(dir: impl AsRef<Path>, options: &SqliteOptions) -> PvResult<Self> {
		let dir = dir.as_ref();
		tokio::fs::create_dir_all(dir).await.inspect_err(|err| {
			error!("Cannot create database directory {}: {}", dir.display(), err);
		})?;
		let path = dir.join(DB_FILE);

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal)
			.synchronous(sqlite::SqliteSynchronous::Normal)
			.busy_timeout(options.busy_timeout);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(options.max_connections)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		info!("Preference database opened at {}", path.display());

		Ok(Self { db })
	}
}

#[async_trait]
impl PrefAdapter for PrefAdapterSqlite {
	// Settings
	//**********
	async fn read_settings(
		&self,
		user_id: UserId,
		kind: SettingsKind,
	) -> PvResult<Option<SettingsProfile>> {
		let mut conn = self.db.acquire().await.map_err(db_err)?;
		settings::read(&mut conn, user_id, kind).await
	}

	async fn get_or_create_settings(
		&self,
		user_id: UserId,
		defaults: &SettingsData,
	) -> PvResult<SettingsProfile> {
		settings::get_or_create(&self.db, user_id, defaults).await
	}

	async fn update_settings(
		&self,
		user_id: UserId,
		defaults: &SettingsData,
		patch: &SettingsPatch,
	) -> PvResult<SettingsProfile> {
		settings::update(&self.db, user_id, defaults, patch).await
	}

	// Consent ledger
	//****************
	async fn create_consent(
		&self,
		user_id: UserId,
		consent: &RecordConsent,
	) -> PvResult<ConsentRecord> {
		consent::create(&self.db, user_id, consent).await
	}

	async fn read_latest_consent(
		&self,
		user_id: UserId,
		consent_type: ConsentType,
	) -> PvResult<Option<ConsentRecord>> {
		consent::read_latest(&self.db, user_id, consent_type).await
	}

	async fn list_consents(
		&self,
		user_id: UserId,
		opts: &ListConsentOptions,
	) -> PvResult<Vec<ConsentRecord>> {
		consent::list(&self.db, user_id, opts).await
	}

	async fn list_consent_status(&self, user_id: UserId) -> PvResult<Vec<ConsentRecord>> {
		consent::list_status(&self.db, user_id).await
	}

	// Users
	//*******
	async fn delete_user_data(&self, user_id: UserId) -> PvResult<()> {
		let mut tx = self.db.begin().await.map_err(db_err)?;
		settings::delete_for_user(&mut tx, user_id).await?;
		let consents = consent::delete_for_user(&mut tx, user_id).await?;
		tx.commit().await.map_err(db_err)?;

		info!("Deleted preference data of user {} ({} consent records)", user_id, consents);
		Ok(())
	}
}

// vim: ts=4
