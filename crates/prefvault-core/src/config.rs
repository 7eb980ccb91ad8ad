//! Configuration from environment variables

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::prelude::*;
use prefvault::settings::{GeneralSettings, SettingsDefaults, Theme};
use prefvault_adapter_sqlite::SqliteOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefsConfig {
	/// Directory holding the database file
	pub db_dir: PathBuf,
	pub max_connections: u32,
	pub busy_timeout_ms: u64,
	pub default_language: String,
	pub default_currency: String,
	pub default_timezone: String,
	pub default_theme: Theme,
}

impl Default for PrefsConfig {
	fn default() -> Self {
		let general = GeneralSettings::default();
		Self {
			db_dir: PathBuf::from("./data"),
			max_connections: 5,
			busy_timeout_ms: 5000,
			default_language: general.language,
			default_currency: general.currency,
			default_timezone: general.timezone,
			default_theme: general.theme,
		}
	}
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> PvResult<T> {
	value.trim().parse().map_err(|_| Error::ConfigError(format!("Invalid {}: {:?}", key, value)))
}

impl PrefsConfig {
	/// Read configuration from the process environment
	pub fn from_env() -> PvResult<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Read configuration through an arbitrary variable lookup
	///
	/// Missing or empty variables keep their default value.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PvResult<Self> {
		let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let mut config = Self::default();

		if let Some(db_dir) = get("DB_DIR") {
			config.db_dir = PathBuf::from(db_dir);
		}
		if let Some(value) = get("DB_MAX_CONNECTIONS") {
			config.max_connections = parse_var("DB_MAX_CONNECTIONS", &value)?;
			if config.max_connections == 0 {
				return Err(Error::ConfigError("DB_MAX_CONNECTIONS must be at least 1".into()));
			}
		}
		if let Some(value) = get("DB_BUSY_TIMEOUT_MS") {
			config.busy_timeout_ms = parse_var("DB_BUSY_TIMEOUT_MS", &value)?;
		}
		if let Some(language) = get("DEFAULT_LANGUAGE") {
			config.default_language = language;
		}
		if let Some(currency) = get("DEFAULT_CURRENCY") {
			config.default_currency = currency;
		}
		if let Some(timezone) = get("DEFAULT_TIMEZONE") {
			config.default_timezone = timezone;
		}
		if let Some(value) = get("DEFAULT_THEME") {
			config.default_theme = parse_var("DEFAULT_THEME", &value)?;
		}

		debug!("Config: {:?}", config);
		Ok(config)
	}

	pub fn busy_timeout(&self) -> Duration {
		Duration::from_millis(self.busy_timeout_ms)
	}

	/// Pool options for the SQLite adapter opened in `db_dir`
	pub fn sqlite_options(&self) -> SqliteOptions {
		SqliteOptions { max_connections: self.max_connections, busy_timeout: self.busy_timeout() }
	}

	/// Defaults for lazily created settings rows
	pub fn defaults(&self) -> SettingsDefaults {
		SettingsDefaults {
			general: GeneralSettings {
				language: self.default_language.clone(),
				currency: self.default_currency.clone(),
				timezone: self.default_timezone.clone(),
				theme: self.default_theme,
				..GeneralSettings::default()
			},
			..SettingsDefaults::default()
		}
	}
}


// vim: ts=4
