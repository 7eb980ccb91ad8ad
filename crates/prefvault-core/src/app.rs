//! App builder - assembles the preference service from configuration and an adapter

use std::sync::Arc;

use crate::config::PrefsConfig;
use crate::logging;
use crate::prelude::*;
use prefvault::pref_adapter::PrefAdapter;
use prefvault_adapter_sqlite::PrefAdapterSqlite;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub struct AppState {
	pub config: PrefsConfig,
	pub service: PreferenceService,
}

pub type App = Arc<AppState>;

#[derive(Debug)]
pub struct AppBuilder {
	config: PrefsConfig,
	pref_adapter: Option<Arc<dyn PrefAdapter>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		logging::init();
		AppBuilder { config: PrefsConfig::default(), pref_adapter: None }
	}

	// Opts
	pub fn config(&mut self, config: PrefsConfig) -> &mut Self {
		self.config = config;
		self
	}

	// Adapters
	/// Open the SQLite adapter in the configured `db_dir` with the configured pool options
	pub async fn open_sqlite_adapter(&mut self) -> PvResult<&mut Self> {
		let adapter =
			PrefAdapterSqlite::with_options(&self.config.db_dir, &self.config.sqlite_options())
				.await?;
		self.pref_adapter = Some(Arc::new(adapter));
		Ok(self)
	}

	pub fn pref_adapter(&mut self, pref_adapter: Arc<dyn PrefAdapter>) -> &mut Self {
		self.pref_adapter = Some(pref_adapter);
		self
	}

	pub fn build(&self) -> PvResult<App> {
		let Some(pref_adapter) = self.pref_adapter.clone() else {
			error!("FATAL: No preference adapter configured");
			return Err(Error::ConfigError("No preference adapter configured".into()));
		};

		let service = PreferenceService::new(pref_adapter, self.config.defaults());
		info!("Prefvault V{} ready (db dir {})", VERSION, self.config.db_dir.display());

		Ok(Arc::new(AppState { config: self.config.clone(), service }))
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
