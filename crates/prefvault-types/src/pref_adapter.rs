//! Storage adapter contract for settings rows and the consent ledger

use async_trait::async_trait;
use std::fmt::Debug;

use crate::consent::{ConsentRecord, ConsentType, ListConsentOptions, RecordConsent};
use crate::prelude::*;
use crate::settings::{SettingsData, SettingsKind, SettingsPatch, SettingsProfile};

/// A `Prefvault` storage adapter
///
/// Every storage backend is required to implement this trait. An adapter owns
/// two stores: per-kind settings rows (at most one per user and kind, enforced
/// by a uniqueness constraint) and the append-only consent ledger.
///
/// Each method acts on exactly one store for one (user, kind/type) and holds
/// its connection or transaction only for the duration of the call.
#[async_trait]
pub trait PrefAdapter: Debug + Send + Sync {
	/// # Settings
	/// Reads the settings row of the given kind without creating it
	async fn read_settings(
		&self,
		user_id: UserId,
		kind: SettingsKind,
	) -> PvResult<Option<SettingsProfile>>;

	/// Returns the settings row of `defaults.kind()`, creating it from `defaults`
	/// if absent.
	///
	/// Safe under concurrent callers: exactly one row is ever created and no
	/// caller observes a uniqueness conflict.
	async fn get_or_create_settings(
		&self,
		user_id: UserId,
		defaults: &SettingsData,
	) -> PvResult<SettingsProfile>;

	/// Applies a patch, creating the row from `defaults` first if absent.
	///
	/// Only the fields present in the patch are written (last write wins per
	/// field). `updated_at` is refreshed even when the patch is empty.
	async fn update_settings(
		&self,
		user_id: UserId,
		defaults: &SettingsData,
		patch: &SettingsPatch,
	) -> PvResult<SettingsProfile>;

	/// # Consent ledger
	/// Appends a new consent record. Never updates existing records.
	async fn create_consent(
		&self,
		user_id: UserId,
		consent: &RecordConsent,
	) -> PvResult<ConsentRecord>;

	/// Reads the current record for (user, type): greatest `recorded_at`, then greatest `id`
	async fn read_latest_consent(
		&self,
		user_id: UserId,
		consent_type: ConsentType,
	) -> PvResult<Option<ConsentRecord>>;

	/// Lists consent records oldest first (`recorded_at`, then `id`)
	async fn list_consents(
		&self,
		user_id: UserId,
		opts: &ListConsentOptions,
	) -> PvResult<Vec<ConsentRecord>>;

	/// Lists the current record of every consent type the user has recorded
	async fn list_consent_status(&self, user_id: UserId) -> PvResult<Vec<ConsentRecord>>;

	/// # Users
	/// Removes every settings row and consent record of the user.
	///
	/// Called by the external user deletion flow only.
	async fn delete_user_data(&self, user_id: UserId) -> PvResult<()>;
}

// vim: ts=4
