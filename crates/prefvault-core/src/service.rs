//! Preference service: settings and consent operations for one user at a time

use std::sync::Arc;

use crate::prelude::*;
use prefvault::consent::{ConsentRecord, ConsentType, ListConsentOptions, RecordConsent};
use prefvault::pref_adapter::PrefAdapter;
use prefvault::settings::{
	GeneralPatch, GeneralSettings, NotificationPatch, NotificationSettings, PrivacyPatch,
	PrivacySettings, Settings, SettingsDefaults, SettingsFields, SettingsKind, SettingsPatch,
	SettingsProfile,
};

/// Preference service - main interface for reading and changing user settings
/// and recording consent
///
/// Holds no state besides the adapter and the defaults used to create missing
/// settings rows, so it can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct PreferenceService {
	adapter: Arc<dyn PrefAdapter>,
	defaults: Arc<SettingsDefaults>,
}

impl PreferenceService {
	pub fn new(adapter: Arc<dyn PrefAdapter>, defaults: SettingsDefaults) -> Self {
		Self { adapter, defaults: Arc::new(defaults) }
	}

	pub fn defaults(&self) -> &SettingsDefaults {
		&self.defaults
	}

	// Settings
	//**********
	/// Get the settings of one kind, creating them with defaults if missing
	pub async fn get_settings(
		&self,
		user_id: UserId,
		kind: SettingsKind,
	) -> PvResult<SettingsProfile> {
		let profile =
			self.adapter.get_or_create_settings(user_id, &self.defaults.for_kind(kind)).await?;
		check_kind(&profile, kind)?;
		Ok(profile)
	}

	/// Apply a partial update; the kind is taken from the patch
	pub async fn update_settings(
		&self,
		user_id: UserId,
		patch: &SettingsPatch,
	) -> PvResult<SettingsProfile> {
		let kind = patch.kind();
		let profile = self
			.adapter
			.update_settings(user_id, &self.defaults.for_kind(kind), patch)
			.await?;
		check_kind(&profile, kind)?;
		Ok(profile)
	}

	async fn get_typed<T: SettingsFields>(&self, user_id: UserId) -> PvResult<Settings<T>> {
		self.get_settings(user_id, T::KIND).await?.try_into()
	}

	async fn update_typed<T: SettingsFields>(
		&self,
		user_id: UserId,
		patch: T::Patch,
	) -> PvResult<Settings<T>> {
		self.update_settings(user_id, &T::into_patch(patch)).await?.try_into()
	}

	pub async fn get_preferences(&self, user_id: UserId) -> PvResult<Settings<GeneralSettings>> {
		self.get_typed(user_id).await
	}

	pub async fn update_preferences(
		&self,
		user_id: UserId,
		patch: GeneralPatch,
	) -> PvResult<Settings<GeneralSettings>> {
		self.update_typed(user_id, patch).await
	}

	pub async fn get_notification_settings(
		&self,
		user_id: UserId,
	) -> PvResult<Settings<NotificationSettings>> {
		self.get_typed(user_id).await
	}

	pub async fn update_notification_settings(
		&self,
		user_id: UserId,
		patch: NotificationPatch,
	) -> PvResult<Settings<NotificationSettings>> {
		self.update_typed(user_id, patch).await
	}

	pub async fn get_privacy_settings(
		&self,
		user_id: UserId,
	) -> PvResult<Settings<PrivacySettings>> {
		self.get_typed(user_id).await
	}

	pub async fn update_privacy_settings(
		&self,
		user_id: UserId,
		patch: PrivacyPatch,
	) -> PvResult<Settings<PrivacySettings>> {
		self.update_typed(user_id, patch).await
	}

	// Consent
	//*********
	/// Record a grant or revoke. Every call appends a new record.
	pub async fn record_consent(
		&self,
		user_id: UserId,
		consent: &RecordConsent,
	) -> PvResult<ConsentRecord> {
		self.adapter.create_consent(user_id, consent).await
	}

	pub async fn grant(&self, user_id: UserId, consent_type: ConsentType) -> PvResult<ConsentRecord> {
		self.record_consent(user_id, &RecordConsent::new(consent_type, true)).await
	}

	pub async fn revoke(
		&self,
		user_id: UserId,
		consent_type: ConsentType,
	) -> PvResult<ConsentRecord> {
		self.record_consent(user_id, &RecordConsent::new(consent_type, false)).await
	}

	/// Full consent history, oldest first
	pub async fn consent_history(&self, user_id: UserId) -> PvResult<Vec<ConsentRecord>> {
		self.adapter.list_consents(user_id, &ListConsentOptions::default()).await
	}

	pub async fn consent_history_filtered(
		&self,
		user_id: UserId,
		opts: &ListConsentOptions,
	) -> PvResult<Vec<ConsentRecord>> {
		self.adapter.list_consents(user_id, opts).await
	}

	/// Current consent of one type. `None` if the user never recorded one.
	pub async fn latest_consent(
		&self,
		user_id: UserId,
		consent_type: ConsentType,
	) -> PvResult<Option<ConsentRecord>> {
		self.adapter.read_latest_consent(user_id, consent_type).await
	}

	/// Current consent of every type the user has recorded
	pub async fn consent_status(&self, user_id: UserId) -> PvResult<Vec<ConsentRecord>> {
		self.adapter.list_consent_status(user_id).await
	}

	// Users
	//*******
	/// Remove all settings and consent records of a user
	pub async fn delete_user_data(&self, user_id: UserId) -> PvResult<()> {
		self.adapter.delete_user_data(user_id).await
	}
}

fn check_kind(profile: &SettingsProfile, kind: SettingsKind) -> PvResult<()> {
	if profile.kind() == kind {
		Ok(())
	} else {
		error!("Adapter returned {} settings for a {} request", profile.kind(), kind);
		Err(Error::InvariantViolation(format!(
			"expected {} settings, got {}",
			kind,
			profile.kind()
		)))
	}
}

// vim: ts=4
