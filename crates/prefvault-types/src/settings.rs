//! Settings kinds, their field sets and patches
//!
//! Each user has at most one row per [`SettingsKind`]. The row content is one
//! of the typed field sets ([`GeneralSettings`], [`NotificationSettings`],
//! [`PrivacySettings`]), carried across the adapter boundary as
//! [`SettingsData`]. Partial updates use the matching patch type, where every
//! field is a [`Patch`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::prelude::*;

/// Settings kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsKind {
	General,
	Notification,
	Privacy,
}

impl SettingsKind {
	pub const ALL: [SettingsKind; 3] =
		[SettingsKind::General, SettingsKind::Notification, SettingsKind::Privacy];

	pub fn as_str(&self) -> &'static str {
		match self {
			SettingsKind::General => "general",
			SettingsKind::Notification => "notification",
			SettingsKind::Privacy => "privacy",
		}
	}
}

impl std::fmt::Display for SettingsKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SettingsKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"general" | "preference" | "preferences" => Ok(SettingsKind::General),
			"notification" | "notifications" => Ok(SettingsKind::Notification),
			"privacy" => Ok(SettingsKind::Privacy),
			_ => Err(Error::ValidationError(format!("Unknown settings kind: {}", s))),
		}
	}
}

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	Light,
	Dark,
	Auto,
}

impl Theme {
	pub fn as_str(&self) -> &'static str {
		match self {
			Theme::Light => "light",
			Theme::Dark => "dark",
			Theme::Auto => "auto",
		}
	}
}

impl FromStr for Theme {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"light" => Ok(Theme::Light),
			"dark" => Ok(Theme::Dark),
			"auto" => Ok(Theme::Auto),
			_ => Err(Error::ValidationError(format!("Unknown theme: {}", s))),
		}
	}
}

// General //
//*********//
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSettings {
	pub language: String,
	pub currency: String,
	pub timezone: String,
	pub theme: Theme,
	pub transaction_pin_enabled: bool,
	pub biometric_enabled: bool,
}

impl Default for GeneralSettings {
	fn default() -> Self {
		Self {
			language: "en".into(),
			currency: "NGN".into(),
			timezone: "Africa/Lagos".into(),
			theme: Theme::Light,
			transaction_pin_enabled: true,
			biometric_enabled: false,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralPatch {
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub language: Patch<String>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub currency: Patch<String>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub timezone: Patch<String>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub theme: Patch<Theme>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub transaction_pin_enabled: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub biometric_enabled: Patch<bool>,
}

// Notification //
//**************//
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
	pub email_enabled: bool,
	pub email_transaction_alerts: bool,
	pub email_security_alerts: bool,
	pub email_marketing: bool,
	pub email_product_updates: bool,

	pub sms_enabled: bool,
	pub sms_transaction_alerts: bool,
	pub sms_security_alerts: bool,
	pub sms_marketing: bool,

	pub push_enabled: bool,
	pub push_transaction_alerts: bool,
	pub push_security_alerts: bool,
	pub push_marketing: bool,
}

impl Default for NotificationSettings {
	fn default() -> Self {
		Self {
			email_enabled: true,
			email_transaction_alerts: true,
			email_security_alerts: true,
			email_marketing: false,
			email_product_updates: true,
			sms_enabled: true,
			sms_transaction_alerts: true,
			sms_security_alerts: true,
			sms_marketing: false,
			push_enabled: true,
			push_transaction_alerts: true,
			push_security_alerts: true,
			push_marketing: false,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationPatch {
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub email_enabled: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub email_transaction_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub email_security_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub email_marketing: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub email_product_updates: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub sms_enabled: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub sms_transaction_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub sms_security_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub sms_marketing: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub push_enabled: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub push_transaction_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub push_security_alerts: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub push_marketing: Patch<bool>,
}

// Privacy //
//*********//
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
	pub profile_visible: bool,
	pub show_email: bool,
	pub show_phone: bool,
	pub show_transaction_history: bool,

	pub allow_data_collection: bool,
	pub allow_analytics: bool,
	pub allow_third_party_sharing: bool,
}

impl Default for PrivacySettings {
	fn default() -> Self {
		Self {
			profile_visible: false,
			show_email: false,
			show_phone: false,
			show_transaction_history: false,
			allow_data_collection: true,
			allow_analytics: true,
			allow_third_party_sharing: false,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrivacyPatch {
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub profile_visible: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub show_email: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub show_phone: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub show_transaction_history: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub allow_data_collection: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub allow_analytics: Patch<bool>,
	#[serde(skip_serializing_if = "Patch::is_undefined")]
	pub allow_third_party_sharing: Patch<bool>,
}

// Kind-tagged wrappers //
//**********************//
/// Content of one settings row, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SettingsData {
	General(GeneralSettings),
	Notification(NotificationSettings),
	Privacy(PrivacySettings),
}

impl SettingsData {
	pub fn kind(&self) -> SettingsKind {
		match self {
			SettingsData::General(_) => SettingsKind::General,
			SettingsData::Notification(_) => SettingsKind::Notification,
			SettingsData::Privacy(_) => SettingsKind::Privacy,
		}
	}
}

/// Partial update of one settings row, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SettingsPatch {
	General(GeneralPatch),
	Notification(NotificationPatch),
	Privacy(PrivacyPatch),
}

impl SettingsPatch {
	pub fn kind(&self) -> SettingsKind {
		match self {
			SettingsPatch::General(_) => SettingsKind::General,
			SettingsPatch::Notification(_) => SettingsKind::Notification,
			SettingsPatch::Privacy(_) => SettingsKind::Privacy,
		}
	}

	/// A patch of the given kind that leaves every field unchanged
	pub fn empty(kind: SettingsKind) -> Self {
		match kind {
			SettingsKind::General => SettingsPatch::General(GeneralPatch::default()),
			SettingsKind::Notification => SettingsPatch::Notification(NotificationPatch::default()),
			SettingsKind::Privacy => SettingsPatch::Privacy(PrivacyPatch::default()),
		}
	}
}

/// A stored settings row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsProfile {
	pub user_id: UserId,
	pub settings: SettingsData,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl SettingsProfile {
	pub fn kind(&self) -> SettingsKind {
		self.settings.kind()
	}
}

/// Defaults used when a settings row is created lazily
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDefaults {
	pub general: GeneralSettings,
	pub notification: NotificationSettings,
	pub privacy: PrivacySettings,
}

impl SettingsDefaults {
	pub fn for_kind(&self, kind: SettingsKind) -> SettingsData {
		match kind {
			SettingsKind::General => SettingsData::General(self.general.clone()),
			SettingsKind::Notification => SettingsData::Notification(self.notification.clone()),
			SettingsKind::Privacy => SettingsData::Privacy(self.privacy.clone()),
		}
	}
}

// Typed access //
//**************//
/// Binds a field set to its kind and patch type
pub trait SettingsFields: Sized {
	const KIND: SettingsKind;
	type Patch;

	fn from_data(data: SettingsData) -> Option<Self>;
	fn into_patch(patch: Self::Patch) -> SettingsPatch;
}

impl SettingsFields for GeneralSettings {
	const KIND: SettingsKind = SettingsKind::General;
	type Patch = GeneralPatch;

	fn from_data(data: SettingsData) -> Option<Self> {
		match data {
			SettingsData::General(s) => Some(s),
			_ => None,
		}
	}

	fn into_patch(patch: GeneralPatch) -> SettingsPatch {
		SettingsPatch::General(patch)
	}
}

impl SettingsFields for NotificationSettings {
	const KIND: SettingsKind = SettingsKind::Notification;
	type Patch = NotificationPatch;

	fn from_data(data: SettingsData) -> Option<Self> {
		match data {
			SettingsData::Notification(s) => Some(s),
			_ => None,
		}
	}

	fn into_patch(patch: NotificationPatch) -> SettingsPatch {
		SettingsPatch::Notification(patch)
	}
}

impl SettingsFields for PrivacySettings {
	const KIND: SettingsKind = SettingsKind::Privacy;
	type Patch = PrivacyPatch;

	fn from_data(data: SettingsData) -> Option<Self> {
		match data {
			SettingsData::Privacy(s) => Some(s),
			_ => None,
		}
	}

	fn into_patch(patch: PrivacyPatch) -> SettingsPatch {
		SettingsPatch::Privacy(patch)
	}
}

/// A settings row with its typed field set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings<T> {
	pub user_id: UserId,
	#[serde(flatten)]
	pub settings: T,
	pub created_at: Timestamp,
	pub updated_at: Timestamp,
}

impl<T: SettingsFields> TryFrom<SettingsProfile> for Settings<T> {
	type Error = Error;

	fn try_from(profile: SettingsProfile) -> Result<Self, Self::Error> {
		let kind = profile.kind();
		let settings = T::from_data(profile.settings).ok_or_else(|| {
			Error::InvariantViolation(format!("Expected {} settings, got {}", T::KIND, kind))
		})?;
		Ok(Settings {
			user_id: profile.user_id,
			settings,
			created_at: profile.created_at,
			updated_at: profile.updated_at,
		})
	}
}


// vim: ts=4
