//! Consent ledger types
//!
//! Consent records are immutable. "Current consent" is never stored: it is the
//! record with the greatest `recorded_at` for a (user, consent type), with ties
//! broken by the creation-ordered `id`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::prelude::*;

pub const MAX_VERSION_LEN: usize = 20;
pub const MAX_IP_ADDRESS_LEN: usize = 45;
pub const MAX_USER_AGENT_LEN: usize = 500;

/// Consent type
///
/// Declaration order is the order used by consent status listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentType {
	TermsOfService,
	PrivacyPolicy,
	Marketing,
	DataSharing,
	ThirdPartySharing,
}

impl ConsentType {
	pub const ALL: [ConsentType; 5] = [
		ConsentType::TermsOfService,
		ConsentType::PrivacyPolicy,
		ConsentType::Marketing,
		ConsentType::DataSharing,
		ConsentType::ThirdPartySharing,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ConsentType::TermsOfService => "terms_of_service",
			ConsentType::PrivacyPolicy => "privacy_policy",
			ConsentType::Marketing => "marketing",
			ConsentType::DataSharing => "data_sharing",
			ConsentType::ThirdPartySharing => "third_party_sharing",
		}
	}
}

impl std::fmt::Display for ConsentType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ConsentType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ConsentType::ALL
			.into_iter()
			.find(|typ| typ.as_str() == s)
			.ok_or_else(|| Error::ValidationError(format!("Unknown consent type: {}", s)))
	}
}

/// A single, immutable consent action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
	/// Creation-ordered id
	pub id: i64,
	pub user_id: UserId,
	pub consent_type: ConsentType,
	pub granted: bool,
	pub version: Option<Box<str>>,
	pub ip_address: Option<Box<str>>,
	pub user_agent: Option<Box<str>>,
	pub recorded_at: Timestamp,
}

/// Input of a grant or revoke action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordConsent {
	pub consent_type: ConsentType,
	pub granted: bool,
	#[serde(default)]
	pub version: Option<Box<str>>,
	#[serde(default)]
	pub ip_address: Option<Box<str>>,
	#[serde(default)]
	pub user_agent: Option<Box<str>>,
}

fn normalize_field(
	name: &str,
	value: Option<Box<str>>,
	max_len: usize,
) -> PvResult<Option<Box<str>>> {
	match value {
		None => Ok(None),
		Some(v) if v.is_empty() => Ok(None),
		Some(v) if v.chars().count() > max_len => Err(Error::ValidationError(format!(
			"{} too long (max {} characters)",
			name, max_len
		))),
		Some(v) => Ok(Some(v)),
	}
}

impl RecordConsent {
	pub fn new(consent_type: ConsentType, granted: bool) -> Self {
		Self { consent_type, granted, version: None, ip_address: None, user_agent: None }
	}

	pub fn version(mut self, version: impl Into<Box<str>>) -> Self {
		self.version = Some(version.into());
		self
	}

	pub fn ip_address(mut self, ip_address: impl Into<Box<str>>) -> Self {
		self.ip_address = Some(ip_address.into());
		self
	}

	pub fn user_agent(mut self, user_agent: impl Into<Box<str>>) -> Self {
		self.user_agent = Some(user_agent.into());
		self
	}

	/// Empty strings become absent; oversized audit fields are rejected
	pub fn validated(self) -> PvResult<Self> {
		Ok(Self {
			consent_type: self.consent_type,
			granted: self.granted,
			version: normalize_field("version", self.version, MAX_VERSION_LEN)?,
			ip_address: normalize_field("ip_address", self.ip_address, MAX_IP_ADDRESS_LEN)?,
			user_agent: normalize_field("user_agent", self.user_agent, MAX_USER_AGENT_LEN)?,
		})
	}
}

/// Filters for consent history listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListConsentOptions {
	/// Only records of this type
	pub consent_type: Option<ConsentType>,
	/// Only the most recent N records (still returned oldest first)
	pub limit: Option<u32>,
}


// vim: ts=4
