//! Consent ledger tests
//!
//! Append-only history, latest-by-time resolution, filters, and user data removal

use prefvault::consent::*;
use prefvault::error::Error;
use prefvault::pref_adapter::PrefAdapter;
use prefvault::settings::{GeneralSettings, SettingsData, SettingsKind};
use prefvault::types::UserId;
use prefvault_adapter_sqlite::PrefAdapterSqlite;
use std::time::Duration;
use tempfile::TempDir;

async fn create_test_adapter() -> (PrefAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = PrefAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");

	(adapter, temp_dir)
}

/// Wait until the second-resolution clock has moved on
async fn next_second() {
	tokio::time::sleep(Duration::from_millis(1100)).await;
}

#[tokio::test]
async fn test_create_consent() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let consent = RecordConsent::new(ConsentType::TermsOfService, true)
		.version("2.1")
		.ip_address("203.0.113.7")
		.user_agent("prefvault-tests/1.0");
	let record = adapter.create_consent(user_id, &consent).await.unwrap();

	assert_eq!(record.user_id, user_id);
	assert_eq!(record.consent_type, ConsentType::TermsOfService);
	assert!(record.granted);
	assert_eq!(record.version.as_deref(), Some("2.1"));
	assert_eq!(record.ip_address.as_deref(), Some("203.0.113.7"));
	assert_eq!(record.user_agent.as_deref(), Some("prefvault-tests/1.0"));

	let latest = adapter
		.read_latest_consent(user_id, ConsentType::TermsOfService)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(latest, record);
}

#[tokio::test]
async fn test_empty_audit_fields_stored_as_absent() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let consent = RecordConsent::new(ConsentType::Marketing, false).version("").user_agent("");
	let record = adapter.create_consent(user_id, &consent).await.unwrap();
	assert_eq!(record.version, None);
	assert_eq!(record.user_agent, None);

	let latest =
		adapter.read_latest_consent(user_id, ConsentType::Marketing).await.unwrap().unwrap();
	assert_eq!(latest.version, None);
	assert_eq!(latest.ip_address, None);
}

#[tokio::test]
async fn test_oversized_audit_field_rejected() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let consent = RecordConsent::new(ConsentType::Marketing, true)
		.ip_address("1".repeat(MAX_IP_ADDRESS_LEN + 1));
	let res = adapter.create_consent(user_id, &consent).await;
	assert!(matches!(res, Err(Error::ValidationError(_))));

	let history = adapter.list_consents(user_id, &ListConsentOptions::default()).await.unwrap();
	assert!(history.is_empty(), "Rejected consent must not be stored");
}

#[tokio::test]
async fn test_history_is_append_only() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let mut created = Vec::new();
	for granted in [true, false, true, false] {
		let consent = RecordConsent::new(ConsentType::DataSharing, granted);
		created.push(adapter.create_consent(user_id, &consent).await.unwrap());
	}

	let history = adapter.list_consents(user_id, &ListConsentOptions::default()).await.unwrap();
	assert_eq!(history, created, "Every action is kept, oldest first");
	for pair in history.windows(2) {
		assert!(pair[0].id < pair[1].id);
	}
}

#[tokio::test]
async fn test_latest_on_same_second_uses_id() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, true))
		.await
		.unwrap();
	let revoke = adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, false))
		.await
		.unwrap();

	let latest =
		adapter.read_latest_consent(user_id, ConsentType::Marketing).await.unwrap().unwrap();
	assert_eq!(latest.id, revoke.id);
	assert!(!latest.granted);
}

#[tokio::test]
async fn test_latest_follows_recorded_at() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let grant = adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::PrivacyPolicy, true))
		.await
		.unwrap();
	next_second().await;
	let revoke = adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::PrivacyPolicy, false))
		.await
		.unwrap();
	assert!(revoke.recorded_at > grant.recorded_at);

	let latest =
		adapter.read_latest_consent(user_id, ConsentType::PrivacyPolicy).await.unwrap().unwrap();
	assert_eq!(latest, revoke);
}

#[tokio::test]
async fn test_latest_missing() {
	let (adapter, _temp) = create_test_adapter().await;

	let latest = adapter
		.read_latest_consent(UserId::new_random(), ConsentType::ThirdPartySharing)
		.await
		.unwrap();
	assert!(latest.is_none());
}

#[tokio::test]
async fn test_types_are_independent() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, true))
		.await
		.unwrap();
	adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::DataSharing, false))
		.await
		.unwrap();

	let marketing =
		adapter.read_latest_consent(user_id, ConsentType::Marketing).await.unwrap().unwrap();
	assert!(marketing.granted, "Revoking another type must not affect marketing");
}

#[tokio::test]
async fn test_history_filter_and_limit() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	let mut marketing = Vec::new();
	for i in 0..5 {
		let consent = RecordConsent::new(ConsentType::Marketing, i % 2 == 0);
		marketing.push(adapter.create_consent(user_id, &consent).await.unwrap());
		adapter
			.create_consent(user_id, &RecordConsent::new(ConsentType::TermsOfService, true))
			.await
			.unwrap();
	}

	let all = adapter.list_consents(user_id, &ListConsentOptions::default()).await.unwrap();
	assert_eq!(all.len(), 10);

	let opts = ListConsentOptions { consent_type: Some(ConsentType::Marketing), limit: None };
	let filtered = adapter.list_consents(user_id, &opts).await.unwrap();
	assert_eq!(filtered, marketing);

	let opts = ListConsentOptions { consent_type: Some(ConsentType::Marketing), limit: Some(2) };
	let limited = adapter.list_consents(user_id, &opts).await.unwrap();
	assert_eq!(limited, marketing[3..], "Most recent records, oldest first");
}

#[tokio::test]
async fn test_empty_history() {
	let (adapter, _temp) = create_test_adapter().await;

	let history = adapter
		.list_consents(UserId::new_random(), &ListConsentOptions::default())
		.await
		.unwrap();
	assert!(history.is_empty());

	let status = adapter.list_consent_status(UserId::new_random()).await.unwrap();
	assert!(status.is_empty());
}

#[tokio::test]
async fn test_consent_status() {
	let (adapter, _temp) = create_test_adapter().await;
	let user_id = UserId::new_random();

	adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, true))
		.await
		.unwrap();
	adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::TermsOfService, true))
		.await
		.unwrap();
	let revoke = adapter
		.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, false))
		.await
		.unwrap();

	let status = adapter.list_consent_status(user_id).await.unwrap();
	let types: Vec<ConsentType> = status.iter().map(|record| record.consent_type).collect();
	assert_eq!(types, vec![ConsentType::TermsOfService, ConsentType::Marketing]);
	assert_eq!(status[1], revoke);
}

#[tokio::test]
async fn test_delete_user_data() {
	let (adapter, _temp) = create_test_adapter().await;
	let alice = UserId::new_random();
	let bob = UserId::new_random();
	let defaults = SettingsData::General(GeneralSettings::default());

	for user_id in [alice, bob] {
		adapter.get_or_create_settings(user_id, &defaults).await.unwrap();
		adapter
			.create_consent(user_id, &RecordConsent::new(ConsentType::Marketing, true))
			.await
			.unwrap();
	}

	adapter.delete_user_data(alice).await.unwrap();

	assert!(adapter.read_settings(alice, SettingsKind::General).await.unwrap().is_none());
	assert!(adapter.read_latest_consent(alice, ConsentType::Marketing).await.unwrap().is_none());
	assert!(adapter.read_settings(bob, SettingsKind::General).await.unwrap().is_some());
	assert!(adapter.read_latest_consent(bob, ConsentType::Marketing).await.unwrap().is_some());

	// Deleting again is a no-op
	adapter.delete_user_data(alice).await.unwrap();
}

// vim: ts=4
