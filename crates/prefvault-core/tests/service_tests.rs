//! Preference service tests against the SQLite adapter

use futures::future::join_all;
use prefvault_adapter_sqlite::PrefAdapterSqlite;
use prefvault_core::config::PrefsConfig;
use prefvault_core::consent::{ConsentType, ListConsentOptions, RecordConsent};
use prefvault_core::error::Error;
use prefvault_core::prelude::*;
use prefvault_core::settings::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn create_test_app(config: PrefsConfig) -> (App, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let config = PrefsConfig { db_dir: temp_dir.path().join("prefs"), ..config };

	let mut builder = AppBuilder::new();
	builder.config(config);
	builder.open_sqlite_adapter().await.expect("Failed to open adapter");
	let app = builder.build().expect("Failed to build app");

	(app, temp_dir)
}

#[test]
fn test_build_without_adapter() {
	let res = AppBuilder::new().build();
	assert!(matches!(res, Err(Error::ConfigError(_))));
}

#[tokio::test]
async fn test_app_opens_database_in_db_dir() {
	let (app, temp) = create_test_app(PrefsConfig::default()).await;
	app.service.get_preferences(UserId::new_random()).await.unwrap();

	assert!(temp.path().join("prefs").join("prefs.db").exists());
}

#[tokio::test]
async fn test_build_with_explicit_adapter() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = PrefAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");

	let app = AppBuilder::new().pref_adapter(Arc::new(adapter)).build().unwrap();
	let status = app.service.consent_status(UserId::new_random()).await.unwrap();
	assert!(status.is_empty());
}

#[tokio::test]
async fn test_get_preferences_autocreates() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let prefs = app.service.get_preferences(user_id).await.unwrap();
	assert_eq!(prefs.user_id, user_id);
	assert_eq!(prefs.settings, GeneralSettings::default());

	let again = app.service.get_preferences(user_id).await.unwrap();
	assert_eq!(again, prefs);
}

#[tokio::test]
async fn test_configured_defaults() {
	let config = PrefsConfig {
		default_currency: "USD".into(),
		default_theme: Theme::Auto,
		..PrefsConfig::default()
	};
	let (app, _temp) = create_test_app(config).await;

	let prefs = app.service.get_preferences(UserId::new_random()).await.unwrap();
	assert_eq!(prefs.settings.currency, "USD");
	assert_eq!(prefs.settings.theme, Theme::Auto);
	assert_eq!(prefs.settings.language, "en");
}

#[tokio::test]
async fn test_patch_isolates_fields() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	app.service
		.update_preferences(
			user_id,
			GeneralPatch { currency: Patch::Value("USD".into()), ..GeneralPatch::default() },
		)
		.await
		.unwrap();
	let prefs = app
		.service
		.update_preferences(
			user_id,
			GeneralPatch { language: Patch::Value("fr".into()), ..GeneralPatch::default() },
		)
		.await
		.unwrap();

	assert_eq!(prefs.settings.language, "fr");
	assert_eq!(prefs.settings.currency, "USD");
}

#[tokio::test]
async fn test_update_from_json_patch() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let patch: NotificationPatch =
		serde_json::from_str(r#"{"smsMarketing": true, "pushEnabled": false}"#).unwrap();
	let settings = app.service.update_notification_settings(user_id, patch).await.unwrap();

	let expected = NotificationSettings {
		sms_marketing: true,
		push_enabled: false,
		..NotificationSettings::default()
	};
	assert_eq!(settings.settings, expected);
}

#[tokio::test]
async fn test_noop_patch_refreshes_updated_at() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let before = app.service.get_privacy_settings(user_id).await.unwrap();
	tokio::time::sleep(Duration::from_millis(1100)).await;
	let after =
		app.service.update_privacy_settings(user_id, PrivacyPatch::default()).await.unwrap();

	assert_eq!(after.settings, before.settings);
	assert_eq!(after.created_at, before.created_at);
	assert!(after.updated_at > before.updated_at, "Empty patch still counts as a write");
}

#[tokio::test]
async fn test_settings_by_kind_name() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let kind: SettingsKind = "preference".parse().unwrap();
	let profile = app.service.get_settings(user_id, kind).await.unwrap();
	assert_eq!(profile.kind(), SettingsKind::General);

	assert!(matches!("billing".parse::<SettingsKind>(), Err(Error::ValidationError(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_access() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let tasks = (0..10).map(|_| {
		let app = app.clone();
		tokio::spawn(async move { app.service.get_notification_settings(user_id).await })
	});
	let results: Vec<_> =
		join_all(tasks).await.into_iter().map(|res| res.unwrap().unwrap()).collect();

	for settings in &results {
		assert_eq!(settings, &results[0]);
	}
}

#[tokio::test]
async fn test_grant_and_revoke() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let grant = app.service.grant(user_id, ConsentType::Marketing).await.unwrap();
	tokio::time::sleep(Duration::from_millis(1100)).await;
	let revoke = app.service.revoke(user_id, ConsentType::Marketing).await.unwrap();

	let latest = app.service.latest_consent(user_id, ConsentType::Marketing).await.unwrap();
	assert_eq!(latest.as_ref(), Some(&revoke));
	assert!(!revoke.granted);

	let history = app.service.consent_history(user_id).await.unwrap();
	assert_eq!(history, vec![grant, revoke]);
}

#[tokio::test]
async fn test_record_consent_with_audit_fields() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	let consent = RecordConsent::new(ConsentType::TermsOfService, true)
		.version("3.0")
		.ip_address("2001:db8::1")
		.user_agent("Mozilla/5.0");
	let record = app.service.record_consent(user_id, &consent).await.unwrap();

	assert_eq!(record.version.as_deref(), Some("3.0"));
	assert_eq!(record.ip_address.as_deref(), Some("2001:db8::1"));
	assert_eq!(record.user_agent.as_deref(), Some("Mozilla/5.0"));
}

#[tokio::test]
async fn test_empty_consent_views() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	assert!(app.service.consent_history(user_id).await.unwrap().is_empty());
	assert!(app.service.consent_status(user_id).await.unwrap().is_empty());
	assert_eq!(app.service.latest_consent(user_id, ConsentType::PrivacyPolicy).await.unwrap(), None);
}

#[tokio::test]
async fn test_consent_status_and_filtered_history() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let user_id = UserId::new_random();

	app.service.grant(user_id, ConsentType::ThirdPartySharing).await.unwrap();
	app.service.grant(user_id, ConsentType::TermsOfService).await.unwrap();
	app.service.grant(user_id, ConsentType::PrivacyPolicy).await.unwrap();
	app.service.revoke(user_id, ConsentType::ThirdPartySharing).await.unwrap();

	let status = app.service.consent_status(user_id).await.unwrap();
	let summary: Vec<(ConsentType, bool)> =
		status.iter().map(|record| (record.consent_type, record.granted)).collect();
	assert_eq!(
		summary,
		vec![
			(ConsentType::TermsOfService, true),
			(ConsentType::PrivacyPolicy, true),
			(ConsentType::ThirdPartySharing, false),
		]
	);

	let opts =
		ListConsentOptions { consent_type: Some(ConsentType::ThirdPartySharing), limit: Some(1) };
	let history = app.service.consent_history_filtered(user_id, &opts).await.unwrap();
	assert_eq!(history.len(), 1);
	assert!(!history[0].granted);
}

#[tokio::test]
async fn test_delete_user_data() {
	let (app, _temp) = create_test_app(PrefsConfig::default()).await;
	let alice = UserId::new_random();
	let bob = UserId::new_random();

	for user_id in [alice, bob] {
		app.service
			.update_preferences(
				user_id,
				GeneralPatch { theme: Patch::Value(Theme::Dark), ..GeneralPatch::default() },
			)
			.await
			.unwrap();
		app.service.grant(user_id, ConsentType::DataSharing).await.unwrap();
	}

	app.service.delete_user_data(alice).await.unwrap();

	assert!(app.service.consent_history(alice).await.unwrap().is_empty());
	let prefs = app.service.get_preferences(alice).await.unwrap();
	assert_eq!(prefs.settings.theme, Theme::Light, "Settings start over from defaults");

	assert_eq!(app.service.consent_history(bob).await.unwrap().len(), 1);
	assert_eq!(app.service.get_preferences(bob).await.unwrap().settings.theme, Theme::Dark);
}

// vim: ts=4
