mod common;

use common::{fixture, SLUG};
use keyward_core::store::{legacy_key, record_key};
use keyward_core::{EntitlementRecord, LicenseError, LicenseEvent, LicenseStatus, RecordStore};
use serde_json::json;
use std::time::Duration;

fn seed_valid(f: &common::Fixture) {
    f.store
        .set(
            &record_key(SLUG),
            json!({
                "license_key": "KEY-1",
                "status": "valid",
                "variation_id": "3",
                "variation_title": "Agency",
                "expires": "2026-01-01",
                "activation_hash": "hash-abc"
            }),
        )
        .unwrap();
}

fn stored(f: &common::Fixture) -> Option<EntitlementRecord> {
    f.store
        .get(&record_key(SLUG))
        .unwrap()
        .map(|v| serde_json::from_value(v).unwrap())
}

// --- getStatus (cache only) ---

#[test]
fn fresh_slug_reports_unregistered() {
    let f = fixture();
    let status = f.client.get_status(false).unwrap();

    assert_eq!(status.license_key, "");
    assert_eq!(status.status, LicenseStatus::unregistered());
    assert_eq!(status.variation_id, "");
    assert_eq!(status.variation_title, "");
    assert_eq!(status.expires, "");
    assert_eq!(f.transport.call_count(), 0);
}

#[test]
fn cache_only_status_never_calls_network() {
    let f = fixture();
    seed_valid(&f);

    let first = f.client.get_status(false).unwrap();
    f.transport.respond(200, r#"{"status":"expired"}"#);
    let second = f.client.get_status(false).unwrap();

    assert_eq!(first, second);
    assert_eq!(f.transport.call_count(), 0);
    assert!(first.is_valid());
}

#[test]
fn legacy_record_translates_to_valid() {
    let f = fixture();
    f.store
        .set(
            &legacy_key(SLUG),
            json!({"key": "ABC", "status": "activate", "source_id": 9, "title": "Lifetime"}),
        )
        .unwrap();

    let status = f.client.get_status(false).unwrap();
    assert_eq!(status.license_key, "ABC");
    assert_eq!(status.status, "valid");
    assert_eq!(status.variation_id, "9");
    assert_eq!(status.variation_title, "Lifetime");
    assert_eq!(status.expires, "");
    assert_eq!(status.activation_hash, "");
}

#[test]
fn inactive_legacy_record_is_ignored() {
    let f = fixture();
    f.store
        .set(&legacy_key(SLUG), json!({"key": "ABC", "status": "deactivate"}))
        .unwrap();

    let status = f.client.get_status(false).unwrap();
    assert!(status.status.is_unregistered());
    assert_eq!(status.license_key, "");
}

#[test]
fn current_record_wins_over_legacy() {
    let f = fixture();
    seed_valid(&f);
    f.store
        .set(&legacy_key(SLUG), json!({"key": "OLD", "status": "activate"}))
        .unwrap();

    assert_eq!(f.client.current_license_key().unwrap(), "KEY-1");
}

#[test]
fn record_with_empty_key_counts_as_absent() {
    let f = fixture();
    f.store
        .set(&record_key(SLUG), json!({"license_key": "", "status": "valid"}))
        .unwrap();
    f.store
        .set(&legacy_key(SLUG), json!({"key": "ABC", "status": "activate"}))
        .unwrap();

    assert_eq!(f.client.current_license_key().unwrap(), "ABC");
}

// --- activate ---

#[test]
fn activate_persists_record_with_defaults() {
    let f = fixture();
    f.transport
        .respond(200, r#"{"status":"valid","expiration_date":"2026-01-01"}"#);

    let record = f.client.activate("KEY-1").unwrap();

    assert_eq!(record.license_key, "KEY-1");
    assert_eq!(record.status, "valid");
    assert_eq!(record.expires, "2026-01-01");
    assert_eq!(record.activation_hash, "");
    assert_eq!(record.variation_id, "");
    assert_eq!(stored(&f), Some(record));
}

#[test]
fn activate_status_defaults_to_valid() {
    let f = fixture();
    f.transport
        .respond(200, r#"{"activation_hash":"h-1","variation_id":4}"#);

    let record = f.client.activate("KEY-1").unwrap();
    assert!(record.is_valid());
    assert_eq!(record.activation_hash, "h-1");
    assert_eq!(record.variation_id, "4");
}

#[test]
fn activate_sends_expected_request() {
    let f = fixture();
    f.transport.respond(200, r#"{"status":"valid"}"#);
    f.client.activate("  KEY-1  ").unwrap();

    let calls = f.transport.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(
        call.url,
        "https://licenses.example.com/?fluent-cart=custom_activate_license"
    );
    assert_eq!(call.field("license_key"), Some("KEY-1"));
    assert_eq!(call.field("item_id"), Some("1234"));
    assert_eq!(call.field("current_version"), Some("2.1.0"));
    assert_eq!(call.field("site_url"), Some("https://blog.example.org"));
    assert_eq!(call.timeout, Duration::from_secs(15));
}

#[test]
fn activate_empty_key_is_validation_error_without_network() {
    let f = fixture();
    let err = f.client.activate("   ").unwrap_err();
    assert!(matches!(err, LicenseError::Validation(_)));
    assert_eq!(f.transport.call_count(), 0);
}

#[test]
fn activate_network_error_is_returned_unchanged() {
    let f = fixture();
    f.transport.fail("operation timed out");

    let err = f.client.activate("KEY-1").unwrap_err();
    match err {
        LicenseError::Network(msg) => assert_eq!(msg, "operation timed out"),
        other => panic!("expected network error, got {other:?}"),
    }
    assert_eq!(stored(&f), None);
    assert_eq!(f.transport.call_count(), 1);
}

#[test]
fn activate_api_error_uses_body_message() {
    let f = fixture();
    f.transport
        .respond(422, r#"{"message":"This license key is not valid."}"#);

    let err = f.client.activate("BAD").unwrap_err();
    match err {
        LicenseError::Api { message, status } => {
            assert_eq!(message, "This license key is not valid.");
            assert_eq!(status, Some(422));
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(stored(&f), None);
}

#[test]
fn activate_api_error_without_json_reports_status_code() {
    let f = fixture();
    f.transport.respond(503, "<html>Service Unavailable</html>");

    let err = f.client.activate("KEY-1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "API request failed with status code: 503"
    );
}

#[test]
fn activate_empty_success_body_is_api_error() {
    let f = fixture();
    f.transport.respond(200, "");
    let err = f.client.activate("KEY-1").unwrap_err();
    assert!(err.to_string().contains("empty or not JSON"));

    f.transport.respond(200, "{}");
    assert!(f.client.activate("KEY-1").is_err());
    assert_eq!(stored(&f), None);
}

#[test]
fn activate_emits_event() {
    let f = fixture();
    f.transport.respond(200, r#"{"status":"valid"}"#);
    let record = f.client.activate("KEY-1").unwrap();

    assert_eq!(
        f.events.events(),
        vec![LicenseEvent::Activated {
            slug: SLUG.to_string(),
            record,
        }]
    );
}

#[test]
fn reactivation_overwrites_in_place() {
    let f = fixture();
    seed_valid(&f);
    f.transport
        .respond(200, r#"{"status":"valid","activation_hash":"new-hash"}"#);

    f.client.activate("KEY-2").unwrap();
    let record = stored(&f).unwrap();
    assert_eq!(record.license_key, "KEY-2");
    assert_eq!(record.activation_hash, "new-hash");
    assert_eq!(record.variation_title, "");
}

// --- deactivate ---

#[test]
fn deactivate_removes_local_and_legacy_records() {
    let f = fixture();
    seed_valid(&f);
    f.store
        .set(&legacy_key(SLUG), json!({"key": "OLD", "status": "activate"}))
        .unwrap();
    f.transport.respond(200, r#"{"status":"deactivated"}"#);

    let outcome = f.client.deactivate().unwrap();

    assert!(outcome.remote_deactivated);
    assert!(f.store.is_empty());
    let call = &f.transport.calls()[0];
    assert!(call.url.ends_with("custom_deactivate_license"));
    assert_eq!(call.field("license_key"), Some("KEY-1"));
    assert_eq!(call.field("activation_hash"), Some("hash-abc"));
}

#[test]
fn deactivate_with_remote_500_still_clears_local() {
    let f = fixture();
    seed_valid(&f);
    f.transport.respond(500, r#"{"message":"boom"}"#);

    let outcome = f.client.deactivate().unwrap();

    assert!(!outcome.remote_deactivated);
    assert_eq!(outcome.remote_error.as_deref(), Some("boom"));
    assert_eq!(stored(&f), None);
    assert!(f.client.get_status(false).unwrap().status.is_unregistered());
}

#[test]
fn deactivate_with_network_failure_still_clears_local() {
    let f = fixture();
    seed_valid(&f);
    f.transport.fail("dns error");

    let outcome = f.client.deactivate().unwrap();
    assert!(!outcome.remote_deactivated);
    assert!(!f.store.contains(&record_key(SLUG)));
}

#[test]
fn deactivate_from_every_state_leaves_no_entry() {
    for status in ["valid", "expired", "disabled", "error", "unregistered"] {
        let f = fixture();
        f.store
            .set(
                &record_key(SLUG),
                json!({"license_key": "KEY-1", "status": status}),
            )
            .unwrap();
        f.transport.fail("offline");

        f.client.deactivate().unwrap();
        assert!(
            !f.store.contains(&record_key(SLUG)),
            "record survived deactivation from {status}"
        );
    }
}

#[test]
fn deactivate_emits_event() {
    let f = fixture();
    f.client.deactivate().unwrap();
    assert_eq!(
        f.events.events(),
        vec![LicenseEvent::Deactivated {
            slug: SLUG.to_string()
        }]
    );
}

// --- getStatus (forced refresh) ---

#[test]
fn refresh_merges_remote_fields_and_keeps_key() {
    let f = fixture();
    seed_valid(&f);
    f.transport.respond(
        200,
        r#"{"status":"expired","expiration_date":"2025-06-30","variation_title":"Personal",
            "license_key":"REMOTE-KEY","renew_url":"https://shop.example/renew","is_expired":true}"#,
    );

    let status = f.client.get_status(true).unwrap();

    assert_eq!(status.license_key, "KEY-1");
    assert_eq!(status.status, "expired");
    assert_eq!(status.expires, "2025-06-30");
    assert_eq!(status.variation_title, "Personal");
    assert_eq!(status.variation_id, "3");
    assert_eq!(status.renew_url.as_deref(), Some("https://shop.example/renew"));
    assert_eq!(status.is_expired, Some(true));
    assert_eq!(status.error_type, None);

    let persisted = stored(&f).unwrap();
    assert_eq!(persisted.license_key, "KEY-1");
    assert_eq!(persisted.status, "expired");
    assert_eq!(persisted.renew_url, None);
    assert_eq!(persisted.is_expired, None);
}

#[test]
fn refresh_sends_key_and_activation_hash() {
    let f = fixture();
    seed_valid(&f);
    f.transport.respond(200, r#"{"status":"valid"}"#);
    f.client.get_status(true).unwrap();

    let call = &f.transport.calls()[0];
    assert!(call.url.ends_with("fluent-cart=custom_check_license"));
    assert_eq!(call.field("license_key"), Some("KEY-1"));
    assert_eq!(call.field("activation_hash"), Some("hash-abc"));
    assert_eq!(call.field("item_id"), Some("1234"));
    assert_eq!(call.field("site_url"), Some("https://blog.example.org"));
}

#[test]
fn refresh_missing_status_defaults_to_unregistered() {
    let f = fixture();
    seed_valid(&f);
    f.transport.respond(200, r#"{"renew_url":""}"#);

    let status = f.client.get_status(true).unwrap();
    assert!(status.status.is_unregistered());
    assert_eq!(status.renew_url.as_deref(), Some(""));
    assert_eq!(status.is_expired, Some(false));
}

#[test]
fn refresh_reports_error_type_and_message() {
    let f = fixture();
    seed_valid(&f);
    f.transport.respond(
        200,
        r#"{"status":"disabled","error_type":"disabled","message":"Refunded order."}"#,
    );

    let status = f.client.get_status(true).unwrap();
    assert_eq!(status.status, "disabled");
    assert_eq!(status.error_type.as_deref(), Some("disabled"));
    assert_eq!(status.error_message.as_deref(), Some("Refunded order."));
}

#[test]
fn refresh_transport_failure_propagates_and_keeps_cache() {
    let f = fixture();
    seed_valid(&f);
    let before = stored(&f);
    f.transport.fail("operation timed out");

    let err = f.client.get_status(true).unwrap_err();
    assert!(matches!(err, LicenseError::Network(_)));
    assert_eq!(stored(&f), before);
}

#[test]
fn refresh_of_legacy_license_migrates_it() {
    let f = fixture();
    f.store
        .set(&legacy_key(SLUG), json!({"key": "ABC", "status": "activate"}))
        .unwrap();
    f.transport.respond(200, r#"{"status":"valid"}"#);

    f.client.get_status(true).unwrap();

    let record = stored(&f).unwrap();
    assert_eq!(record.license_key, "ABC");
    assert!(record.is_valid());
}

#[test]
fn refresh_for_unregistered_slug_does_not_create_entry() {
    let f = fixture();
    f.transport.respond(200, r#"{"status":"invalid"}"#);

    let status = f.client.get_status(true).unwrap();
    assert_eq!(status.status, "invalid");
    assert!(f.store.is_empty());
}

#[test]
fn unknown_status_is_preserved_verbatim() {
    let f = fixture();
    f.transport.respond(200, r#"{"status":"site_limit_reached"}"#);

    let record = f.client.activate("KEY-1").unwrap();
    assert_eq!(record.status.as_str(), "site_limit_reached");
    assert!(!record.is_valid());
}
