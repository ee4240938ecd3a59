mod support;

use cadence_core::commands::detect::{self, DetectRunOptions};
use serde_json::Value;
use support::testkit::{
    TEST_SPACE, candidate_exists, detect_payload, ingest_rows, list_patterns,
    monthly_transactions, run_detection_scenario, temp_home_in_tmp, transaction,
};

#[test]
fn detect_rejects_invalid_date_ranges_with_invalid_argument() {
    let temp = temp_home_in_tmp("cadence-detect-range");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = detect::run_with_options(DetectRunOptions {
            space_id: TEST_SPACE.to_string(),
            account_id: None,
            from: Some("2026-03-01".to_string()),
            to: Some("2026-02-01".to_string()),
            home_override: Some(&home),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("from"));
        }
    }
}

#[test]
fn detect_rejects_blank_space_ids() {
    let temp = temp_home_in_tmp("cadence-detect-space");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        let result = detect::run_with_options(DetectRunOptions {
            space_id: "  ".to_string(),
            account_id: None,
            from: None,
            to: None,
            home_override: Some(&home),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
        }
    }
}

#[test]
fn six_monthly_charges_yield_one_monthly_candidate() {
    let rows = monthly_transactions(
        "acct_checking",
        2026,
        1,
        6,
        1,
        -15.99,
        "NETFLIX.COM",
        Some("Netflix"),
    );
    let (_guard, payload) = run_detection_scenario(&rows);

    assert!(candidate_exists(&payload, "netflix", "monthly"));
    let candidates = payload["data"]["candidates"].as_array().cloned().unwrap_or_default();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["occurrences"], 6);
    assert_eq!(candidates[0]["next_expected_at"], "2026-07-01");
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["created"], 1);
}

#[test]
fn weekly_spacing_classifies_weekly_not_monthly() {
    let rows = vec![
        transaction("acct", "2026-01-05", -6.50, "COFFEE CLUB", None),
        transaction("acct", "2026-01-12", -6.50, "COFFEE CLUB", None),
        transaction("acct", "2026-01-19", -6.50, "COFFEE CLUB", None),
        transaction("acct", "2026-01-26", -6.50, "COFFEE CLUB", None),
        transaction("acct", "2026-02-02", -6.50, "COFFEE CLUB", None),
    ];
    let (_guard, payload) = run_detection_scenario(&rows);
    assert!(candidate_exists(&payload, "coffee club", "weekly"));
    assert!(!candidate_exists(&payload, "coffee club", "monthly"));
}

#[test]
fn groups_under_three_rows_are_skipped_with_insufficient_history() {
    let rows = vec![
        transaction("acct", "2026-01-01", -30.0, "GYM MEMBERSHIP", None),
        transaction("acct", "2026-01-31", -30.0, "GYM MEMBERSHIP", None),
    ];
    let (_guard, payload) = run_detection_scenario(&rows);

    let candidates = payload["data"]["candidates"].as_array().cloned().unwrap_or_default();
    assert!(candidates.is_empty());
    let skipped = payload["data"]["skipped_groups"].as_array().cloned().unwrap_or_default();
    assert!(skipped.iter().any(|row| {
        row.get("merchant_key").and_then(Value::as_str) == Some("gym membership")
            && row.get("reason").and_then(Value::as_str) == Some("insufficient_history")
    }));
}

#[test]
fn renamed_descriptions_group_under_one_merchant_key() {
    let rows = vec![
        transaction("acct", "2026-01-03", -9.99, "SPOTIFY 01/03", None),
        transaction("acct", "2026-02-03", -9.99, "SPOTIFY 02/03", None),
        transaction("acct", "2026-03-03", -9.99, "Spotify 2048", None),
        transaction("acct", "2026-04-03", -9.99, "SPOTIFY", None),
    ];
    let (_guard, payload) = run_detection_scenario(&rows);
    assert!(candidate_exists(&payload, "spotify", "monthly"));
    let candidates = payload["data"]["candidates"].as_array().cloned().unwrap_or_default();
    assert_eq!(candidates.len(), 1);
}

#[test]
fn rerunning_detect_over_unchanged_data_creates_nothing_new() {
    let rows = monthly_transactions(
        "acct",
        2026,
        1,
        5,
        10,
        -42.0,
        "INTERNET PROVIDER",
        None,
    );
    let temp = temp_home_in_tmp("cadence-detect-idempotent");
    assert!(temp.is_ok());
    if let Ok((_dir, home)) = temp {
        ingest_rows(&home, &rows);
        let first = detect_payload(&home);
        assert_eq!(first["data"]["created"], 1);
        assert_eq!(first["data"]["updated"], 0);

        let second = detect_payload(&home);
        assert_eq!(second["data"]["created"], 0);
        assert_eq!(second["data"]["updated"], 1);
        assert_eq!(list_patterns(&home).len(), 1);
    }
}

#[test]
fn same_merchant_on_two_accounts_yields_two_patterns() {
    let mut rows = monthly_transactions("acct_a", 2026, 1, 4, 2, -11.0, "HULU", None);
    rows.extend(monthly_transactions("acct_b", 2026, 1, 4, 2, -11.0, "HULU", None));
    let (_guard, payload) = run_detection_scenario(&rows);

    let candidates = payload["data"]["candidates"].as_array().cloned().unwrap_or_default();
    assert_eq!(candidates.len(), 2);
    assert_eq!(payload["data"]["created"], 2);
}

#[test]
fn volatile_amounts_are_skipped_as_inconsistent() {
    let rows = vec![
        transaction("acct", "2026-01-01", -12.0, "CORNER STORE", None),
        transaction("acct", "2026-02-01", -190.0, "CORNER STORE", None),
        transaction("acct", "2026-03-01", -3.0, "CORNER STORE", None),
        transaction("acct", "2026-04-01", -77.0, "CORNER STORE", None),
    ];
    let (_guard, payload) = run_detection_scenario(&rows);

    let skipped = payload["data"]["skipped_groups"].as_array().cloned().unwrap_or_default();
    assert!(skipped.iter().any(|row| {
        row.get("merchant_key").and_then(Value::as_str) == Some("corner store")
            && row.get("reason").and_then(Value::as_str) == Some("inconsistent_amounts")
    }));
}

#[test]
fn aperiodic_dates_are_skipped_with_no_periodicity() {
    let rows = vec![
        transaction("acct", "2026-01-01", -25.0, "TAXI RIDE", None),
        transaction("acct", "2026-01-04", -25.0, "TAXI RIDE", None),
        transaction("acct", "2026-02-19", -25.0, "TAXI RIDE", None),
        transaction("acct", "2026-04-02", -25.0, "TAXI RIDE", None),
    ];
    let (_guard, payload) = run_detection_scenario(&rows);

    let candidates = payload["data"]["candidates"].as_array().cloned().unwrap_or_default();
    assert!(candidates.is_empty());
    let skipped = payload["data"]["skipped_groups"].as_array().cloned().unwrap_or_default();
    assert!(skipped.iter().any(|row| {
        row.get("reason").and_then(Value::as_str) == Some("no_periodicity")
    }));
}

#[test]
fn detect_reports_the_policy_version() {
    let (_guard, payload) = run_detection_scenario(&[]);
    assert_eq!(payload["data"]["policy_version"], "detection/v1");
    assert_eq!(payload["data"]["transactions_scanned"], 0);
}
