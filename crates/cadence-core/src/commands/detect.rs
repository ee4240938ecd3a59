use std::path::Path;

use crate::CoreResult;
use crate::commands::common::{load_setup, now_unix, validate_space_id};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CandidateRow, DetectData, SkippedGroupRow};
use crate::detect::builder::detect;
use crate::detect::dates::build_filter;
use crate::detect::policy::DETECTION_POLICY_VERSION;
use crate::pattern::lifecycle::reconcile;
use crate::pattern::store::{list_by_space, upsert};
use crate::pattern::types::PatternFilter;
use crate::state::{map_sqlite_error, open_connection};
use crate::txsource::load_transactions;

#[derive(Debug, Default)]
pub struct DetectRunOptions<'a> {
    pub space_id: String,
    pub account_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub home_override: Option<&'a Path>,
}

/// The full detection pass: load the space's transactions, mine candidate
/// patterns, reconcile them with what is already stored, and persist the
/// plan in one immediate transaction. Any storage failure aborts the run
/// with the mapped error; it never degrades to an empty result.
pub fn run(
    space_id: &str,
    account_id: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> CoreResult<SuccessEnvelope> {
    run_with_options(DetectRunOptions {
        space_id: space_id.to_string(),
        account_id: account_id.map(std::string::ToString::to_string),
        from: from.map(std::string::ToString::to_string),
        to: to.map(std::string::ToString::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: DetectRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let space_id = validate_space_id(&options.space_id, "detect")?;
    let setup = load_setup(options.home_override)?;
    let filter = build_filter(options.from.as_deref(), options.to.as_deref(), "detect")?;

    let mut connection = open_connection(&setup.db_path)?;
    let transactions = load_transactions(
        &connection,
        &setup.db_path,
        &space_id,
        options.account_id.as_deref(),
        &filter,
    )?;

    let report = detect(&transactions);
    let existing = list_by_space(&connection, &setup.db_path, &space_id, &PatternFilter::all())?;
    let plan = reconcile(&space_id, &report.candidates, &existing, now_unix());

    let transaction = connection
        .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(&setup.db_path, &error))?;
    for pattern in plan.to_create.iter().chain(plan.to_update.iter()) {
        upsert(&transaction, &setup.db_path, pattern)?;
    }
    transaction
        .commit()
        .map_err(|error| map_sqlite_error(&setup.db_path, &error))?;

    tracing::info!(
        space = %space_id,
        scanned = transactions.len(),
        created = plan.to_create.len(),
        updated = plan.to_update.len(),
        unchanged = plan.unchanged.len(),
        "detection run complete"
    );

    let data = DetectData {
        space_id,
        policy_version: DETECTION_POLICY_VERSION.to_string(),
        transactions_scanned: to_count(transactions.len()),
        total: to_count(report.candidates.len()),
        candidates: report.candidates.iter().map(CandidateRow::from).collect(),
        created: to_count(plan.to_create.len()),
        updated: to_count(plan.to_update.len()),
        unchanged: to_count(plan.unchanged.len()),
        skipped_groups: report.skipped.iter().map(SkippedGroupRow::from).collect(),
    };

    success("detect", data)
}

fn to_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
