use std::path::Path;

use crate::commands::common::{load_setup, now_unix, validate_space_id};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{PatternActionData, PatternListData, PatternRow, RemoveData};
use crate::detect::dates::parse_transaction_date;
use crate::detect::frequency::Frequency;
use crate::detect::normalize::{UNKNOWN_MERCHANT_KEY, normalize};
use crate::detect::policy::DETECTION_POLICY_V1;
use crate::pattern::lifecycle::{UserAction, apply_action};
use crate::pattern::store::{delete, find_by_account_and_key, get, list_by_space, set_status, upsert};
use crate::pattern::types::{PatternFilter, PatternStatus, RecurringPattern};
use crate::state::open_connection;
use crate::{CoreError, CoreResult};

#[derive(Debug, Default)]
pub struct ListOptions<'a> {
    pub space_id: String,
    pub status: Option<String>,
    pub include_detected: bool,
    pub home_override: Option<&'a Path>,
}

pub fn list(space_id: &str, status: Option<&str>, include_detected: bool) -> CoreResult<SuccessEnvelope> {
    list_with_options(ListOptions {
        space_id: space_id.to_string(),
        status: status.map(std::string::ToString::to_string),
        include_detected,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: ListOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let space_id = validate_space_id(&options.space_id, "patterns list")?;
    let status = match options.status.as_deref() {
        Some(value) => Some(parse_status_argument(value)?),
        None => None,
    };

    let setup = load_setup(options.home_override)?;
    let connection = open_connection(&setup.db_path)?;
    let filter = PatternFilter {
        status,
        include_detected: options.include_detected,
    };
    let patterns = list_by_space(&connection, &setup.db_path, &space_id, &filter)?;

    let data = PatternListData {
        space_id,
        total: i64::try_from(patterns.len()).unwrap_or(i64::MAX),
        patterns: patterns.iter().map(PatternRow::from).collect(),
    };
    success("patterns list", data)
}

pub fn confirm(pattern_id: &str) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::Confirm, "patterns confirm", None)
}

pub fn dismiss(pattern_id: &str) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::Dismiss, "patterns dismiss", None)
}

pub fn toggle_pause(pattern_id: &str) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::TogglePause, "patterns pause", None)
}

#[doc(hidden)]
pub fn confirm_at(pattern_id: &str, home_override: &Path) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::Confirm, "patterns confirm", Some(home_override))
}

#[doc(hidden)]
pub fn dismiss_at(pattern_id: &str, home_override: &Path) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::Dismiss, "patterns dismiss", Some(home_override))
}

#[doc(hidden)]
pub fn toggle_pause_at(pattern_id: &str, home_override: &Path) -> CoreResult<SuccessEnvelope> {
    run_action(pattern_id, UserAction::TogglePause, "patterns pause", Some(home_override))
}

/// Looks the pattern up, runs the state machine, and persists the result.
/// The state machine owns legality; this function only owns storage.
fn run_action(
    pattern_id: &str,
    action: UserAction,
    command: &str,
    home_override: Option<&Path>,
) -> CoreResult<SuccessEnvelope> {
    let pattern_id = validate_pattern_id(pattern_id, command)?;
    let setup = load_setup(home_override)?;
    let connection = open_connection(&setup.db_path)?;

    let pattern = get(&connection, &setup.db_path, &pattern_id)?
        .ok_or_else(|| CoreError::pattern_not_found(&pattern_id))?;
    let next_status = apply_action(action, pattern.status)?;

    if next_status != pattern.status {
        let changed = set_status(&connection, &setup.db_path, &pattern_id, next_status, now_unix())?;
        if !changed {
            return Err(CoreError::pattern_not_found(&pattern_id));
        }
    }

    tracing::info!(
        pattern = %pattern_id,
        from = pattern.status.as_str(),
        to = next_status.as_str(),
        "pattern status change"
    );

    let data = PatternActionData {
        pattern_id,
        previous_status: pattern.status.as_str().to_string(),
        status: next_status.as_str().to_string(),
    };
    success(command, data)
}

pub fn remove(pattern_id: &str) -> CoreResult<SuccessEnvelope> {
    remove_with_options(pattern_id, None)
}

#[doc(hidden)]
pub fn remove_at(pattern_id: &str, home_override: &Path) -> CoreResult<SuccessEnvelope> {
    remove_with_options(pattern_id, Some(home_override))
}

fn remove_with_options(
    pattern_id: &str,
    home_override: Option<&Path>,
) -> CoreResult<SuccessEnvelope> {
    let pattern_id = validate_pattern_id(pattern_id, "patterns remove")?;
    let setup = load_setup(home_override)?;
    let connection = open_connection(&setup.db_path)?;

    let removed = delete(&connection, &setup.db_path, &pattern_id)?;
    if !removed {
        return Err(CoreError::pattern_not_found(&pattern_id));
    }

    success(
        "patterns remove",
        RemoveData {
            pattern_id,
            removed: true,
        },
    )
}

#[derive(Debug, Default)]
pub struct AddOptions<'a> {
    pub space_id: String,
    pub account_id: String,
    pub merchant: String,
    pub amount: f64,
    pub frequency: String,
    pub last_seen: String,
    pub tolerance: Option<f64>,
    pub home_override: Option<&'a Path>,
}

/// Manual pattern entry. The row starts life `confirmed` because the user
/// vouched for it directly, and it occupies the same reconcile key as a
/// detected pattern would, so later detection runs refresh it rather than
/// duplicating it.
pub fn add(options: AddOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let space_id = validate_space_id(&options.space_id, "patterns add")?;
    let account_id = options.account_id.trim().to_string();
    if account_id.is_empty() {
        return Err(CoreError::invalid_argument_for_command(
            "`account` must not be empty.",
            Some("patterns add"),
        ));
    }

    let display_name = options.merchant.trim().to_string();
    let merchant_key = normalize(&options.merchant);
    if merchant_key == UNKNOWN_MERCHANT_KEY {
        return Err(CoreError::invalid_argument_for_command(
            "`merchant` must contain at least one word that is not a date or number.",
            Some("patterns add"),
        ));
    }

    let frequency = Frequency::parse_str(options.frequency.trim()).ok_or_else(|| {
        CoreError::invalid_argument_for_command(
            "`frequency` must be one of weekly, biweekly, monthly, quarterly, yearly.",
            Some("patterns add"),
        )
    })?;
    let last_seen_at = parse_transaction_date(options.last_seen.trim()).ok_or_else(|| {
        CoreError::invalid_argument_for_command(
            "`last-seen` must use YYYY-MM-DD format with a real calendar date.",
            Some("patterns add"),
        )
    })?;
    if !options.amount.is_finite() || options.amount == 0.0 {
        return Err(CoreError::invalid_argument_for_command(
            "`amount` must be a non-zero finite number.",
            Some("patterns add"),
        ));
    }
    let tolerance = match options.tolerance {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        Some(_) => {
            return Err(CoreError::invalid_argument_for_command(
                "`tolerance` must be a non-negative number.",
                Some("patterns add"),
            ));
        }
        None => DETECTION_POLICY_V1.amount_floor(options.amount),
    };

    let setup = load_setup(options.home_override)?;
    let connection = open_connection(&setup.db_path)?;

    if let Some(existing) =
        find_by_account_and_key(&connection, &setup.db_path, &space_id, &account_id, &merchant_key)?
    {
        return Err(CoreError::invalid_argument_with_recovery(
            &format!(
                "A pattern for `{merchant_key}` on account `{account_id}` already exists (`{}`).",
                existing.pattern_id
            ),
            vec![
                "Use `cadence patterns confirm <pattern-id>` to keep the existing pattern."
                    .to_string(),
                "Use `cadence patterns remove <pattern-id>` first if you want to replace it."
                    .to_string(),
            ],
        ));
    }

    let now = now_unix();
    let pattern = RecurringPattern {
        pattern_id: ulid::Ulid::new().to_string(),
        space_id,
        account_id,
        merchant_key,
        display_name,
        frequency,
        expected_amount: options.amount,
        amount_tolerance: tolerance,
        status: PatternStatus::Confirmed,
        first_seen_at: last_seen_at,
        last_seen_at,
        next_expected_at: frequency.advance(last_seen_at),
        occurrences: 1,
        confidence: 1.0,
        linked_txn_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    upsert(&connection, &setup.db_path, &pattern)?;

    success("patterns add", PatternRow::from(&pattern))
}

fn parse_status_argument(value: &str) -> CoreResult<PatternStatus> {
    PatternStatus::parse_str(value.trim()).ok_or_else(|| {
        CoreError::invalid_argument_for_command(
            "`status` must be one of detected, confirmed, dismissed, paused.",
            Some("patterns list"),
        )
    })
}

fn validate_pattern_id(pattern_id: &str, command: &str) -> CoreResult<String> {
    let trimmed = pattern_id.trim();
    if trimmed.is_empty() {
        return Err(CoreError::invalid_argument_for_command(
            "`pattern-id` must not be empty.",
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}
