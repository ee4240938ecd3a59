use std::collections::BTreeMap;

use crate::detect::builder::CandidatePattern;
use crate::pattern::types::{PatternStatus, RecurringPattern};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Confirm,
    Dismiss,
    TogglePause,
}

impl UserAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Dismiss => "dismiss",
            Self::TogglePause => "toggle pause",
        }
    }
}

/// The pattern state machine: `detected -> confirmed | dismissed`,
/// `confirmed <-> paused`, `dismissed` is terminal short of deletion.
/// Confirm and dismiss are idempotent; pausing anything the user has not
/// confirmed is an invalid-state error, never a silent coercion.
pub fn apply_action(action: UserAction, status: PatternStatus) -> CoreResult<PatternStatus> {
    match (action, status) {
        (UserAction::Confirm, PatternStatus::Detected | PatternStatus::Confirmed) => {
            Ok(PatternStatus::Confirmed)
        }
        (UserAction::Dismiss, _) => Ok(PatternStatus::Dismissed),
        (UserAction::TogglePause, PatternStatus::Confirmed) => Ok(PatternStatus::Paused),
        (UserAction::TogglePause, PatternStatus::Paused) => Ok(PatternStatus::Confirmed),
        (action, status) => Err(CoreError::invalid_state(action.as_str(), status.as_str())),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub to_create: Vec<RecurringPattern>,
    pub to_update: Vec<RecurringPattern>,
    /// Pattern ids whose stored row must not be touched by this run.
    pub unchanged: Vec<String>,
}

/// Merges a detection run's candidates with the previously stored patterns.
///
/// Pure: the caller persists the plan. Only `detected` patterns may be
/// auto-created; `detected` and `confirmed` rows are refreshed in place
/// without touching status; `dismissed` and `paused` rows are left exactly
/// as they are, including their dates.
pub fn reconcile(
    space_id: &str,
    candidates: &[CandidatePattern],
    existing: &[RecurringPattern],
    now: i64,
) -> ReconcilePlan {
    let mut by_key: BTreeMap<(&str, &str), &RecurringPattern> = BTreeMap::new();
    for pattern in existing {
        by_key.insert(
            (pattern.account_id.as_str(), pattern.merchant_key.as_str()),
            pattern,
        );
    }

    let mut plan = ReconcilePlan::default();
    for candidate in candidates {
        let key = (candidate.account_id.as_str(), candidate.merchant_key.as_str());
        match by_key.get(&key) {
            None => plan.to_create.push(pattern_from_candidate(
                space_id, candidate, now,
            )),
            Some(stored) => match stored.status {
                PatternStatus::Detected | PatternStatus::Confirmed => {
                    plan.to_update.push(refreshed(stored, candidate, now));
                }
                PatternStatus::Dismissed | PatternStatus::Paused => {
                    plan.unchanged.push(stored.pattern_id.clone());
                }
            },
        }
    }

    plan
}

fn pattern_from_candidate(
    space_id: &str,
    candidate: &CandidatePattern,
    now: i64,
) -> RecurringPattern {
    RecurringPattern {
        pattern_id: ulid::Ulid::new().to_string(),
        space_id: space_id.to_string(),
        account_id: candidate.account_id.clone(),
        merchant_key: candidate.merchant_key.clone(),
        display_name: candidate.display_name.clone(),
        frequency: candidate.frequency,
        expected_amount: candidate.expected_amount,
        amount_tolerance: candidate.amount_tolerance,
        status: PatternStatus::Detected,
        first_seen_at: candidate.first_seen_at,
        last_seen_at: candidate.last_seen_at,
        next_expected_at: candidate.next_expected_at,
        occurrences: candidate.occurrences,
        confidence: candidate.confidence,
        linked_txn_ids: candidate.linked_txn_ids.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn refreshed(
    stored: &RecurringPattern,
    candidate: &CandidatePattern,
    now: i64,
) -> RecurringPattern {
    let mut updated = stored.clone();
    updated.display_name = candidate.display_name.clone();
    updated.frequency = candidate.frequency;
    updated.expected_amount = candidate.expected_amount;
    updated.amount_tolerance = candidate.amount_tolerance;
    updated.first_seen_at = candidate.first_seen_at;
    updated.last_seen_at = candidate.last_seen_at;
    updated.next_expected_at = candidate.next_expected_at;
    updated.occurrences = candidate.occurrences;
    updated.confidence = candidate.confidence;
    updated.linked_txn_ids = candidate.linked_txn_ids.clone();
    updated.updated_at = now;
    updated
}
