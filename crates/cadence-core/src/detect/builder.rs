use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::detect::amounts::resolve_consistent_partition;
use crate::detect::frequency::{Frequency, classify};
use crate::detect::normalize::{UNKNOWN_MERCHANT_KEY, display_name, normalize};
use crate::detect::policy::{DETECTION_POLICY_V1, DetectionPolicy};
use crate::detect::types::TransactionRecord;

/// An in-memory detection result, prior to reconciliation with stored
/// patterns.
#[derive(Debug, Clone)]
pub struct CandidatePattern {
    pub account_id: String,
    pub merchant_key: String,
    pub display_name: String,
    pub frequency: Frequency,
    pub confidence: f64,
    pub expected_amount: f64,
    pub amount_tolerance: f64,
    pub first_seen_at: NaiveDate,
    pub last_seen_at: NaiveDate,
    pub next_expected_at: NaiveDate,
    pub occurrences: i64,
    pub linked_txn_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownMerchant,
    InsufficientHistory,
    InconsistentAmounts,
    NoPeriodicity,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownMerchant => "unknown_merchant",
            Self::InsufficientHistory => "insufficient_history",
            Self::InconsistentAmounts => "inconsistent_amounts",
            Self::NoPeriodicity => "no_periodicity",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedGroup {
    pub account_id: String,
    pub merchant_key: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub candidates: Vec<CandidatePattern>,
    pub skipped: Vec<SkippedGroup>,
}

#[derive(Debug)]
struct MerchantGroup {
    account_id: String,
    merchant_key: String,
    rows: Vec<TransactionRecord>,
}

pub fn detect(transactions: &[TransactionRecord]) -> DetectionReport {
    detect_with_policy(transactions, DETECTION_POLICY_V1)
}

/// The detection run: group by (account, merchant key), then let the
/// amount model and the frequency classifier vote each group up or out.
///
/// Read-only and side-effect-free; a group that cannot be classified is
/// logged and counted, never fatal to the run.
pub fn detect_with_policy(
    transactions: &[TransactionRecord],
    policy: DetectionPolicy,
) -> DetectionReport {
    let mut groups: BTreeMap<(String, String), MerchantGroup> = BTreeMap::new();
    for transaction in transactions {
        let merchant_key = normalize(transaction.merchant_text());
        let group_key = (transaction.account_id.clone(), merchant_key.clone());
        let entry = groups.entry(group_key).or_insert_with(|| MerchantGroup {
            account_id: transaction.account_id.clone(),
            merchant_key,
            rows: Vec::new(),
        });
        entry.rows.push(transaction.clone());
    }

    let mut candidates: Vec<CandidatePattern> = Vec::new();
    let mut skipped: Vec<SkippedGroup> = Vec::new();

    for group in groups.values_mut() {
        group.rows.sort_by(|left, right| {
            left.posted_at
                .cmp(&right.posted_at)
                .then_with(|| left.txn_id.cmp(&right.txn_id))
        });

        match build_candidate(group, policy) {
            Ok(candidate) => candidates.push(candidate),
            Err(reason) => {
                tracing::debug!(
                    account = %group.account_id,
                    merchant = %group.merchant_key,
                    reason = reason.as_str(),
                    "skipping merchant group"
                );
                skipped.push(SkippedGroup {
                    account_id: group.account_id.clone(),
                    merchant_key: group.merchant_key.clone(),
                    reason,
                });
            }
        }
    }

    candidates.sort_by(compare_candidates);
    DetectionReport {
        candidates,
        skipped,
    }
}

fn build_candidate(
    group: &MerchantGroup,
    policy: DetectionPolicy,
) -> Result<CandidatePattern, SkipReason> {
    if group.merchant_key == UNKNOWN_MERCHANT_KEY {
        return Err(SkipReason::UnknownMerchant);
    }
    if group.rows.len() < policy.min_occurrences {
        return Err(SkipReason::InsufficientHistory);
    }

    let amounts: Vec<f64> = group.rows.iter().map(|row| row.amount).collect();
    let Some((kept_indices, evaluation)) = resolve_consistent_partition(&amounts, policy) else {
        return Err(SkipReason::InconsistentAmounts);
    };

    let kept: Vec<&TransactionRecord> = kept_indices
        .iter()
        .map(|index| &group.rows[*index])
        .collect();
    let dates: Vec<NaiveDate> = kept.iter().map(|row| row.posted_at).collect();
    let Some(call) = classify(&dates, policy) else {
        return Err(SkipReason::NoPeriodicity);
    };

    let descriptions: Vec<&str> = kept.iter().map(|row| row.description.as_str()).collect();
    let first_seen_at = dates[0];
    let last_seen_at = dates[dates.len() - 1];

    Ok(CandidatePattern {
        account_id: group.account_id.clone(),
        merchant_key: group.merchant_key.clone(),
        display_name: display_name(&descriptions),
        frequency: call.frequency,
        confidence: call.confidence,
        expected_amount: evaluation.center,
        amount_tolerance: evaluation.tolerance,
        first_seen_at,
        last_seen_at,
        next_expected_at: call.frequency.advance(last_seen_at),
        occurrences: i64::try_from(kept.len()).unwrap_or(0),
        linked_txn_ids: kept.iter().map(|row| row.txn_id.clone()).collect(),
    })
}

fn compare_candidates(left: &CandidatePattern, right: &CandidatePattern) -> Ordering {
    left.next_expected_at
        .cmp(&right.next_expected_at)
        .then_with(|| right.confidence.total_cmp(&left.confidence))
        .then_with(|| left.merchant_key.cmp(&right.merchant_key))
        .then_with(|| left.account_id.cmp(&right.account_id))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::detect::frequency::Frequency;
    use crate::detect::types::TransactionRecord;

    use super::{SkipReason, detect};

    fn row(
        txn_id: &str,
        account_id: &str,
        date: &str,
        amount: f64,
        description: &str,
    ) -> TransactionRecord {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d");
        assert!(parsed.is_ok());
        TransactionRecord {
            txn_id: txn_id.to_string(),
            account_id: account_id.to_string(),
            posted_at: parsed.unwrap_or(NaiveDate::MIN),
            amount,
            description: description.to_string(),
            merchant: None,
        }
    }

    #[test]
    fn netflix_scenario_produces_one_monthly_candidate() {
        let rows = vec![
            row("t1", "acct", "2026-01-01", -15.99, "NETFLIX.COM 4857"),
            row("t2", "acct", "2026-02-01", -15.99, "NETFLIX.COM 4857"),
            row("t3", "acct", "2026-03-01", -15.99, "NETFLIX.COM 4857"),
            row("t4", "acct", "2026-04-01", -15.99, "NETFLIX.COM 4857"),
            row("t5", "acct", "2026-05-01", -15.99, "NETFLIX.COM 4857"),
            row("t6", "acct", "2026-06-01", -15.99, "NETFLIX.COM 4857"),
        ];

        let report = detect(&rows);
        assert_eq!(report.candidates.len(), 1);
        let candidate = &report.candidates[0];
        assert_eq!(candidate.merchant_key, "netflix com");
        assert_eq!(candidate.frequency, Frequency::Monthly);
        assert_eq!(candidate.occurrences, 6);
        assert!((candidate.expected_amount - -15.99).abs() < 1e-9);
        assert!(candidate.confidence >= 0.6);
        assert_eq!(
            candidate.next_expected_at,
            NaiveDate::from_ymd_opt(2026, 7, 1).unwrap_or(NaiveDate::MIN)
        );
    }

    #[test]
    fn groups_under_three_rows_produce_no_candidate() {
        let rows = vec![
            row("t1", "acct", "2026-01-01", -9.99, "SPOTIFY"),
            row("t2", "acct", "2026-01-31", -9.99, "SPOTIFY"),
        ];

        let report = detect(&rows);
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::InsufficientHistory);
    }

    #[test]
    fn unknown_merchant_groups_are_excluded() {
        let rows = vec![
            row("t1", "acct", "2026-01-01", -20.0, "4857 0021"),
            row("t2", "acct", "2026-02-01", -20.0, "4857 0021"),
            row("t3", "acct", "2026-03-01", -20.0, "4857 0021"),
        ];

        let report = detect(&rows);
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::UnknownMerchant);
    }

    #[test]
    fn merchant_renaming_noise_still_groups_together() {
        let rows = vec![
            row("t1", "acct", "2026-01-05", -12.0, "GYM CLUB 1001"),
            row("t2", "acct", "2026-02-05", -12.0, "GYM CLUB 1002"),
            row("t3", "acct", "2026-03-05", -12.0, "Gym-Club 1003"),
            row("t4", "acct", "2026-04-05", -12.0, "GYM CLUB 1001"),
        ];

        let report = detect(&rows);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].merchant_key, "gym club");
        assert_eq!(report.candidates[0].display_name, "GYM CLUB 1001");
    }

    #[test]
    fn volatile_amounts_are_skipped_as_inconsistent() {
        let rows = vec![
            row("t1", "acct", "2026-01-01", -5.0, "UTILITY CO"),
            row("t2", "acct", "2026-02-01", -100.0, "UTILITY CO"),
            row("t3", "acct", "2026-03-01", -10.0, "UTILITY CO"),
        ];

        let report = detect(&rows);
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::InconsistentAmounts);
    }

    #[test]
    fn refund_noise_is_partitioned_away_from_the_charges() {
        let rows = vec![
            row("t1", "acct", "2026-01-03", -30.0, "BOX SUB"),
            row("t2", "acct", "2026-02-03", -30.0, "BOX SUB"),
            row("t3", "acct", "2026-02-10", 30.0, "BOX SUB"),
            row("t4", "acct", "2026-03-03", -30.0, "BOX SUB"),
            row("t5", "acct", "2026-04-03", -30.0, "BOX SUB"),
        ];

        let report = detect(&rows);
        assert_eq!(report.candidates.len(), 1);
        let candidate = &report.candidates[0];
        assert_eq!(candidate.occurrences, 4);
        assert!(candidate.expected_amount < 0.0);
        assert!(!candidate.linked_txn_ids.contains(&"t3".to_string()));
    }

    #[test]
    fn same_merchant_in_two_accounts_stays_two_groups() {
        let mut rows = Vec::new();
        for (index, date) in ["2026-01-01", "2026-02-01", "2026-03-01", "2026-04-01"]
            .iter()
            .enumerate()
        {
            rows.push(row(&format!("a{index}"), "acct_a", date, -9.99, "SPOTIFY"));
            rows.push(row(&format!("b{index}"), "acct_b", date, -9.99, "SPOTIFY"));
        }

        let report = detect(&rows);
        assert_eq!(report.candidates.len(), 2);
        assert_ne!(
            report.candidates[0].account_id,
            report.candidates[1].account_id
        );
    }

    #[test]
    fn aperiodic_history_is_skipped_for_no_periodicity() {
        let rows = vec![
            row("t1", "acct", "2026-01-01", -25.0, "CORNER STORE"),
            row("t2", "acct", "2026-01-04", -25.0, "CORNER STORE"),
            row("t3", "acct", "2026-02-20", -25.0, "CORNER STORE"),
            row("t4", "acct", "2026-04-01", -25.0, "CORNER STORE"),
        ];

        let report = detect(&rows);
        assert!(report.candidates.is_empty());
        assert_eq!(report.skipped[0].reason, SkipReason::NoPeriodicity);
    }

    #[test]
    fn detection_is_deterministic_across_input_order() {
        let mut rows = vec![
            row("t3", "acct", "2026-03-01", -15.99, "NETFLIX.COM"),
            row("t1", "acct", "2026-01-01", -15.99, "NETFLIX.COM"),
            row("t4", "acct", "2026-04-01", -15.99, "NETFLIX.COM"),
            row("t2", "acct", "2026-02-01", -15.99, "NETFLIX.COM"),
        ];
        let forward = detect(&rows);
        rows.reverse();
        let backward = detect(&rows);

        assert_eq!(forward.candidates.len(), backward.candidates.len());
        assert_eq!(
            forward.candidates[0].linked_txn_ids,
            backward.candidates[0].linked_txn_ids
        );
    }
}
