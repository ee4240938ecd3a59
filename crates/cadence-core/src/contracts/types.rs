use serde::Serialize;
use serde_json::Value;

use crate::detect::builder::{CandidatePattern, SkippedGroup};
use crate::detect::dates::format_iso_date;
use crate::pattern::summary::{PatternSummary, UpcomingCharge};
use crate::pattern::types::RecurringPattern;

/// Wire shape of a stored pattern. Dates travel as ISO `YYYY-MM-DD`
/// strings and timestamps as unix seconds.
#[derive(Debug, Clone, Serialize)]
pub struct PatternRow {
    pub pattern_id: String,
    pub account_id: String,
    pub merchant_key: String,
    pub display_name: String,
    pub frequency: String,
    pub status: String,
    pub expected_amount: f64,
    pub amount_tolerance: f64,
    pub confidence: f64,
    pub occurrences: i64,
    pub first_seen_at: String,
    pub last_seen_at: String,
    pub next_expected_at: String,
    pub linked_txn_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&RecurringPattern> for PatternRow {
    fn from(pattern: &RecurringPattern) -> Self {
        Self {
            pattern_id: pattern.pattern_id.clone(),
            account_id: pattern.account_id.clone(),
            merchant_key: pattern.merchant_key.clone(),
            display_name: pattern.display_name.clone(),
            frequency: pattern.frequency.as_str().to_string(),
            status: pattern.status.as_str().to_string(),
            expected_amount: pattern.expected_amount,
            amount_tolerance: pattern.amount_tolerance,
            confidence: pattern.confidence,
            occurrences: pattern.occurrences,
            first_seen_at: format_iso_date(&pattern.first_seen_at),
            last_seen_at: format_iso_date(&pattern.last_seen_at),
            next_expected_at: format_iso_date(&pattern.next_expected_at),
            linked_txn_ids: pattern.linked_txn_ids.clone(),
            created_at: pattern.created_at,
            updated_at: pattern.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRow {
    pub account_id: String,
    pub merchant_key: String,
    pub display_name: String,
    pub frequency: String,
    pub confidence: f64,
    pub expected_amount: f64,
    pub amount_tolerance: f64,
    pub next_expected_at: String,
    pub occurrences: i64,
}

impl From<&CandidatePattern> for CandidateRow {
    fn from(candidate: &CandidatePattern) -> Self {
        Self {
            account_id: candidate.account_id.clone(),
            merchant_key: candidate.merchant_key.clone(),
            display_name: candidate.display_name.clone(),
            frequency: candidate.frequency.as_str().to_string(),
            confidence: candidate.confidence,
            expected_amount: candidate.expected_amount,
            amount_tolerance: candidate.amount_tolerance,
            next_expected_at: format_iso_date(&candidate.next_expected_at),
            occurrences: candidate.occurrences,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedGroupRow {
    pub account_id: String,
    pub merchant_key: String,
    pub reason: String,
}

impl From<&SkippedGroup> for SkippedGroupRow {
    fn from(skipped: &SkippedGroup) -> Self {
        Self {
            account_id: skipped.account_id.clone(),
            merchant_key: skipped.merchant_key.clone(),
            reason: skipped.reason.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectData {
    pub space_id: String,
    pub policy_version: String,
    pub transactions_scanned: i64,
    pub total: i64,
    pub candidates: Vec<CandidateRow>,
    pub created: i64,
    pub updated: i64,
    pub unchanged: i64,
    pub skipped_groups: Vec<SkippedGroupRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternListData {
    pub space_id: String,
    pub total: i64,
    pub patterns: Vec<PatternRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternActionData {
    pub pattern_id: String,
    pub previous_status: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveData {
    pub pattern_id: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountsData {
    pub detected: i64,
    pub confirmed: i64,
    pub dismissed: i64,
    pub paused: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingRow {
    pub pattern_id: String,
    pub account_id: String,
    pub display_name: String,
    pub frequency: String,
    pub next_expected_at: String,
    pub expected_amount: f64,
}

impl From<&UpcomingCharge> for UpcomingRow {
    fn from(charge: &UpcomingCharge) -> Self {
        Self {
            pattern_id: charge.pattern_id.clone(),
            account_id: charge.account_id.clone(),
            display_name: charge.display_name.clone(),
            frequency: charge.frequency_label.clone(),
            next_expected_at: format_iso_date(&charge.next_expected_at),
            expected_amount: charge.expected_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub space_id: String,
    pub window_days: i64,
    pub monthly_recurring_spend: f64,
    pub counts: StatusCountsData,
    pub upcoming: Vec<UpcomingRow>,
}

impl SummaryData {
    pub fn from_summary(space_id: &str, window_days: i64, summary: &PatternSummary) -> Self {
        Self {
            space_id: space_id.to_string(),
            window_days,
            monthly_recurring_spend: summary.monthly_recurring_spend,
            counts: StatusCountsData {
                detected: summary.counts.detected,
                confirmed: summary.counts.confirmed,
                dismissed: summary.counts.dismissed,
                paused: summary.counts.paused,
            },
            upcoming: summary.upcoming.iter().map(UpcomingRow::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestData {
    pub space_id: String,
    pub path: String,
    pub format: String,
    pub rows_read: i64,
    pub inserted: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Value>,
}
