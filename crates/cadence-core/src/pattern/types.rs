use chrono::NaiveDate;

use crate::detect::frequency::Frequency;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternStatus {
    /// Auto-created by a detection run; detection may freely refresh it.
    Detected,
    /// User-vouched; detection advances its dates but never its status.
    Confirmed,
    /// User-rejected; detection must never resurrect it.
    Dismissed,
    /// Tracking suspended; resumes only via explicit un-pause.
    Paused,
}

impl PatternStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Confirmed => "confirmed",
            Self::Dismissed => "dismissed",
            Self::Paused => "paused",
        }
    }

    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "detected" => Some(Self::Detected),
            "confirmed" => Some(Self::Confirmed),
            "dismissed" => Some(Self::Dismissed),
            "paused" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// A stored recurring pattern. Identity is the `pattern_id`; the reconcile
/// key `(space_id, account_id, merchant_key)` is unique in storage so
/// overlapping detection runs converge instead of duplicating.
#[derive(Debug, Clone)]
pub struct RecurringPattern {
    pub pattern_id: String,
    pub space_id: String,
    pub account_id: String,
    pub merchant_key: String,
    pub display_name: String,
    pub frequency: Frequency,
    pub expected_amount: f64,
    pub amount_tolerance: f64,
    pub status: PatternStatus,
    pub first_seen_at: NaiveDate,
    pub last_seen_at: NaiveDate,
    pub next_expected_at: NaiveDate,
    pub occurrences: i64,
    pub confidence: f64,
    pub linked_txn_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    pub status: Option<PatternStatus>,
    /// When no explicit status is requested, `detected` rows are included
    /// only if this is set.
    pub include_detected: bool,
}

impl PatternFilter {
    pub fn all() -> Self {
        Self {
            status: None,
            include_detected: true,
        }
    }
}
