use chrono::{Duration, NaiveDate};

use crate::pattern::types::{PatternStatus, RecurringPattern};

pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCounts {
    pub detected: i64,
    pub confirmed: i64,
    pub dismissed: i64,
    pub paused: i64,
}

#[derive(Debug, Clone)]
pub struct UpcomingCharge {
    pub pattern_id: String,
    pub account_id: String,
    pub display_name: String,
    pub frequency_label: String,
    pub next_expected_at: NaiveDate,
    pub expected_amount: f64,
}

#[derive(Debug, Clone)]
pub struct PatternSummary {
    /// Sum of |expected outflow| normalized to a per-month rate across
    /// tracked (detected + confirmed) patterns.
    pub monthly_recurring_spend: f64,
    pub counts: StatusCounts,
    pub upcoming: Vec<UpcomingCharge>,
}

/// The read-side projection consumed by the UI: spend rate, status
/// counts, and the charges expected inside the rolling window. Dismissed
/// and paused patterns count in the totals but contribute nothing else.
pub fn summarize(
    patterns: &[RecurringPattern],
    today: NaiveDate,
    window_days: i64,
) -> PatternSummary {
    let mut counts = StatusCounts::default();
    let mut monthly_spend = 0.0_f64;
    let mut upcoming: Vec<UpcomingCharge> = Vec::new();
    // Saturate rather than overflow: an oversized window means "everything
    // from today on", never a panic.
    let window_end = Duration::try_days(window_days.max(0))
        .and_then(|span| today.checked_add_signed(span))
        .unwrap_or(NaiveDate::MAX);

    for pattern in patterns {
        match pattern.status {
            PatternStatus::Detected => counts.detected += 1,
            PatternStatus::Confirmed => counts.confirmed += 1,
            PatternStatus::Dismissed => counts.dismissed += 1,
            PatternStatus::Paused => counts.paused += 1,
        }

        if !is_tracked(pattern.status) {
            continue;
        }

        if pattern.expected_amount < 0.0 {
            monthly_spend +=
                pattern.expected_amount.abs() * pattern.frequency.periods_per_month();
        }

        if pattern.next_expected_at >= today && pattern.next_expected_at <= window_end {
            upcoming.push(UpcomingCharge {
                pattern_id: pattern.pattern_id.clone(),
                account_id: pattern.account_id.clone(),
                display_name: pattern.display_name.clone(),
                frequency_label: pattern.frequency.as_str().to_string(),
                next_expected_at: pattern.next_expected_at,
                expected_amount: pattern.expected_amount,
            });
        }
    }

    upcoming.sort_by(|left, right| {
        left.next_expected_at
            .cmp(&right.next_expected_at)
            .then_with(|| left.display_name.cmp(&right.display_name))
            .then_with(|| left.pattern_id.cmp(&right.pattern_id))
    });

    PatternSummary {
        monthly_recurring_spend: round_to(monthly_spend, 2),
        counts,
        upcoming,
    }
}

const fn is_tracked(status: PatternStatus) -> bool {
    matches!(status, PatternStatus::Detected | PatternStatus::Confirmed)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}
