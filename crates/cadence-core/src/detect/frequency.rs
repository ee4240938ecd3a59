use chrono::{Duration, NaiveDate};

use crate::detect::dates::add_months_clamped;
use crate::detect::policy::DetectionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

pub const ALL_FREQUENCIES: [Frequency; 5] = [
    Frequency::Weekly,
    Frequency::Biweekly,
    Frequency::Monthly,
    Frequency::Quarterly,
    Frequency::Yearly,
];

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "weekly" => Some(Self::Weekly),
            "biweekly" => Some(Self::Biweekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Nominal day gap, used only for the fixed-gap frequencies' window
    /// math. The calendar frequencies advance by month arithmetic instead.
    pub const fn expected_interval_days(self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 91,
            Self::Yearly => 365,
        }
    }

    /// One period forward from `date`. Weekly and biweekly are fixed day
    /// counts; the rest are calendar-advanced so month-length variation
    /// does not drift the projection.
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Weekly => date + Duration::days(7),
            Self::Biweekly => date + Duration::days(14),
            Self::Monthly => add_months_clamped(date, 1),
            Self::Quarterly => add_months_clamped(date, 3),
            Self::Yearly => add_months_clamped(date, 12),
        }
    }

    /// Expected occurrences per calendar month, for the monthly-spend
    /// projection in the summary.
    pub fn periods_per_month(self) -> f64 {
        match self {
            Self::Weekly => 52.0 / 12.0,
            Self::Biweekly => 26.0 / 12.0,
            Self::Monthly => 1.0,
            Self::Quarterly => 1.0 / 3.0,
            Self::Yearly => 1.0 / 12.0,
        }
    }

    const fn uses_calendar_arithmetic(self) -> bool {
        matches!(self, Self::Monthly | Self::Quarterly | Self::Yearly)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrequencyCall {
    pub frequency: Frequency,
    pub interval_fit: f64,
    pub confidence: f64,
}

/// Infers the best-fit recurrence interval for a sorted list of dates.
///
/// Two points cannot distinguish noise from a pattern, so fewer than three
/// dates always returns `None`. Otherwise each candidate frequency is scored
/// by the fraction of consecutive gaps that land inside its tolerance
/// window; the best fraction wins if it reaches the policy threshold, with
/// ties preferring the shorter period.
pub fn classify(dates: &[NaiveDate], policy: DetectionPolicy) -> Option<FrequencyCall> {
    if dates.len() < policy.min_occurrences || dates.len() < 3 {
        return None;
    }

    let mut best: Option<(Frequency, f64)> = None;
    for frequency in ALL_FREQUENCIES {
        let fit = interval_fit(dates, frequency, policy);
        let replace = match best {
            Some((current, current_fit)) => {
                fit > current_fit
                    || (fit == current_fit
                        && policy.frequency_priority(frequency)
                            < policy.frequency_priority(current))
            }
            None => true,
        };
        if replace {
            best = Some((frequency, fit));
        }
    }

    let (frequency, fit) = best?;
    if fit < policy.min_interval_fit {
        return None;
    }

    Some(FrequencyCall {
        frequency,
        interval_fit: fit,
        confidence: policy.confidence(fit, dates.len()),
    })
}

fn interval_fit(dates: &[NaiveDate], frequency: Frequency, policy: DetectionPolicy) -> f64 {
    let total_intervals = dates.len() - 1;
    if total_intervals == 0 {
        return 0.0;
    }

    let tolerance = policy.gap_tolerance_days(frequency);
    let mut matches = 0usize;
    for index in 1..dates.len() {
        let error = interval_error(dates[index - 1], dates[index], frequency);
        if error <= tolerance {
            matches += 1;
        }
    }

    (matches as f64) / (total_intervals as f64)
}

fn interval_error(previous: NaiveDate, current: NaiveDate, frequency: Frequency) -> i64 {
    if frequency.uses_calendar_arithmetic() {
        let expected = frequency.advance(previous);
        return (current - expected).num_days().abs();
    }

    let actual = (current - previous).num_days().abs();
    (actual - frequency.expected_interval_days()).abs()
}
