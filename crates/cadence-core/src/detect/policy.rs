use crate::detect::frequency::Frequency;

/// Deterministic detection policy identifier, emitted with detection
/// results so threshold changes remain auditable across versions.
pub const DETECTION_POLICY_VERSION: &str = "detection/v1";

/// v1 detection policy.
///
/// Every heuristic constant the detector relies on lives here so callers
/// can override the defaults without touching the algorithms. The defaults
/// are a reasonable policy, not a bit-exact contract.
#[derive(Debug, Clone, Copy)]
pub struct DetectionPolicy {
    /// Minimum transactions in a merchant group before any inference runs.
    pub min_occurrences: usize,
    /// Fraction of consecutive gaps that must fit a frequency's window.
    pub min_interval_fit: f64,
    /// Window around the fixed-day expectation for weekly/biweekly.
    pub fixed_gap_tolerance_days: i64,
    /// Window around the calendar-advanced expectation for monthly/quarterly/yearly.
    pub calendar_tolerance_days: i64,
    /// Below this many observations the confidence is discounted.
    pub small_sample_threshold: usize,
    pub small_sample_discount: f64,
    /// Reported tolerance never shrinks below this share of |center|.
    pub amount_floor_ratio: f64,
    /// Amounts are "the same recurring amount" while every deviation from
    /// the median stays inside max(drift_ratio * |center|, drift_floor).
    pub amount_drift_ratio: f64,
    pub amount_drift_floor: f64,
}

impl DetectionPolicy {
    pub fn gap_tolerance_days(self, frequency: Frequency) -> i64 {
        match frequency {
            Frequency::Weekly | Frequency::Biweekly => self.fixed_gap_tolerance_days,
            Frequency::Monthly | Frequency::Quarterly | Frequency::Yearly => {
                self.calendar_tolerance_days
            }
        }
    }

    /// Shorter periods win ties: they are verified faster and are less
    /// likely to be coincidental alignment of a longer one.
    pub fn frequency_priority(self, frequency: Frequency) -> i8 {
        match frequency {
            Frequency::Weekly => 1,
            Frequency::Biweekly => 2,
            Frequency::Monthly => 3,
            Frequency::Quarterly => 4,
            Frequency::Yearly => 5,
        }
    }

    pub fn confidence(self, interval_fit: f64, observations: usize) -> f64 {
        if observations < self.small_sample_threshold {
            return interval_fit * self.small_sample_discount;
        }
        interval_fit
    }

    pub fn amount_floor(self, center: f64) -> f64 {
        center.abs() * self.amount_floor_ratio
    }

    pub fn amount_drift_band(self, center: f64) -> f64 {
        (center.abs() * self.amount_drift_ratio).max(self.amount_drift_floor)
    }
}

pub const DETECTION_POLICY_V1: DetectionPolicy = DetectionPolicy {
    min_occurrences: 3,
    min_interval_fit: 0.6,
    fixed_gap_tolerance_days: 2,
    calendar_tolerance_days: 4,
    small_sample_threshold: 5,
    small_sample_discount: 0.9,
    amount_floor_ratio: 0.05,
    amount_drift_ratio: 0.25,
    amount_drift_floor: 1.00,
};
