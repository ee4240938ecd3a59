use crate::detect::policy::DetectionPolicy;

#[derive(Debug, Clone, Copy)]
pub struct AmountEvaluation {
    /// Median of the amounts, robust to one-off outliers.
    pub center: f64,
    /// Reported drift band: the widest observed deviation, floored at a
    /// share of |center| so tight histories still tolerate small moves.
    pub tolerance: f64,
    pub consistent: bool,
}

/// Decides whether a set of amounts is "the same recurring amount".
///
/// A charge and a refund are never the same recurring pattern, so mixed
/// signs fail outright; callers re-partition by sign and try once more via
/// [`resolve_consistent_partition`]. Within one sign, every deviation from
/// the median must stay inside the policy drift band.
pub fn evaluate(amounts: &[f64], policy: DetectionPolicy) -> AmountEvaluation {
    if amounts.is_empty() {
        return AmountEvaluation {
            center: 0.0,
            tolerance: 0.0,
            consistent: false,
        };
    }

    let mut sorted = amounts.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));
    let center = median(&sorted).unwrap_or(0.0);

    let max_deviation = amounts
        .iter()
        .map(|amount| (amount - center).abs())
        .fold(0.0_f64, f64::max);
    let tolerance = max_deviation.max(policy.amount_floor(center));

    let mixed_signs =
        amounts.iter().any(|amount| *amount < 0.0) && amounts.iter().any(|amount| *amount > 0.0);
    let consistent = !mixed_signs && max_deviation <= policy.amount_drift_band(center);

    AmountEvaluation {
        center,
        tolerance,
        consistent,
    }
}

/// One sign re-partition attempt for a mixed or drifting group.
///
/// Returns the indices of the amounts that form a consistent recurring set
/// together with their evaluation, or `None` when the group must be
/// rejected as non-recurring. When both sign partitions qualify, the larger
/// one carries the group; equal sizes prefer the charge side, since
/// recurring obligations are outflows far more often than inflows.
pub fn resolve_consistent_partition(
    amounts: &[f64],
    policy: DetectionPolicy,
) -> Option<(Vec<usize>, AmountEvaluation)> {
    let whole = evaluate(amounts, policy);
    if whole.consistent {
        return Some(((0..amounts.len()).collect(), whole));
    }

    let negatives: Vec<usize> = indices_where(amounts, |amount| amount < 0.0);
    let positives: Vec<usize> = indices_where(amounts, |amount| amount >= 0.0);
    if negatives.is_empty() || positives.is_empty() {
        // Single-sign group that still drifts too much: nothing to split.
        return None;
    }

    let negative_eval = evaluate(&collect(amounts, &negatives), policy);
    let positive_eval = evaluate(&collect(amounts, &positives), policy);

    let negative_ok = negative_eval.consistent && negatives.len() >= policy.min_occurrences;
    let positive_ok = positive_eval.consistent && positives.len() >= policy.min_occurrences;

    match (negative_ok, positive_ok) {
        (true, true) => {
            if positives.len() > negatives.len() {
                Some((positives, positive_eval))
            } else {
                Some((negatives, negative_eval))
            }
        }
        (true, false) => Some((negatives, negative_eval)),
        (false, true) => Some((positives, positive_eval)),
        (false, false) => None,
    }
}

fn indices_where(amounts: &[f64], keep: impl Fn(f64) -> bool) -> Vec<usize> {
    amounts
        .iter()
        .enumerate()
        .filter(|(_, amount)| keep(**amount))
        .map(|(index, _)| index)
        .collect()
}

fn collect(amounts: &[f64], indices: &[usize]) -> Vec<f64> {
    indices.iter().map(|index| amounts[*index]).collect()
}

fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        return Some((sorted[mid - 1] + sorted[mid]) / 2.0);
    }
    Some(sorted[mid])
}

#[cfg(test)]
mod tests {
    use crate::detect::policy::DETECTION_POLICY_V1;

    use super::{evaluate, resolve_consistent_partition};

    #[test]
    fn identical_amounts_are_consistent() {
        let result = evaluate(&[-15.99, -15.99, -15.99], DETECTION_POLICY_V1);
        assert!(result.consistent);
        assert!((result.center - -15.99).abs() < 1e-9);
    }

    #[test]
    fn tolerance_floor_covers_small_variable_bills() {
        let result = evaluate(&[-82.10, -79.55, -81.00, -80.25], DETECTION_POLICY_V1);
        assert!(result.consistent);
        // Floor is 5% of |center|, wider than the observed drift here.
        assert!(result.tolerance >= 0.05 * result.center.abs());
    }

    #[test]
    fn mixed_signs_are_inconsistent_unsplit() {
        let result = evaluate(&[100.0, 100.0, 100.0, -100.0], DETECTION_POLICY_V1);
        assert!(!result.consistent);
    }

    #[test]
    fn sign_partition_recovers_the_charge_side() {
        let resolved =
            resolve_consistent_partition(&[100.0, 100.0, 100.0, -100.0], DETECTION_POLICY_V1);
        assert!(resolved.is_some());
        if let Some((indices, evaluation)) = resolved {
            assert_eq!(indices, vec![0, 1, 2]);
            assert!(evaluation.consistent);
            assert!((evaluation.center - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn equal_partitions_prefer_the_negative_side() {
        let resolved = resolve_consistent_partition(
            &[-9.99, -9.99, -9.99, 25.0, 25.0, 25.0],
            DETECTION_POLICY_V1,
        );
        assert!(resolved.is_some());
        if let Some((indices, evaluation)) = resolved {
            assert_eq!(indices, vec![0, 1, 2]);
            assert!(evaluation.center < 0.0);
        }
    }

    #[test]
    fn volatile_single_sign_groups_are_rejected() {
        let resolved =
            resolve_consistent_partition(&[-5.0, -100.0, -10.0], DETECTION_POLICY_V1);
        assert!(resolved.is_none());
    }

    #[test]
    fn still_inconsistent_after_one_repartition_is_rejected() {
        let resolved = resolve_consistent_partition(
            &[-5.0, -100.0, -10.0, 3.0, 90.0, 7.0],
            DETECTION_POLICY_V1,
        );
        assert!(resolved.is_none());
    }

    #[test]
    fn empty_input_is_inconsistent() {
        assert!(!evaluate(&[], DETECTION_POLICY_V1).consistent);
    }
}
