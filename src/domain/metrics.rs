use crate::domain::errors::ValidationError;
use crate::domain::types::CalculatedMetrics;
use std::str::FromStr;

/// Which secondary counter a deployment collects alongside GT and TP.
///
/// Pinned once through configuration; the engine never guesses the variant
/// from which fields happen to be filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    /// The secondary input is the total number of predicted detections.
    PredictedTotal,
    /// The secondary input is the false-positive count itself.
    FalsePositives,
}

impl FromStr for CounterMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "predicted" | "predicted-total" => Ok(CounterMode::PredictedTotal),
            "fp" | "false-positives" => Ok(CounterMode::FalsePositives),
            _ => anyhow::bail!(
                "Invalid counter mode: {}. Must be 'predicted' or 'false-positives'",
                s
            ),
        }
    }
}

/// Gate raw counters before a record may be created.
///
/// Rules are checked in fixed priority order and the first failure wins.
/// Callers coerce empty or unparseable input to 0 before reaching here.
pub fn validate(
    mode: CounterMode,
    gt: i64,
    tp: i64,
    secondary: i64,
) -> Result<(), ValidationError> {
    if gt < 0 || tp < 0 || secondary < 0 {
        return Err(ValidationError::NonNegative { gt, tp, secondary });
    }

    // You cannot validate more unique ground-truth objects than exist.
    if tp > gt {
        return Err(ValidationError::TruePositiveExceedsGroundTruth { tp, gt });
    }

    // You cannot have more correct detections than detections made.
    if mode == CounterMode::PredictedTotal && tp > secondary {
        return Err(ValidationError::TruePositiveExceedsPredicted {
            tp,
            pred_total: secondary,
        });
    }

    Ok(())
}

/// Derive the full metric set from validated raw counters.
///
/// The secondary counter is first normalized to an (fp, predicted-total)
/// pair, then a single formula family applies. Every division guards its
/// denominator: a zero denominator yields 0, never NaN or infinity.
pub fn compute_metrics(mode: CounterMode, gt: i64, tp: i64, secondary: i64) -> CalculatedMetrics {
    let (false_positives, pred_total) = match mode {
        CounterMode::PredictedTotal => ((secondary - tp).max(0), secondary),
        CounterMode::FalsePositives => (secondary, tp + secondary),
    };
    let false_negatives = (gt - tp).max(0);

    let precision = if pred_total > 0 {
        tp as f64 / pred_total as f64
    } else {
        0.0
    };
    let recall = if gt > 0 { tp as f64 / gt as f64 } else { 0.0 };
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let far = if pred_total > 0 {
        false_positives as f64 / pred_total as f64
    } else {
        0.0
    };

    CalculatedMetrics {
        precision,
        recall,
        f1_score,
        far,
        false_positives,
        false_negatives,
        pred_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_validate_accepts_consistent_counters() {
        assert!(validate(CounterMode::PredictedTotal, 10, 7, 10).is_ok());
        assert!(validate(CounterMode::FalsePositives, 10, 7, 3).is_ok());
        assert!(validate(CounterMode::PredictedTotal, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_counters_first() {
        // Negativity outranks the tp > gt rule.
        let err = validate(CounterMode::PredictedTotal, -1, 5, 2).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonNegative {
                gt: -1,
                tp: 5,
                secondary: 2
            }
        );

        assert!(validate(CounterMode::PredictedTotal, 5, -1, 5).is_err());
        assert!(validate(CounterMode::FalsePositives, 5, 3, -2).is_err());
    }

    #[test]
    fn test_validate_rejects_tp_above_gt() {
        let err = validate(CounterMode::PredictedTotal, 5, 6, 10).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TruePositiveExceedsGroundTruth { tp: 6, gt: 5 }
        );
    }

    #[test]
    fn test_validate_rejects_tp_above_predicted() {
        let err = validate(CounterMode::PredictedTotal, 10, 7, 6).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TruePositiveExceedsPredicted {
                tp: 7,
                pred_total: 6
            }
        );
    }

    #[test]
    fn test_validate_ignores_predicted_rule_in_fp_mode() {
        // Secondary is the FP count here, so tp > secondary is fine.
        assert!(validate(CounterMode::FalsePositives, 10, 7, 3).is_ok());
    }

    #[test]
    fn test_tp_above_gt_outranks_tp_above_predicted() {
        let err = validate(CounterMode::PredictedTotal, 5, 8, 6).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TruePositiveExceedsGroundTruth { tp: 8, gt: 5 }
        );
    }

    #[test]
    fn test_compute_all_zero_counters() {
        for mode in [CounterMode::PredictedTotal, CounterMode::FalsePositives] {
            let m = compute_metrics(mode, 0, 0, 0);
            assert_eq!(m.precision, 0.0);
            assert_eq!(m.recall, 0.0);
            assert_eq!(m.f1_score, 0.0);
            assert_eq!(m.far, 0.0);
            assert_eq!(m.false_negatives, 0);
            assert_eq!(m.false_positives, 0);
        }
    }

    #[test]
    fn test_compute_known_scenario_fp_mode() {
        // gt=10, tp=7, fp=3
        let m = compute_metrics(CounterMode::FalsePositives, 10, 7, 3);
        assert_eq!(m.false_positives, 3);
        assert_eq!(m.false_negatives, 3);
        assert_eq!(m.pred_total, 10);
        assert!((m.precision - 0.7).abs() < EPS);
        assert!((m.recall - 0.7).abs() < EPS);
        assert!((m.f1_score - 0.7).abs() < EPS);
        assert!((m.far - 0.3).abs() < EPS);
    }

    #[test]
    fn test_compute_known_scenario_predicted_mode() {
        // Same ground truth expressed as gt=10, tp=7, pred=10.
        let m = compute_metrics(CounterMode::PredictedTotal, 10, 7, 10);
        assert_eq!(m.false_positives, 3);
        assert_eq!(m.false_negatives, 3);
        assert!((m.precision - 0.7).abs() < EPS);
        assert!((m.recall - 0.7).abs() < EPS);
        assert!((m.f1_score - 0.7).abs() < EPS);
        assert!((m.far - 0.3).abs() < EPS);
    }

    #[test]
    fn test_compute_perfect_run() {
        let m = compute_metrics(CounterMode::PredictedTotal, 8, 8, 8);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1_score, 1.0);
        assert_eq!(m.far, 0.0);
        assert_eq!(m.false_negatives, 0);
    }

    #[test]
    fn test_compute_no_predictions_made() {
        // gt > 0 but nothing predicted: recall 0, everything else 0 too.
        let m = compute_metrics(CounterMode::PredictedTotal, 5, 0, 0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert_eq!(m.far, 0.0);
        assert_eq!(m.false_negatives, 5);
    }

    #[test]
    fn test_rates_stay_in_unit_interval() {
        for gt in 0..12i64 {
            for tp in 0..=gt {
                for secondary in tp..15i64 {
                    let m = compute_metrics(CounterMode::PredictedTotal, gt, tp, secondary);
                    for rate in [m.precision, m.recall, m.f1_score, m.far] {
                        assert!(rate.is_finite());
                        assert!((0.0..=1.0).contains(&rate), "rate {} out of range", rate);
                    }
                    assert!(m.false_positives >= 0);
                    assert!(m.false_negatives >= 0);
                }
            }
        }
    }

    #[test]
    fn test_false_negatives_identical_across_modes() {
        for gt in 0..10i64 {
            for tp in 0..=gt {
                let a = compute_metrics(CounterMode::PredictedTotal, gt, tp, tp + 2);
                let b = compute_metrics(CounterMode::FalsePositives, gt, tp, 2);
                assert_eq!(a.false_negatives, (gt - tp).max(0));
                assert_eq!(a.false_negatives, b.false_negatives);
            }
        }
    }

    #[test]
    fn test_counter_mode_parsing() {
        assert_eq!(
            CounterMode::from_str("predicted").unwrap(),
            CounterMode::PredictedTotal
        );
        assert_eq!(
            CounterMode::from_str("false-positives").unwrap(),
            CounterMode::FalsePositives
        );
        assert_eq!(CounterMode::from_str("FP").unwrap(), CounterMode::FalsePositives);
        assert!(CounterMode::from_str("both").is_err());
    }
}
