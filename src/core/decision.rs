use crate::domain::model::{PredictionResult, Threshold, Verdict};

/// Positive verdict when `probability >= threshold`.
///
/// The comparison is inclusive: a probability exactly at the threshold is
/// classified as at risk.
pub fn decide(probability: f64, threshold: f64) -> bool {
    probability >= threshold
}

pub fn classify(probability: f64, threshold: Threshold) -> PredictionResult {
    PredictionResult {
        probability,
        verdict: Verdict::from(decide(probability, threshold.value())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_above_threshold() {
        assert!(decide(0.50, 0.49));
    }

    #[test]
    fn test_decide_boundary_is_inclusive() {
        assert!(decide(0.49, 0.49));
        assert!(decide(0.0, 0.0));
        assert!(decide(1.0, 1.0));
    }

    #[test]
    fn test_decide_below_threshold() {
        assert!(!decide(0.40, 0.49));
    }

    #[test]
    fn test_decide_matches_rule_on_grid() {
        for p in 0..=100 {
            for t in 0..=100 {
                let (p, t) = (p as f64 / 100.0, t as f64 / 100.0);
                assert_eq!(decide(p, t), p >= t, "p={} t={}", p, t);
            }
        }
    }

    #[test]
    fn test_raising_threshold_only_turns_positive_into_negative() {
        let p = 0.37;
        let mut previous = true;
        for t in 0..=100 {
            let current = decide(p, t as f64 / 100.0);
            assert!(previous || !current, "verdict flipped back to positive at t={}", t);
            previous = current;
        }
    }

    #[test]
    fn test_classify_uses_threshold() {
        let result = classify(0.49, Threshold::default());
        assert_eq!(result.verdict, Verdict::AtRisk);
        assert_eq!(result.probability, 0.49);

        let result = classify(0.2, Threshold::new(0.3).unwrap());
        assert_eq!(result.verdict, Verdict::NoIndication);
    }
}
