use stroke_risk::core::decision::classify;
use stroke_risk::{decide, Answer, PatientFeatures, Threshold, Verdict};

#[test]
fn test_concrete_scenarios_at_default_threshold() {
    let threshold = Threshold::default().value();
    assert_eq!(threshold, 0.49);

    assert!(decide(0.50, threshold), "0.50 must be at risk");
    assert!(decide(0.49, threshold), "boundary must be inclusive");
    assert!(!decide(0.40, threshold), "0.40 must show no indication");
}

/// 門檻上升時，判定只會從陽性變成陰性，不會反過來
#[test]
fn test_verdict_is_monotonic_in_threshold() {
    for p in [0.0, 0.1, 0.25, 0.49, 0.5, 0.75, 1.0] {
        let verdicts: Vec<bool> = (0..=100).map(|t| decide(p, t as f64 / 100.0)).collect();
        let first_negative = verdicts.iter().position(|v| !v).unwrap_or(verdicts.len());
        assert!(
            verdicts[first_negative..].iter().all(|v| !v),
            "verdict for p={} flipped back to positive",
            p
        );
        assert!(verdicts[..first_negative].iter().all(|v| *v));
    }
}

#[test]
fn test_classify_maps_to_verdict() {
    let threshold = Threshold::default();
    assert_eq!(classify(0.50, threshold).verdict, Verdict::AtRisk);
    assert_eq!(classify(0.49, threshold).verdict, Verdict::AtRisk);
    assert_eq!(classify(0.40, threshold).verdict, Verdict::NoIndication);
}

#[test]
fn test_assemble_is_a_pure_named_mapping() {
    let features = PatientFeatures::assemble(45, "Ya".parse().unwrap(), "Tidak".parse().unwrap(), 100.0);
    assert_eq!(features.age, 45);
    assert_eq!(features.heart_disease, 1);
    assert_eq!(features.hypertension, 0);
    assert_eq!(features.avg_glucose_level, 100.0);

    // 相同輸入得到相同結果
    assert_eq!(
        features,
        PatientFeatures::assemble(45, Answer::Yes, Answer::No, 100.0)
    );
    assert_eq!(features.to_model_input(), [45.0, 1.0, 100.0, 0.0]);
}
