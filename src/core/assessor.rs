use crate::core::decision::classify;
use crate::core::loader::RiskArtifact;
use crate::domain::model::{PatientFeatures, PredictionResult, Threshold};
use crate::domain::ports::RiskModel;
use crate::utils::error::{LoadError, Result, RiskError};
use crate::utils::validation::Validate;
use std::path::Path;

/// Owns the outcome of the one-time model load and serves predictions.
///
/// A failed load does not abort the process: the error stays available for
/// reporting and every [`RiskAssessor::assess`] call is refused.
pub struct RiskAssessor<M: RiskModel = RiskArtifact> {
    model: std::result::Result<M, LoadError>,
}

impl RiskAssessor<RiskArtifact> {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let model = RiskArtifact::load(path);

        match &model {
            Ok(artifact) => tracing::info!(
                "✅ Model '{}' loaded from {}",
                artifact.name(),
                path.display()
            ),
            Err(e) => tracing::error!("❌ Failed to load model: {}", e),
        }

        Self { model }
    }
}

impl<M: RiskModel> RiskAssessor<M> {
    pub fn new(model: M) -> Self {
        Self { model: Ok(model) }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ok()
    }

    /// The loaded model, or the error that prevented loading it.
    pub fn load_status(&self) -> std::result::Result<&M, &LoadError> {
        self.model.as_ref()
    }

    pub fn assess(&self, features: &PatientFeatures, threshold: Threshold) -> Result<PredictionResult> {
        let model = self
            .model
            .as_ref()
            .map_err(|e| RiskError::ModelUnavailable {
                reason: e.to_string(),
            })?;

        features.validate()?;

        let probability = model.predict_probability(features);
        let result = classify(probability, threshold);

        tracing::debug!(
            "🔎 {} scored {:?}: probability={:.4}, threshold={}, verdict={}",
            model.name(),
            features,
            probability,
            threshold,
            result.verdict
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Answer, Verdict};

    struct FixedModel(f64);

    impl RiskModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict_probability(&self, _features: &PatientFeatures) -> f64 {
            self.0
        }
    }

    fn patient() -> PatientFeatures {
        PatientFeatures::assemble(45, Answer::Yes, Answer::No, 100.0)
    }

    #[test]
    fn test_assess_scenarios_at_default_threshold() {
        let cases = [
            (0.50, Verdict::AtRisk),
            (0.49, Verdict::AtRisk),
            (0.40, Verdict::NoIndication),
        ];
        for (probability, expected) in cases {
            let assessor = RiskAssessor::new(FixedModel(probability));
            let result = assessor.assess(&patient(), Threshold::default()).unwrap();
            assert_eq!(result.verdict, expected, "probability {}", probability);
            assert_eq!(result.probability, probability);
        }
    }

    #[test]
    fn test_assess_rejects_out_of_domain_features() {
        let assessor = RiskAssessor::new(FixedModel(0.9));
        let features = PatientFeatures::assemble(121, Answer::No, Answer::No, 100.0);
        assert!(matches!(
            assessor.assess(&features, Threshold::default()),
            Err(RiskError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_missing_model_refuses_inference() {
        let assessor = RiskAssessor::from_path("/definitely/not/here/model.json");
        assert!(!assessor.is_ready());
        assert!(matches!(
            assessor.load_status(),
            Err(LoadError::Missing { .. })
        ));
        assert!(matches!(
            assessor.assess(&patient(), Threshold::default()),
            Err(RiskError::ModelUnavailable { .. })
        ));
    }
}
