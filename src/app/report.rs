use crate::domain::model::{PatientFeatures, PredictionResult, Threshold, Verdict};
use crate::utils::error::Result;
use serde::Serialize;

pub const DISCLAIMER: &str = "This model was built from historical patient data. \
The prediction does not replace a physician's diagnosis; use it only to understand early risk.";

#[derive(Debug, Serialize)]
pub struct RiskReport {
    pub model: String,
    pub features: PatientFeatures,
    pub threshold: f64,
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub disclaimer: &'static str,
}

impl RiskReport {
    pub fn new(
        model: impl Into<String>,
        features: PatientFeatures,
        threshold: Threshold,
        prediction: PredictionResult,
    ) -> Self {
        Self {
            model: model.into(),
            features,
            threshold: threshold.value(),
            prediction,
            disclaimer: DISCLAIMER,
        }
    }

    pub fn render_text(&self) -> String {
        let marker = match self.prediction.verdict {
            Verdict::AtRisk => "⚠️",
            Verdict::NoIndication => "✅",
        };

        let mut out = String::new();
        out.push_str("📊 Prediction Result\n");
        out.push_str(&format!(
            "Probability of stroke: {:.2}\n",
            self.prediction.probability
        ));
        out.push_str(&format!(
            "{} {}\n",
            marker,
            self.prediction.verdict.description()
        ));
        out.push_str(&format!("(threshold {:.2}, model {})\n", self.threshold, self.model));
        out.push('\n');
        out.push_str(&format!("ℹ️ {}\n", self.disclaimer));
        out
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
