use crate::utils::error::{Result, RiskError};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 模型訓練時的特徵名稱與順序，推論輸入必須完全一致
pub const FEATURE_NAMES: [&str; 4] = ["age", "heart_disease", "avg_glucose_level", "hypertension"];

pub const AGE_RANGE: (u32, u32) = (1, 120);
pub const GLUCOSE_RANGE: (f64, f64) = (50.0, 300.0);

/// Yes/no answer from the input form. Accepts the Indonesian labels
/// ("Ya"/"Tidak") as well as English spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_flag(self) -> u8 {
        match self {
            Answer::Yes => 1,
            Answer::No => 0,
        }
    }
}

impl FromStr for Answer {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ya" | "yes" | "y" | "1" | "true" => Ok(Answer::Yes),
            "tidak" | "no" | "n" | "0" | "false" => Ok(Answer::No),
            other => Err(RiskError::ValidationError {
                message: format!("'{}' is not a yes/no answer", other),
            }),
        }
    }
}

impl TryFrom<String> for Answer {
    type Error = RiskError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Answer> for String {
    fn from(answer: Answer) -> Self {
        answer.to_string()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
        }
    }
}

/// The four risk factors the stroke model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    pub age: u32,
    pub heart_disease: u8,
    pub avg_glucose_level: f64,
    pub hypertension: u8,
}

impl PatientFeatures {
    /// Builds the feature record from form answers. Pure mapping; range
    /// checks happen in [`Validate::validate`].
    pub fn assemble(
        age: u32,
        heart_disease: Answer,
        hypertension: Answer,
        avg_glucose_level: f64,
    ) -> Self {
        Self {
            age,
            heart_disease: heart_disease.as_flag(),
            avg_glucose_level,
            hypertension: hypertension.as_flag(),
        }
    }

    /// Model input in [`FEATURE_NAMES`] order.
    pub fn to_model_input(&self) -> [f64; 4] {
        [
            f64::from(self.age),
            f64::from(self.heart_disease),
            self.avg_glucose_level,
            f64::from(self.hypertension),
        ]
    }
}

impl Validate for PatientFeatures {
    fn validate(&self) -> Result<()> {
        validate_range("age", self.age, AGE_RANGE.0, AGE_RANGE.1)?;
        validate_range("heart_disease", self.heart_disease, 0, 1)?;
        validate_range(
            "avg_glucose_level",
            self.avg_glucose_level,
            GLUCOSE_RANGE.0,
            GLUCOSE_RANGE.1,
        )?;
        validate_range("hypertension", self.hypertension, 0, 1)?;
        Ok(())
    }
}

/// Decision cutoff in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    /// Youden's index optimum reported for the shipped random forest.
    pub const DEFAULT: f64 = 0.49;

    pub fn new(value: f64) -> Result<Self> {
        validate_range("threshold", value, 0.0, 1.0)?;
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = RiskError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> Self {
        threshold.0
    }
}

impl FromStr for Threshold {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim().parse().map_err(|_| RiskError::ValidationError {
            message: format!("threshold '{}' is not a number", s),
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AtRisk,
    NoIndication,
}

impl Verdict {
    pub fn is_positive(self) -> bool {
        matches!(self, Verdict::AtRisk)
    }

    pub fn description(self) -> &'static str {
        match self {
            Verdict::AtRisk => "Based on the model, you are at risk of stroke.",
            Verdict::NoIndication => "Based on the model, you show no indication of stroke.",
        }
    }
}

impl From<bool> for Verdict {
    fn from(positive: bool) -> Self {
        if positive {
            Verdict::AtRisk
        } else {
            Verdict::NoIndication
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::AtRisk => write!(f, "at risk"),
            Verdict::NoIndication => write!(f, "no indication"),
        }
    }
}

/// Outcome of one inference request. Built fresh per request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub verdict: Verdict,
}

/// One row of a batch input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub age: u32,
    pub heart_disease: Answer,
    pub hypertension: Answer,
    pub avg_glucose_level: f64,
}

impl PatientRecord {
    pub fn features(&self) -> PatientFeatures {
        PatientFeatures::assemble(
            self.age,
            self.heart_disease,
            self.hypertension,
            self.avg_glucose_level,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPatient {
    pub id: Option<String>,
    #[serde(flatten)]
    pub features: PatientFeatures,
    pub probability: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub scored: Vec<ScoredPatient>,
    pub skipped: usize,
    pub threshold: Threshold,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
