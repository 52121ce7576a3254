//! Loading of the serialized stroke classifier.
//!
//! The artifact is a JSON document exported from the training notebook. It
//! names the features it was fitted on, and the loader refuses any artifact
//! whose feature list differs from [`FEATURE_NAMES`] in names or order, since
//! a silent reorder would produce wrong probabilities instead of an error.

use crate::domain::model::{PatientFeatures, AGE_RANGE, FEATURE_NAMES, GLUCOSE_RANGE};
use crate::domain::ports::RiskModel;
use crate::utils::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "model_best_randomforest_stroke.json";
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Largest absolute value each feature takes inside its domain, in model order.
const FEATURE_MAX_MAGNITUDE: [f64; 4] = [
    AGE_RANGE.1 as f64,
    1.0,
    GLUCOSE_RANGE.1,
    1.0,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub format_version: u32,
    pub model_name: String,
    pub feature_names: Vec<String>,
    pub classifier: Classifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest { trees: Vec<DecisionTree> },
    LogisticRegression { coefficients: Vec<f64>, intercept: f64 },
}

/// Flat node array; node 0 is the root and children always come after
/// their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights `[negative, positive]` of the training samples in the leaf.
    Leaf { value: [f64; 2] },
}

impl DecisionTree {
    fn check(&self, tree_index: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree_index));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_NAMES.len() {
                        return Err(format!(
                            "tree {} node {} splits on feature {} but the model has {} features",
                            tree_index,
                            i,
                            feature,
                            FEATURE_NAMES.len()
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("tree {} node {} has a non-finite threshold", tree_index, i));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!(
                                "tree {} node {} points to invalid child {}",
                                tree_index, i, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total = value[0] + value[1];
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0)
                        || !total.is_finite()
                        || total <= 0.0
                    {
                        return Err(format!(
                            "tree {} leaf {} has invalid class weights {:?}",
                            tree_index, i, value
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Positive class fraction of the leaf reached by `x`.
    fn leaf_probability(&self, x: &[f64; 4]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { value } => return value[1] / (value[0] + value[1]),
            }
        }
    }
}

impl Classifier {
    fn check(&self) -> std::result::Result<(), String> {
        match self {
            Classifier::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err("random forest has no trees".to_string());
                }
                trees
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, tree)| tree.check(i))
            }
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != FEATURE_NAMES.len() {
                    return Err(format!(
                        "expected {} coefficients, got {}",
                        FEATURE_NAMES.len(),
                        coefficients.len()
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("logistic regression has non-finite parameters".to_string());
                }
                // 輸入在合法範圍內時，線性分數必須是有限值
                let bound = coefficients
                    .iter()
                    .zip(FEATURE_MAX_MAGNITUDE.iter())
                    .map(|(c, m)| c.abs() * m)
                    .sum::<f64>()
                    + intercept.abs();
                if !bound.is_finite() {
                    return Err(
                        "logistic regression coefficients overflow for in-range features".to_string(),
                    );
                }
                Ok(())
            }
        }
    }

    fn probability(&self, x: &[f64; 4]) -> f64 {
        let p = match self {
            // soft voting, same as predict_proba of a fitted forest
            Classifier::RandomForest { trees } => {
                trees.iter().map(|t| t.leaf_probability(x)).sum::<f64>() / trees.len() as f64
            }
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                let z = coefficients
                    .iter()
                    .zip(x.iter())
                    .map(|(w, v)| w * v)
                    .sum::<f64>()
                    + intercept;
                1.0 / (1.0 + (-z).exp())
            }
        };
        // NaN only comes from non-finite input; score it as at risk
        if p.is_nan() {
            1.0
        } else {
            p.clamp(0.0, 1.0)
        }
    }
}

/// A validated, immutable classifier ready for inference.
#[derive(Debug, Clone)]
pub struct RiskArtifact {
    model_name: String,
    classifier: Classifier,
}

impl RiskArtifact {
    /// 從檔案載入模型，只在啟動時呼叫一次
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        tracing::debug!("Reading model artifact from {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| LoadError::Missing {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_slice(&bytes, path)
    }

    /// Parses and validates artifact bytes. `origin` is only used in errors.
    pub fn from_slice(bytes: &[u8], origin: &Path) -> std::result::Result<Self, LoadError> {
        let file: ArtifactFile =
            serde_json::from_slice(bytes).map_err(|source| LoadError::Corrupt {
                path: origin.to_path_buf(),
                source,
            })?;

        Self::from_artifact_file(file, origin)
    }

    pub fn from_artifact_file(
        file: ArtifactFile,
        origin: &Path,
    ) -> std::result::Result<Self, LoadError> {
        let incompatible = |reason: String| LoadError::Incompatible {
            path: PathBuf::from(origin),
            reason,
        };

        if file.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(incompatible(format!(
                "unsupported format_version {} (expected {})",
                file.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        if file.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(incompatible(format!(
                "model expects features {:?}, but this tool provides {:?}",
                file.feature_names, FEATURE_NAMES
            )));
        }

        file.classifier.check().map_err(incompatible)?;

        Ok(Self {
            model_name: file.model_name,
            classifier: file.classifier,
        })
    }
}

impl RiskModel for RiskArtifact {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn predict_probability(&self, features: &PatientFeatures) -> f64 {
        self.classifier.probability(&features.to_model_input())
    }
}
