use crate::domain::model::{BatchResult, PatientFeatures, PatientRecord, Threshold};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn model_path(&self) -> &str;
    fn threshold(&self) -> Threshold;
}

/// A trained binary classifier that can score a patient.
///
/// Implementations are immutable once constructed, so a single instance can
/// serve any number of callers.
pub trait RiskModel: Send + Sync {
    fn name(&self) -> &str;

    /// Probability of the positive (stroke) class, in `[0, 1]`.
    fn predict_probability(&self, features: &PatientFeatures) -> f64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PatientRecord>>;
    async fn transform(&self, data: Vec<PatientRecord>) -> Result<BatchResult>;
    async fn load(&self, result: BatchResult) -> Result<String>;
}
