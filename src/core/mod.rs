pub mod assessor;
pub mod batch;
pub mod decision;
pub mod loader;

pub use crate::domain::model::{BatchResult, PatientFeatures, PatientRecord, PredictionResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RiskModel, Storage};
pub use crate::utils::error::Result;
