pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::BatchConfig, OutputFormat};

pub use app::pipelines::batch_pipeline::BatchPipeline;
pub use app::report::RiskReport;
pub use crate::core::{
    assessor::RiskAssessor,
    batch::BatchEngine,
    decision::decide,
    loader::{RiskArtifact, DEFAULT_MODEL_PATH},
};
pub use domain::model::{Answer, PatientFeatures, PredictionResult, Threshold, Verdict};
pub use utils::error::{LoadError, Result, RiskError};
