pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::loader::DEFAULT_MODEL_PATH;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{Answer, PatientFeatures, Threshold};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "stroke-risk")]
#[command(about = "Estimate stroke risk from four patient risk factors")]
pub struct CliConfig {
    /// Path to the trained model artifact
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model_path: String,

    /// Age in years (1-120)
    #[arg(long)]
    pub age: u32,

    /// Heart disease history (ya/tidak, yes/no)
    #[arg(long)]
    pub heart_disease: Answer,

    /// Hypertension (ya/tidak, yes/no)
    #[arg(long)]
    pub hypertension: Answer,

    /// Average glucose level in mg/dL (50-300)
    #[arg(long)]
    pub avg_glucose_level: f64,

    /// Decision threshold; lower is more sensitive, higher is more specific
    #[arg(long, default_value_t = Threshold::default())]
    pub threshold: Threshold,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn features(&self) -> PatientFeatures {
        PatientFeatures::assemble(
            self.age,
            self.heart_disease,
            self.hypertension,
            self.avg_glucose_level,
        )
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn model_path(&self) -> &str {
        &self.model_path
    }

    fn threshold(&self) -> Threshold {
        self.threshold
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("model_path", &self.model_path)?;
        self.features().validate()
    }
}
