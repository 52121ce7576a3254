use crate::core::loader::DEFAULT_MODEL_PATH;
use crate::core::ConfigProvider;
use crate::domain::model::Threshold;
use crate::utils::error::{Result, RiskError};
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_path, validate_required_field,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const OUTPUT_FORMATS: [&str; 2] = ["csv", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub batch: BatchInfo,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub error_handling: Option<ErrorHandlingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MODEL_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub threshold: Option<Threshold>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRowPolicy {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_invalid_row: Option<InvalidRowPolicy>,
}

impl BatchConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RiskError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RiskError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RiskError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn output_path(&self) -> &str {
        &self.output.path
    }

    pub fn delimiter(&self) -> u8 {
        self.input
            .delimiter
            .as_deref()
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',')
    }

    pub fn writes_format(&self, format: &str) -> bool {
        self.output.formats.iter().any(|f| f == format)
    }

    /// 壓縮輸出的檔名；未啟用時為 None
    pub fn archive_name(&self) -> Option<&str> {
        self.output
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| c.filename.as_deref())
    }

    pub fn invalid_row_policy(&self) -> InvalidRowPolicy {
        self.error_handling
            .as_ref()
            .and_then(|eh| eh.on_invalid_row)
            .unwrap_or_default()
    }
}

impl ConfigProvider for BatchConfig {
    fn model_path(&self) -> &str {
        &self.model.path
    }

    fn threshold(&self) -> Threshold {
        self.decision.threshold.unwrap_or_default()
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("batch.name", &self.batch.name)?;
        validate_path("model.path", &self.model.path)?;
        validate_path("input.path", &self.input.path)?;
        validate_file_extension("input.path", &self.input.path, &["csv", "tsv"])?;
        validate_path("output.path", &self.output.path)?;

        if let Some(delimiter) = &self.input.delimiter {
            if delimiter.len() != 1 || !delimiter.is_ascii() {
                return Err(RiskError::InvalidConfigValueError {
                    field: "input.delimiter".to_string(),
                    value: delimiter.clone(),
                    reason: "Delimiter must be a single ASCII character".to_string(),
                });
            }
        }

        if self.output.formats.is_empty() {
            return Err(RiskError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }

        for format in &self.output.formats {
            if !OUTPUT_FORMATS.contains(&format.as_str()) {
                return Err(RiskError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        OUTPUT_FORMATS.join(", ")
                    ),
                });
            }
        }

        if let Some(compression) = self.output.compression.as_ref().filter(|c| c.enabled) {
            let filename = validate_required_field("output.compression.filename", &compression.filename)?;
            validate_file_extension("output.compression.filename", filename, &["zip"])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[batch]
name = "clinic-screening"

[model]
path = "models/forest.json"

[decision]
threshold = 0.3

[input]
path = "patients.csv"

[output]
path = "./output"
formats = ["csv", "json"]
"#;

    #[test]
    fn test_parse_basic_batch_config() {
        let config = BatchConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.batch.name, "clinic-screening");
        assert_eq!(config.model_path(), "models/forest.json");
        assert_eq!(config.threshold().value(), 0.3);
        assert_eq!(config.delimiter(), b',');
        assert!(config.writes_format("json"));
        assert_eq!(config.archive_name(), None);
        assert_eq!(config.invalid_row_policy(), InvalidRowPolicy::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_model_and_threshold() {
        let config = BatchConfig::from_toml_str(
            r#"
[batch]
name = "defaults"

[input]
path = "patients.csv"

[output]
path = "./output"
formats = ["csv"]
"#,
        )
        .unwrap();

        assert_eq!(config.model_path(), DEFAULT_MODEL_PATH);
        assert_eq!(config.threshold(), Threshold::default());
    }

    #[test]
    fn test_threshold_out_of_range_fails_to_parse() {
        let content = BASIC.replace("threshold = 0.3", "threshold = 1.3");
        assert!(BatchConfig::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STROKE_RISK_TEST_MODEL_DIR", "/opt/models");

        let content = BASIC.replace(
            "models/forest.json",
            "${STROKE_RISK_TEST_MODEL_DIR}/forest.json",
        );
        let config = BatchConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.model_path(), "/opt/models/forest.json");

        std::env::remove_var("STROKE_RISK_TEST_MODEL_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = BASIC.replace(r#"["csv", "json"]"#, r#"["xlsx"]"#);
        let config = BatchConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_input = BASIC.replace("patients.csv", "patients.xlsx");
        let config = BatchConfig::from_toml_str(&bad_input).unwrap();
        assert!(config.validate().is_err());

        let missing_archive_name = format!("{}\n[output.compression]\nenabled = true\n", BASIC);
        let config = BatchConfig::from_toml_str(&missing_archive_name).unwrap();
        assert!(matches!(
            config.validate(),
            Err(RiskError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                format!(
                    "{}\n[output.compression]\nenabled = true\nfilename = \"run.zip\"\n\n[error_handling]\non_invalid_row = \"abort\"\n",
                    BASIC
                )
                .as_bytes(),
            )
            .unwrap();

        let config = BatchConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.archive_name(), Some("run.zip"));
        assert_eq!(config.invalid_row_policy(), InvalidRowPolicy::Abort);
        assert!(config.validate().is_ok());
    }
}
