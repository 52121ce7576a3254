use std::path::PathBuf;
use thiserror::Error;

/// 模型檔載入失敗的原因
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("model artifact not found or unreadable at {path}: {source}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact at {path} is incompatible: {reason}")]
    Incompatible { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Failed to load model: {0}")]
    LoadError(#[from] LoadError),

    #[error("Model is unavailable, inference refused: {reason}")]
    ModelUnavailable { reason: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Model,
    Input,
    Configuration,
    Storage,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RiskError::LoadError(_) | RiskError::ModelUnavailable { .. } => ErrorCategory::Model,
            RiskError::ValidationError { .. } => ErrorCategory::Input,
            RiskError::ConfigValidationError { .. }
            | RiskError::InvalidConfigValueError { .. }
            | RiskError::MissingConfigError { .. } => ErrorCategory::Configuration,
            RiskError::ZipError(_) | RiskError::IoError(_) => ErrorCategory::Storage,
            RiskError::CsvError(_)
            | RiskError::SerializationError(_)
            | RiskError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Model => ErrorSeverity::Critical,
            ErrorCategory::Storage => ErrorSeverity::Critical,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
        }
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RiskError::LoadError(LoadError::Missing { .. }) => {
                "Check that the model file exists at the configured --model-path"
            }
            RiskError::LoadError(LoadError::Corrupt { .. }) => {
                "Re-export the trained model; the artifact must be valid JSON"
            }
            RiskError::LoadError(LoadError::Incompatible { .. }) => {
                "Export the model with features ordered as age, heart_disease, avg_glucose_level, hypertension"
            }
            RiskError::ModelUnavailable { .. } => {
                "Fix the model loading error reported at startup and run again"
            }
            RiskError::ValidationError { .. } => {
                "Check the patient inputs against their allowed ranges"
            }
            RiskError::ConfigValidationError { .. }
            | RiskError::InvalidConfigValueError { .. }
            | RiskError::MissingConfigError { .. } => {
                "Review the configuration file or command line flags"
            }
            RiskError::CsvError(_) => {
                "Make sure the input CSV has the columns age, heart_disease, hypertension, avg_glucose_level"
            }
            RiskError::ZipError(_) | RiskError::IoError(_) => {
                "Check file permissions and available disk space"
            }
            RiskError::SerializationError(_) | RiskError::ProcessingError { .. } => {
                "Run again with --verbose for more details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RiskError::LoadError(e) => format!("Failed to load model: {}", e),
            RiskError::ModelUnavailable { .. } => {
                "The risk model is not loaded, so no prediction can be made".to_string()
            }
            RiskError::ValidationError { message } => format!("Invalid input: {}", message),
            RiskError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid {}: {}", value, field, reason),
            RiskError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;
