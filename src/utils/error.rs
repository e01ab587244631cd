use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Contact form has not been submitted")]
    FormNotSubmitted,

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Dataset file not found: {path}")]
    DatasetNotFoundError { path: String },

    #[error("Dataset is missing required column '{column}'")]
    MissingFieldError { column: String },

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValueError {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Cannot compute {aggregation} over an empty dataset")]
    EmptyDatasetError { aggregation: String },

    #[error("Failed to render chart '{chart}': {message}")]
    RenderError { chart: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Gating,
    Configuration,
    Dataset,
    Aggregation,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度對應的行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl DashboardError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DashboardError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn empty_dataset(aggregation: &str) -> Self {
        DashboardError::EmptyDatasetError {
            aggregation: aggregation.to_string(),
        }
    }

    pub fn render(chart: &str, err: impl std::fmt::Display) -> Self {
        DashboardError::RenderError {
            chart: chart.to_string(),
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::FormNotSubmitted | DashboardError::ValidationError { .. } => {
                ErrorCategory::Gating
            }
            DashboardError::ConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::TomlError(_) => ErrorCategory::Configuration,
            DashboardError::DatasetNotFoundError { .. } | DashboardError::CsvError(_) => {
                ErrorCategory::Dataset
            }
            DashboardError::MissingFieldError { .. }
            | DashboardError::InvalidValueError { .. }
            | DashboardError::EmptyDatasetError { .. } => ErrorCategory::Aggregation,
            DashboardError::RenderError { .. } => ErrorCategory::Rendering,
            DashboardError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 表單尚未送出只是提示，不算失敗
            DashboardError::FormNotSubmitted => ErrorSeverity::Low,
            DashboardError::ValidationError { .. } => ErrorSeverity::Medium,
            DashboardError::ConfigError { .. }
            | DashboardError::InvalidConfigValueError { .. }
            | DashboardError::TomlError(_)
            | DashboardError::DatasetNotFoundError { .. }
            | DashboardError::CsvError(_)
            | DashboardError::MissingFieldError { .. }
            | DashboardError::InvalidValueError { .. }
            | DashboardError::EmptyDatasetError { .. }
            | DashboardError::RenderError { .. } => ErrorSeverity::High,
            DashboardError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DashboardError::FormNotSubmitted => {
                "ℹ️ Please fill out the form and press Submit.".to_string()
            }
            DashboardError::ValidationError { field, .. } if field == "email" => {
                "Invalid Email Format. Please enter a valid email like `example@domain.com`."
                    .to_string()
            }
            DashboardError::ValidationError { .. } => {
                "Both Name and Email are required to proceed.".to_string()
            }
            DashboardError::DatasetNotFoundError { path } => format!(
                "Dataset file not found. Please ensure '{}' exists.",
                path
            ),
            DashboardError::MissingFieldError { column } => {
                format!("The dataset has no '{}' column.", column)
            }
            DashboardError::EmptyDatasetError { .. } => {
                "The dataset contains no rows, nothing to analyse.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Gating => "Resubmit the form with --name and --email (or --prompt)",
            ErrorCategory::Configuration => "Check the TOML file and command-line flags",
            ErrorCategory::Dataset => {
                "Place the dataset CSV at the configured path or pass --dataset"
            }
            ErrorCategory::Aggregation => {
                "Verify the dataset has the country, age, active_member, estimated_salary and churn columns"
            }
            ErrorCategory::Rendering => "Check that the output directory is writable",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
