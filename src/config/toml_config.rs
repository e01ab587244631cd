use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{validate_one_of, validate_path, Validate};
use crate::domain::ports::NarrativeMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 選用的 TOML 設定檔，所有欄位皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardToml {
    pub dataset: Option<DatasetConfig>,
    pub contact: Option<ContactConfig>,
    pub report: Option<ReportConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactConfig {
    pub log_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_dir: Option<String>,
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl DashboardToml {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| DashboardError::ConfigError {
            message: format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn dataset_path(&self) -> Option<&str> {
        self.dataset.as_ref()?.path.as_deref()
    }

    pub fn contact_log_path(&self) -> Option<&str> {
        self.contact.as_ref()?.log_path.as_deref()
    }

    pub fn output_dir(&self) -> Option<&str> {
        self.report.as_ref()?.output_dir.as_deref()
    }

    pub fn narrative(&self) -> Option<&str> {
        self.report.as_ref()?.narrative.as_deref()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for DashboardToml {
    fn validate(&self) -> Result<()> {
        if let Some(path) = self.dataset_path() {
            validate_path("dataset.path", path)?;
        }
        if let Some(path) = self.contact_log_path() {
            validate_path("contact.log_path", path)?;
        }
        if let Some(dir) = self.output_dir() {
            validate_path("report.output_dir", dir)?;
        }
        if let Some(narrative) = self.narrative() {
            validate_one_of("report.narrative", narrative, &NarrativeMode::NAMES)?;
        }
        Ok(())
    }
}
