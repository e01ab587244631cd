#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::ports::{ConfigProvider, NarrativeMode};
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{validate_path, Validate};
use std::path::{Path, PathBuf};
use toml_config::DashboardToml;

pub const DEFAULT_DATASET_PATH: &str = "data/Bank Customer Churn Prediction.csv";
pub const DEFAULT_CONTACT_LOG_PATH: &str = "data/user_info.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "plots";

/// 命令列上明確指定的值，優先於 TOML 設定
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub dataset: Option<String>,
    pub contact_log: Option<String>,
    pub output_dir: Option<String>,
    pub narrative: Option<String>,
    pub monitor: bool,
}

/// 合併後的執行設定：命令列 > TOML > 預設值
#[derive(Debug, Clone)]
pub struct Settings {
    dataset_path: PathBuf,
    contact_log_path: PathBuf,
    output_dir: PathBuf,
    narrative: NarrativeMode,
    monitor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            contact_log_path: PathBuf::from(DEFAULT_CONTACT_LOG_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            narrative: NarrativeMode::default(),
            monitor: false,
        }
    }
}

impl Settings {
    pub fn resolve(overrides: &SettingsOverrides, file: Option<&DashboardToml>) -> Result<Self> {
        if let Some(file) = file {
            file.validate()?;
        }

        let pick = |cli: &Option<String>, from_file: Option<&str>, default: &str| {
            cli.clone()
                .or_else(|| from_file.map(str::to_string))
                .unwrap_or_else(|| default.to_string())
        };

        let narrative_name = pick(
            &overrides.narrative,
            file.and_then(|f| f.narrative()),
            "live",
        );
        let narrative = NarrativeMode::parse(&narrative_name).ok_or_else(|| {
            DashboardError::InvalidConfigValueError {
                field: "narrative".to_string(),
                value: narrative_name.clone(),
                reason: format!("Allowed values: {}", NarrativeMode::NAMES.join(", ")),
            }
        })?;

        let settings = Self {
            dataset_path: pick(
                &overrides.dataset,
                file.and_then(|f| f.dataset_path()),
                DEFAULT_DATASET_PATH,
            )
            .into(),
            contact_log_path: pick(
                &overrides.contact_log,
                file.and_then(|f| f.contact_log_path()),
                DEFAULT_CONTACT_LOG_PATH,
            )
            .into(),
            output_dir: pick(
                &overrides.output_dir,
                file.and_then(|f| f.output_dir()),
                DEFAULT_OUTPUT_DIR,
            )
            .into(),
            narrative,
            monitor: overrides.monitor || file.map(|f| f.monitoring_enabled()).unwrap_or(false),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = path.into();
        self
    }

    pub fn with_contact_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.contact_log_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_narrative(mut self, narrative: NarrativeMode) -> Self {
        self.narrative = narrative;
        self
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

impl ConfigProvider for Settings {
    fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    fn contact_log_path(&self) -> &Path {
        &self.contact_log_path
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn narrative_mode(&self) -> NarrativeMode {
        self.narrative
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("dataset", &self.dataset_path.to_string_lossy())?;
        validate_path("contact_log", &self.contact_log_path.to_string_lossy())?;
        validate_path("output_dir", &self.output_dir.to_string_lossy())?;
        Ok(())
    }
}
