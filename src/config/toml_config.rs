use crate::config::default_workers;
use crate::core::discovery::strip_quotes;
use crate::core::ConfigProvider;
use crate::domain::model::{
    CompressionSettings, OutputFormat, Quality, DEFAULT_AVIF_SPEED, DEFAULT_POSTFIX,
    DEFAULT_QUALITY,
};
use crate::utils::error::{CompressError, Result};
use crate::utils::validation::{
    validate_path, validate_paths, validate_positive_number, validate_postfix, validate_range,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub compression: CompressionConfig,
    pub files: FilesConfig,
    pub performance: Option<PerformanceConfig>,
    pub monitoring: Option<MonitoringConfig>,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub format: String,
    pub quality: Option<u8>,
    pub avif_speed: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    pub inputs: Vec<String>,
    pub delete_original: Option<bool>,
    pub postfix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub path: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CompressError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CompressError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PHOTO_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CompressError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn quality(&self) -> u8 {
        self.compression.quality.unwrap_or(DEFAULT_QUALITY)
    }

    pub fn avif_speed(&self) -> u8 {
        self.compression.avif_speed.unwrap_or(DEFAULT_AVIF_SPEED)
    }

    pub fn postfix(&self) -> &str {
        self.files.postfix.as_deref().unwrap_or(DEFAULT_POSTFIX)
    }

    pub fn workers(&self) -> usize {
        self.performance
            .as_ref()
            .and_then(|p| p.workers)
            .unwrap_or_else(default_workers)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_paths("files.inputs", &self.files.inputs)?;
        OutputFormat::parse(&self.compression.format)?;
        validate_range("compression.quality", self.quality(), 0, Quality::MAX)?;
        validate_range("compression.avif_speed", self.avif_speed(), 1, 10)?;
        validate_positive_number("performance.workers", self.workers(), 1)?;
        validate_postfix("files.postfix", self.postfix())?;
        if let Some(report) = &self.report {
            validate_path("report.path", &report.path)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn inputs(&self) -> Vec<PathBuf> {
        self.files.inputs.iter().map(|raw| strip_quotes(raw)).collect()
    }

    fn settings(&self) -> Result<CompressionSettings> {
        let settings = CompressionSettings::new(
            OutputFormat::parse(&self.compression.format)?,
            Quality::new(self.quality())?,
        )
        .with_delete_original(self.files.delete_original.unwrap_or(false))
        .with_avif_speed(self.avif_speed())
        .with_postfix(self.postfix());
        Ok(settings)
    }

    fn workers(&self) -> usize {
        TomlConfig::workers(self)
    }

    fn monitor_enabled(&self) -> bool {
        self.monitoring_enabled()
    }

    fn report_path(&self) -> Option<PathBuf> {
        self.report.as_ref().map(|r| strip_quotes(&r.path))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
