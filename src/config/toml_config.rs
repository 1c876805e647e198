use crate::core::batch::DEFAULT_BATCH_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_DATABASE_PATH: &str = "transactions.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub import: ImportSection,
    pub source: SourceSection,
    pub database: Option<DatabaseSection>,
    pub output: Option<OutputSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    pub name: String,
    pub batch_size: Option<usize>,
    pub summary: Option<bool>,
    pub validate_tax_id: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// 可由命令列 `--input` 覆蓋
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub failed_records: Option<String>,
    pub summary_csv: Option<String>,
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let source = validation::validate_required_field("source.path", &self.source.path)?;
        validation::validate_path("source.path", source)?;
        validation::validate_path("database.path", self.database_path())?;
        validation::validate_batch_size("import.batch_size", self.batch_size())?;

        if let Some(output) = &self.output {
            validation::validate_optional_path(
                "output.failed_records",
                output.failed_records.as_deref(),
            )?;
            validation::validate_optional_path("output.summary_csv", output.summary_csv.as_deref())?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_log_level("monitoring.log_level", level)?;
        }

        Ok(())
    }

    pub fn summary_csv_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.summary_csv.as_deref())
    }

    pub fn json_output(&self) -> bool {
        self.output.as_ref().and_then(|o| o.json).unwrap_or(false)
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn source_path(&self) -> &str {
        self.source.path.as_deref().unwrap_or_default()
    }

    fn database_path(&self) -> &str {
        self.database
            .as_ref()
            .map(|d| d.path.as_str())
            .unwrap_or(DEFAULT_DATABASE_PATH)
    }

    fn batch_size(&self) -> usize {
        self.import.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    fn summary_enabled(&self) -> bool {
        self.import.summary.unwrap_or(false) || self.summary_csv_path().is_some()
    }

    fn validate_tax_id(&self) -> bool {
        self.import.validate_tax_id.unwrap_or(false)
    }

    fn failed_records_path(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.failed_records.as_deref())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
