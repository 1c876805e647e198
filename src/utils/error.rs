use crate::domain::model::ImportResult;
use thiserror::Error;

/// 單筆記錄解碼失敗。可恢復：計入失敗數後繼續下一行。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("record too short: {length} characters, at least {minimum} required")]
    TooShort { length: usize, minimum: usize },

    #[error("unknown transaction type code '{code}'")]
    UnknownType { code: String },

    #[error("malformed {field} field: '{value}'")]
    MalformedField { field: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("transaction type {code} not found in catalog")]
    NotFound { code: u8 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    #[error("tax id should not be empty")]
    Blank,
}

/// Failure reported by a bulk-write collaborator. Never retried by the pipeline.
#[derive(Error, Debug)]
#[error("bulk write failed: {message}")]
pub struct WriteError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error(transparent)]
    WriteError(#[from] WriteError),

    #[error("Input stream unreadable at line {line}: {source}")]
    StreamError {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Import cancelled at a batch boundary")]
    Cancelled,

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl From<TaxIdError> for ImportError {
    fn from(error: TaxIdError) -> Self {
        ImportError::InvalidArgument {
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Persistence,
    Configuration,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 輸入資料錯誤
            ErrorSeverity::High => 1,     // 設定錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::IoError(_) => ErrorCategory::Io,
            ImportError::StreamError { .. }
            | ImportError::CsvError(_)
            | ImportError::SerializationError(_)
            | ImportError::InvalidArgument { .. } => ErrorCategory::Input,
            ImportError::DatabaseError(_) | ImportError::WriteError(_) => {
                ErrorCategory::Persistence
            }
            ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ImportError::Cancelled => ErrorCategory::Interrupted,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Interrupted => ErrorSeverity::Low,
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Io | ErrorCategory::Persistence => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "檢查輸入檔案是否存在且具有讀取權限",
            ErrorCategory::Input => "檢查輸入檔案的編碼 (UTF-8) 與完整性後重新匯入",
            ErrorCategory::Persistence => {
                "檢查資料庫路徑與磁碟空間；已完成的批次已寫入，可只重新匯入剩餘部分"
            }
            ErrorCategory::Configuration => "檢查設定檔或命令列參數",
            ErrorCategory::Interrupted => "重新執行匯入即可；已完成的批次已寫入",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("無法讀取檔案: {}", self),
            ErrorCategory::Input => format!("輸入資料無法處理: {}", self),
            ErrorCategory::Persistence => format!("寫入資料庫失敗: {}", self),
            ErrorCategory::Configuration => format!("設定錯誤: {}", self),
            ErrorCategory::Interrupted => "匯入已被中斷".to_string(),
        }
    }
}

/// A run that stopped on a fatal error.
///
/// `partial` carries exact counts for every line handled before the abort;
/// `persisted` counts only the records that completed flushes wrote.
#[derive(Error, Debug)]
#[error("import aborted after {} lines ({persisted} records persisted): {error}", partial.total_lines)]
pub struct ImportAborted {
    pub partial: ImportResult,
    pub persisted: u64,
    #[source]
    pub error: ImportError,
}

impl From<ImportAborted> for ImportError {
    fn from(aborted: ImportAborted) -> Self {
        aborted.error
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_errors_are_critical() {
        let error = ImportError::from(WriteError::new("connection reset"));
        assert_eq!(error.category(), ErrorCategory::Persistence);
        assert_eq!(error.severity(), ErrorSeverity::Critical);
        assert!(error.to_string().contains("connection reset"));
    }

    #[test]
    fn test_cancellation_is_low_severity() {
        assert_eq!(ImportError::Cancelled.severity(), ErrorSeverity::Low);
        assert_eq!(ImportError::Cancelled.severity().exit_code(), 0);
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let config = ImportError::MissingConfigError {
            field: "source.path".to_string(),
        };
        assert_eq!(config.severity().exit_code(), 1);
        assert_eq!(ErrorSeverity::Medium.exit_code(), 2);
        assert_eq!(ErrorSeverity::Critical.exit_code(), 3);
    }

    #[test]
    fn test_blank_tax_id_maps_to_invalid_argument() {
        let error = ImportError::from(TaxIdError::Blank);
        assert!(matches!(error, ImportError::InvalidArgument { .. }));
    }

    #[test]
    fn test_aborted_message_reports_progress() {
        let aborted = ImportAborted {
            partial: ImportResult {
                total_lines: 12,
                success_count: 10,
                failed_count: 2,
                summary: None,
            },
            persisted: 8,
            error: ImportError::Cancelled,
        };
        let message = aborted.to_string();
        assert!(message.contains("12 lines"));
        assert!(message.contains("8 records persisted"));
    }
}
