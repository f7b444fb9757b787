use crate::domain::model::ReportKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to fetch {kind} for {station}: {message}")]
    FetchError {
        kind: ReportKind,
        station: String,
        message: String,
    },

    #[error("Failed to parse {kind} for {station}: {message}")]
    ParseError {
        kind: ReportKind,
        station: String,
        message: String,
    },

    #[error("Failed to write fixture {path}: {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, FixtureError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FixtureError {
    pub fn fetch(kind: ReportKind, station: &str, message: impl Into<String>) -> Self {
        FixtureError::FetchError {
            kind,
            station: station.to_string(),
            message: message.into(),
        }
    }

    pub fn parse(kind: ReportKind, station: &str, message: impl Into<String>) -> Self {
        FixtureError::ParseError {
            kind,
            station: station.to_string(),
            message: message.into(),
        }
    }

    /// 失敗的 (kind, station)，用於重跑單一組合
    pub fn pair(&self) -> Option<(ReportKind, &str)> {
        match self {
            FixtureError::FetchError { kind, station, .. }
            | FixtureError::ParseError { kind, station, .. } => Some((*kind, station.as_str())),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FixtureError::FetchError { .. } | FixtureError::ApiError(_) => ErrorCategory::Upstream,
            FixtureError::ParseError { .. } | FixtureError::SerializationError(_) => {
                ErrorCategory::Data
            }
            FixtureError::WriteError { .. } | FixtureError::IoError(_) => ErrorCategory::Storage,
            FixtureError::ConfigError { .. }
            | FixtureError::InvalidConfigValueError { .. }
            | FixtureError::MissingConfigError { .. }
            | FixtureError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    /// 行程退出碼：上游 2、資料與配置 1、儲存 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FixtureError::FetchError { kind, station, .. } => format!(
                "Check network access and the API token, then re-run with --kinds {} --stations {}",
                kind, station
            ),
            FixtureError::ParseError { kind, station, .. } => format!(
                "The upstream {} report for {} has an unexpected shape; re-run with --kinds {} --stations {} --verbose",
                kind, station, kind, station
            ),
            FixtureError::WriteError { path, .. } => {
                format!("Make sure the directory for {} is writable", path)
            }
            FixtureError::ApiError(_) => "Check the API endpoint and network access".to_string(),
            FixtureError::IoError(_) => "Check file permissions and free disk space".to_string(),
            FixtureError::SerializationError(_) => {
                "The report contains data that cannot be written as JSON".to_string()
            }
            FixtureError::ConfigError { .. }
            | FixtureError::InvalidConfigValueError { .. }
            | FixtureError::MissingConfigError { .. }
            | FixtureError::ConfigValidationError { .. } => {
                "Fix the configuration value and run again (see --help)".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Upstream => format!("Could not retrieve weather data: {}", self),
            ErrorCategory::Data => format!("Could not build fixture: {}", self),
            ErrorCategory::Storage => format!("Could not save fixture: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}
