use crate::adapters::http::DEFAULT_API_ENDPOINT;
use crate::core::ConfigProvider;
use crate::domain::model::{ReportKind, DEFAULT_STATIONS};
use crate::utils::error::{FixtureError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// 測站 -> 原始 TAF 字串，用來取代即時抓取
    #[serde(default)]
    pub taf_reports: HashMap<String, String>,
    #[serde(default)]
    pub error_handling: ErrorHandlingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ReportKind>,
    #[serde(default = "default_stations")]
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    #[serde(default)]
    pub keep_going: bool,
}

/// 命令列明確指定的值，套用在 TOML 配置之上
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub api_endpoint: Option<String>,
    pub api_token: Option<String>,
    pub output_path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub kinds: Option<Vec<ReportKind>>,
    pub stations: Option<Vec<String>>,
    pub keep_going: bool,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_kinds() -> Vec<ReportKind> {
    ReportKind::ALL.to_vec()
}

fn default_stations() -> Vec<String> {
    DEFAULT_STATIONS.iter().map(|s| s.to_string()).collect()
}

fn default_output_path() -> String {
    ".".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: None,
            timeout_seconds: None,
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
            stations: default_stations(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FixtureError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FixtureError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${AVWX_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FixtureError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 命令列明確指定的選項優先於檔案
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(endpoint) = &overrides.api_endpoint {
            self.source.endpoint = endpoint.clone();
            tracing::info!("🔧 API endpoint overridden to: {}", endpoint);
        }
        if let Some(token) = &overrides.api_token {
            self.source.token = Some(token.clone());
            tracing::info!("🔧 API token overridden from command line");
        }
        if let Some(timeout) = overrides.timeout_seconds {
            self.source.timeout_seconds = Some(timeout);
            tracing::info!("🔧 Timeout overridden to: {}s", timeout);
        }
        if let Some(path) = &overrides.output_path {
            self.output.path = path.clone();
            tracing::info!("🔧 Output path overridden to: {}", path);
        }
        if let Some(kinds) = &overrides.kinds {
            self.matrix.kinds = kinds.clone();
            tracing::info!("🔧 Report kinds overridden to: {:?}", kinds);
        }
        if let Some(stations) = &overrides.stations {
            self.matrix.stations = stations.clone();
            tracing::info!("🔧 Stations overridden to: {}", stations.join(","));
        }
        if overrides.keep_going {
            self.error_handling.keep_going = true;
            tracing::info!("🔧 Keep-going enabled from command line");
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;

        if let Some(token) = &self.source.token {
            if token.contains("${") {
                return Err(FixtureError::ConfigValidationError {
                    field: "source.token".to_string(),
                    message: format!("unresolved environment variable in {}", token),
                });
            }
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_list("matrix.kinds", &self.matrix.kinds)?;
        validation::validate_stations("matrix.stations", &self.matrix.stations)?;

        for (station, report) in &self.taf_reports {
            validation::validate_non_empty_string(&format!("taf_reports.{}", station), report)?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn api_token(&self) -> Option<&str> {
        self.source.token.as_deref().filter(|t| !t.is_empty())
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds.unwrap_or(30)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn report_kinds(&self) -> &[ReportKind] {
        &self.matrix.kinds
    }

    fn stations(&self) -> &[String] {
        &self.matrix.stations
    }

    fn taf_report(&self, station: &str) -> Option<&str> {
        self.taf_reports.get(station).map(String::as_str)
    }

    fn keep_going(&self) -> bool {
        self.error_handling.keep_going
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
