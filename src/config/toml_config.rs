use crate::adapters::http::DEFAULT_SINK_TIMEOUT;
use crate::core::cooldown::DEFAULT_COOLDOWN;
use crate::domain::model::ConfirmationMode;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TransferError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub sink: SinkConfig,
    pub scanner: ScannerConfig,
    pub workflow: WorkflowConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
    pub require_success_status: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: DEFAULT_SINK_TIMEOUT.as_secs(),
            headers: HashMap::new(),
            require_success_status: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub cooldown_seconds: f64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: DEFAULT_COOLDOWN.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub confirmation: ConfirmationMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub document_path: String,
    pub auto_export: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            document_path: "./receipts".to_string(),
            auto_export: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_format: LogFormat,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TransferError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TransferError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHEETS_WEBHOOK_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TransferError::ConfigValidationError {
            field: "toml_parsing".to_string(),
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
        match self.sink.endpoint.as_deref() {
            Some(endpoint) if is_unresolved_placeholder(endpoint) => {
                tracing::warn!(
                    "sink.endpoint {} is not set in the environment, submissions need --endpoint or --dry-run",
                    endpoint
                );
            }
            Some(endpoint) => validation::validate_url("sink.endpoint", endpoint)?,
            None => {}
        }

        validation::validate_range("sink.timeout_seconds", self.sink.timeout_seconds, 1, 120)?;
        for key in self.sink.headers.keys() {
            validation::validate_non_empty_string("sink.headers", key)?;
        }

        validation::validate_range(
            "scanner.cooldown_seconds",
            self.scanner.cooldown_seconds,
            0.0,
            60.0,
        )?;

        validation::validate_path("output.document_path", &self.output.document_path)?;

        Ok(())
    }

    /// 實際送出時必須有 webhook 位址
    pub fn require_endpoint(&self) -> Result<&str> {
        let endpoint = self.sink_endpoint();
        validation::validate_required_field("sink.endpoint", &endpoint).copied()
    }
}

/// 環境變數未設定時 `${VAR}` 會原樣保留
fn is_unresolved_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("${") && value.ends_with('}')
}

impl ConfigProvider for TomlConfig {
    fn sink_endpoint(&self) -> Option<&str> {
        self.sink
            .endpoint
            .as_deref()
            .filter(|endpoint| !is_unresolved_placeholder(endpoint))
    }

    fn sink_timeout(&self) -> Duration {
        Duration::from_secs(self.sink.timeout_seconds)
    }

    fn cooldown_window(&self) -> Duration {
        // validate_config 已確保數值在範圍內
        Duration::try_from_secs_f64(self.scanner.cooldown_seconds).unwrap_or(DEFAULT_COOLDOWN)
    }

    fn confirmation_mode(&self) -> ConfirmationMode {
        self.workflow.confirmation
    }

    fn document_path(&self) -> &str {
        &self.output.document_path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[sink]
endpoint = "https://script.example.com/macros/s/abc/exec"
timeout_seconds = 5
require_success_status = false

[sink.headers]
x-api-key = "secret"

[scanner]
cooldown_seconds = 2.0

[workflow]
confirmation = "one_step"

[output]
document_path = "./out"
auto_export = true

[monitoring]
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(
            config.sink_endpoint(),
            Some("https://script.example.com/macros/s/abc/exec")
        );
        assert_eq!(config.sink_timeout(), Duration::from_secs(5));
        assert!(!config.sink.require_success_status);
        assert_eq!(config.sink.headers.get("x-api-key").unwrap(), "secret");
        assert_eq!(config.cooldown_window(), Duration::from_secs(2));
        assert_eq!(config.confirmation_mode(), ConfirmationMode::OneStep);
        assert_eq!(config.document_path(), "./out");
        assert!(config.output.auto_export);
        assert_eq!(config.monitoring.log_format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert!(config.sink_endpoint().is_none());
        assert_eq!(config.sink_timeout(), Duration::from_secs(10));
        assert_eq!(config.cooldown_window(), Duration::from_millis(1500));
        assert_eq!(config.confirmation_mode(), ConfirmationMode::TwoStep);
        assert_eq!(config.document_path(), "./receipts");
        assert!(config.validate().is_ok());
        assert!(config.require_endpoint().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_SHEETS_WEBHOOK", "https://sheets.test/exec");

        let toml_content = r#"
[sink]
endpoint = "${TEST_SHEETS_WEBHOOK}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.require_endpoint().unwrap(), "https://sheets.test/exec");

        std::env::remove_var("TEST_SHEETS_WEBHOOK");
    }

    #[test]
    fn test_unset_env_var_leaves_endpoint_unconfigured() {
        std::env::remove_var("PARTS_TRANSFER_UNSET_WEBHOOK");
        let config = TomlConfig::from_toml_str(
            "[sink]\nendpoint = \"${PARTS_TRANSFER_UNSET_WEBHOOK}\"\n",
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert!(config.sink_endpoint().is_none());
        assert!(matches!(
            config.require_endpoint(),
            Err(TransferError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_sample_config_file_validates() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/transfer-config.toml");
        let config = TomlConfig::from_file(path).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.cooldown_window(), Duration::from_millis(1500));
        assert_eq!(config.confirmation_mode(), ConfirmationMode::TwoStep);
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[sink]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_cooldown =
            TomlConfig::from_toml_str("[scanner]\ncooldown_seconds = -1.0\n").unwrap();
        assert!(bad_cooldown.validate().is_err());

        let bad_timeout = TomlConfig::from_toml_str("[sink]\ntimeout_seconds = 0\n").unwrap();
        assert!(bad_timeout.validate().is_err());
    }

    #[test]
    fn test_unknown_confirmation_mode_is_rejected() {
        let result = TomlConfig::from_toml_str("[workflow]\nconfirmation = \"three_step\"\n");
        assert!(matches!(
            result,
            Err(TransferError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[sink]
endpoint = "https://api.example.com/exec"

[scanner]
cooldown_seconds = 1.5
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.require_endpoint().unwrap(), "https://api.example.com/exec");
    }
}
