use crate::app::discover::{DEFAULT_BASE_URL, DEFAULT_GRAPHQL_ENDPOINT};
use crate::config::DEFAULT_OUTPUT_FILE;
use crate::domain::model::{CollectionFilters, DiscoveryStrategy, SortOrder};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScrapeError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub filters: CollectionFilters,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub username: String,
    pub universe: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub strategy: Option<DiscoveryStrategy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub graphql_endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub concurrent_requests: Option<usize>,
    pub request_delay_ms: Option<u64>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    /// 支援 {username} 與 {timestamp} 佔位符
    pub filename_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScrapeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScrapeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SC_USERNAME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string(
            "scrape.username",
            &self.scrape.username,
        )?;
        crate::utils::validation::validate_url("source.base_url", self.base_url())?;
        crate::utils::validation::validate_url(
            "source.graphql_endpoint",
            self.graphql_endpoint(),
        )?;
        crate::utils::validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(concurrent) = self.pipeline.concurrent_requests {
            crate::utils::validation::validate_positive_number(
                "pipeline.concurrent_requests",
                concurrent,
                1,
            )?;
        }

        if let Some(delay_ms) = self.pipeline.request_delay_ms {
            crate::utils::validation::validate_range(
                "pipeline.request_delay_ms",
                delay_ms,
                0,
                60_000,
            )?;
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        self.source.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn graphql_endpoint(&self) -> &str {
        self.source
            .graphql_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GRAPHQL_ENDPOINT)
    }

    fn username(&self) -> &str {
        &self.scrape.username
    }

    fn universe(&self) -> &str {
        self.scrape.universe.as_deref().unwrap_or("2")
    }

    fn sort_order(&self) -> SortOrder {
        self.scrape.sort_order.unwrap_or(SortOrder::LastAction)
    }

    fn strategy(&self) -> DiscoveryStrategy {
        self.scrape.strategy.unwrap_or(DiscoveryStrategy::Api)
    }

    fn concurrent_requests(&self) -> usize {
        self.pipeline.concurrent_requests.unwrap_or(3)
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.pipeline.request_delay_ms.unwrap_or(200))
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds.unwrap_or(30))
    }

    fn batch_size(&self) -> usize {
        self.pipeline.batch_size.unwrap_or(30)
    }

    fn filters(&self) -> CollectionFilters {
        self.filters.clone()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_filename(&self) -> String {
        match &self.load.filename_pattern {
            Some(pattern) => pattern
                .replace("{username}", &self.scrape.username)
                .replace(
                    "{timestamp}",
                    &chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string(),
                ),
            None => DEFAULT_OUTPUT_FILE.to_string(),
        }
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
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
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[scrape]
username = "spif"
strategy = "api"

[pipeline]
concurrent_requests = 5
request_delay_ms = 100

[load]
output_path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.username(), "spif");
        assert_eq!(config.strategy(), DiscoveryStrategy::Api);
        assert_eq!(config.concurrent_requests(), 5);
        assert_eq!(config.request_delay(), Duration::from_millis(100));
        assert_eq!(config.universe(), "2");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_SC_USERNAME", "someone");

        let toml_content = r#"
[scrape]
username = "${TEST_SC_USERNAME}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.username(), "someone");

        std::env::remove_var("TEST_SC_USERNAME");
    }

    #[test]
    fn test_config_validation_rejects_bad_base_url() {
        let toml_content = r#"
[scrape]
username = "spif"

[source]
base_url = "not-a-url"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_zero_concurrency() {
        let toml_content = r#"
[scrape]
username = "spif"

[pipeline]
concurrent_requests = 0

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[scrape]
username = "file-user"

[load]
output_path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.username(), "file-user");
    }

    #[test]
    fn test_filename_pattern_substitution() {
        let toml_content = r#"
[scrape]
username = "spif"

[load]
output_path = "./output"
filename_pattern = "books_{username}.json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_filename(), "books_spif.json");
    }
}
