pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::app::discover::{DEFAULT_BASE_URL, DEFAULT_GRAPHQL_ENDPOINT};
#[cfg(feature = "cli")]
use crate::domain::model::{CollectionFilters, DiscoveryStrategy, SortOrder};
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use std::time::Duration;

pub const DEFAULT_OUTPUT_FILE: &str = "books_data.json";

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "shelf-etl")]
#[command(about = "Scrape a SensCritique book collection into a JSON file")]
pub struct CliConfig {
    /// Collection owner's username (required unless --config is given)
    #[arg(long)]
    pub username: Option<String>,

    /// Universe of the collection view (2 = books)
    #[arg(long, default_value = "2")]
    pub universe: String,

    #[arg(long, value_enum, default_value_t = SortOrder::LastAction)]
    pub sort_order: SortOrder,

    /// Listing discovery strategy
    #[arg(long, value_enum, default_value_t = DiscoveryStrategy::Api)]
    pub strategy: DiscoveryStrategy,

    /// Maximum number of detail fetches in flight
    #[arg(long, default_value = "3")]
    pub concurrent_requests: usize,

    /// Fixed delay each task applies before its request, in milliseconds
    #[arg(long, default_value = "200")]
    pub request_delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value = "30")]
    pub timeout_seconds: u64,

    /// Page size for API pagination
    #[arg(long, default_value = "30")]
    pub batch_size: usize,

    #[arg(long)]
    pub category_id: Option<i32>,

    #[arg(long)]
    pub genre_id: Option<i32>,

    #[arg(long)]
    pub keywords: Option<String>,

    #[arg(long)]
    pub year_done: Option<i32>,

    #[arg(long)]
    pub year_release: Option<i32>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_GRAPHQL_ENDPOINT)]
    pub graphql_endpoint: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Optional TOML configuration file; overrides the scrape settings above
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log resource usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn graphql_endpoint(&self) -> &str {
        &self.graphql_endpoint
    }

    fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    fn universe(&self) -> &str {
        &self.universe
    }

    fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    fn strategy(&self) -> DiscoveryStrategy {
        self.strategy
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn filters(&self) -> CollectionFilters {
        CollectionFilters {
            category_id: self.category_id,
            genre_id: self.genre_id,
            keywords: self.keywords.clone(),
            year_done: self.year_done,
            year_release: self.year_release,
        }
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_filename(&self) -> String {
        self.output_file.clone()
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let username = validation::validate_required_field("username", &self.username)?;
        validation::validate_non_empty_string("username", username)?;
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_url("graphql_endpoint", &self.graphql_endpoint)?;
        validation::validate_positive_number("concurrent_requests", self.concurrent_requests, 1)?;
        validation::validate_positive_number("batch_size", self.batch_size, 1)?;
        validation::validate_range("request_delay_ms", self.request_delay_ms, 0, 60_000)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validation::validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig::parse_from(["shelf-etl", "--username", "spif"])
    }

    #[test]
    fn test_defaults_match_original_tuning() {
        let config = base_config();

        assert_eq!(config.concurrent_requests(), 3);
        assert_eq!(config.request_delay(), Duration::from_millis(200));
        assert_eq!(config.universe(), "2");
        assert_eq!(config.strategy(), DiscoveryStrategy::Api);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_username_fails_validation() {
        let config = CliConfig::parse_from(["shelf-etl"]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_fails_validation() {
        let config = CliConfig::parse_from([
            "shelf-etl",
            "--username",
            "spif",
            "--concurrent-requests",
            "0",
        ]);

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_filters_flow_through() {
        let config = CliConfig::parse_from([
            "shelf-etl",
            "--username",
            "spif",
            "--genre-id",
            "42",
            "--keywords",
            "dune",
        ]);

        let filters = config.filters();
        assert_eq!(filters.genre_id, Some(42));
        assert_eq!(filters.keywords.as_deref(), Some("dune"));
        assert_eq!(filters.category_id, None);
    }
}
