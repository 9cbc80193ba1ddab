use clap::Parser;
use shelf_etl::app::discover::{CollectionParams, GraphqlDiscoverer, PageScanDiscoverer};
use shelf_etl::app::fetcher::{build_client, HttpFetcher};
use shelf_etl::core::{ConfigProvider, Discoverer, RunSummary};
use shelf_etl::domain::model::DiscoveryStrategy;
use shelf_etl::utils::{logger, validation::Validate};
use shelf_etl::{CliConfig, DetailPipeline, LocalStorage, ScrapeEngine, TomlConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting shelf-etl");

    let result = match &args.config {
        Some(config_path) => {
            tracing::info!("📁 Loading configuration from: {}", config_path);
            let config = match TomlConfig::from_file(config_path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", config_path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            run_with(&config, args.monitor || config.monitoring_enabled()).await
        }
        None => run_with(&args, args.monitor).await,
    };

    match result {
        Ok(summary) => {
            tracing::info!("✅ Scrape completed successfully!");
            println!("✅ Scrape completed successfully!");
            println!(
                "📚 {} books scraped, {} without metadata, {} failed ({:?})",
                summary.scraped, summary.absent, summary.failed, summary.elapsed
            );
            println!("📁 Output saved to: {}", summary.output_path);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                shelf_etl::utils::error::ErrorSeverity::Low => 0,
                shelf_etl::utils::error::ErrorSeverity::Medium => 2,
                shelf_etl::utils::error::ErrorSeverity::High => 1,
                shelf_etl::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

/// CLI 與 TOML 兩種配置共用的執行路徑
async fn run_with<C: ConfigProvider + Validate>(
    config: &C,
    monitor_enabled: bool,
) -> shelf_etl::Result<RunSummary> {
    // 驗證配置
    config.validate()?;

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 唯一的傳輸層；建立失敗是整個執行唯一的致命初始化錯誤
    let client = build_client(config.request_timeout())?;

    let params = CollectionParams {
        username: config.username().to_string(),
        universe: config.universe().to_string(),
        sort_order: config.sort_order(),
        batch_size: config.batch_size(),
        filters: config.filters(),
    };

    let discoverer: Box<dyn Discoverer> = match config.strategy() {
        DiscoveryStrategy::Api => Box::new(GraphqlDiscoverer::new(
            client.clone(),
            config.graphql_endpoint().to_string(),
            config.base_url().to_string(),
            params,
        )),
        DiscoveryStrategy::Pages => Box::new(PageScanDiscoverer::new(
            client.clone(),
            config.base_url().to_string(),
            params,
        )),
    };

    let fetcher = Arc::new(HttpFetcher::with_client(client));
    let pipeline = DetailPipeline::new(
        fetcher,
        config.concurrent_requests(),
        config.request_delay(),
    );
    let storage = LocalStorage::new(config.output_path());

    let engine = ScrapeEngine::new_with_monitoring(
        discoverer,
        pipeline,
        storage,
        config.output_filename(),
        monitor_enabled,
    );

    engine.run().await
}
