use crate::core::pipeline::DetailPipeline;
use crate::domain::model::RunSummary;
use crate::domain::ports::{Discoverer, PageFetcher, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 完整的抓取流程：探索清單 → 有界管道抓詳細頁 → 寫出 JSON
pub struct ScrapeEngine<F: PageFetcher, S: Storage> {
    discoverer: Box<dyn Discoverer>,
    pipeline: DetailPipeline<F>,
    storage: S,
    output_file: String,
    monitor: SystemMonitor,
}

impl<F: PageFetcher + 'static, S: Storage> ScrapeEngine<F, S> {
    pub fn new(
        discoverer: Box<dyn Discoverer>,
        pipeline: DetailPipeline<F>,
        storage: S,
        output_file: String,
    ) -> Self {
        Self::new_with_monitoring(discoverer, pipeline, storage, output_file, false)
    }

    pub fn new_with_monitoring(
        discoverer: Box<dyn Discoverer>,
        pipeline: DetailPipeline<F>,
        storage: S,
        output_file: String,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            discoverer,
            pipeline,
            storage,
            output_file,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting scrape run");

        // 探索收藏清單；途中失敗會回傳部分結果，不會讓整個執行失敗
        let references = self.discoverer.discover().await?;
        tracing::info!("📚 Found {} books in collection", references.len());
        self.monitor.log_phase("Discovery");

        if references.is_empty() {
            tracing::warn!("🔶 Collection is empty, writing an empty output file");
        }

        let total = references.len();
        let run = self.pipeline.run(references).await;
        debug_assert_eq!(run.total(), total);
        self.monitor.log_phase("Detail scraping");

        // 輸出固定依 id 遞增排序，結果可重現
        let mut records = run.records;
        records.sort_by_key(|record| record.id);

        let json = serde_json::to_vec_pretty(&records)?;
        self.storage.write_file(&self.output_file, &json).await?;
        self.monitor.log_phase("Write output");

        let summary = RunSummary {
            output_path: self.output_file.clone(),
            scraped: records.len(),
            absent: run.absent,
            failed: run.failed,
            elapsed: run.elapsed,
        };

        tracing::info!(
            "✅ Run complete: {} scraped, {} without metadata, {} failed",
            summary.scraped,
            summary.absent,
            summary.failed
        );
        self.monitor.log_final_stats();

        Ok(summary)
    }
}
