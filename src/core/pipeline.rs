use crate::core::extract::extract_book;
use crate::domain::model::{ItemReference, PipelineRun, TaskOutcome};
use crate::domain::ports::PageFetcher;
use crate::utils::error::ScrapeError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// 有界並發的詳細頁抓取管道
///
/// 每個 reference 變成一個任務：取得閘門許可 → 固定延遲 → 抓取 → 解析。
/// 同時進行的抓取數不超過 `concurrency`；延遲是每個任務各自套用，
/// 不是全域的速率限制。任何單一任務失敗都不影響其他任務。
pub struct DetailPipeline<F: PageFetcher> {
    fetcher: Arc<F>,
    concurrency: usize,
    delay: Duration,
    cancel: CancellationToken,
}

impl<F: PageFetcher + 'static> DetailPipeline<F> {
    pub fn new(fetcher: Arc<F>, concurrency: usize, delay: Duration) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
            delay,
            cancel: CancellationToken::new(),
        }
    }

    /// 取得取消權杖；觸發後未入場的任務直接結束，進行中的抓取讓它跑完
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// 抓取所有 reference 的詳細頁，等全部任務結束才回傳
    pub async fn run(&self, references: Vec<ItemReference>) -> PipelineRun {
        let total = references.len();
        let started = Instant::now();

        tracing::info!(
            "🚚 Scraping {} detail pages ({} concurrent, {:?} delay per task)",
            total,
            self.concurrency,
            self.delay
        );

        // 計數閘門：最多 concurrency 個任務同時在抓取階段
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<(ItemReference, TaskOutcome)> = JoinSet::new();

        for reference in references {
            let gate = Arc::clone(&gate);
            let fetcher = Arc::clone(&self.fetcher);
            let cancel = self.cancel.clone();
            let delay = self.delay;

            tasks.spawn(async move {
                let outcome = scrape_detail(fetcher, gate, cancel, delay, &reference).await;
                (reference, outcome)
            });
        }

        let mut records = Vec::new();
        let mut absent = 0usize;
        let mut failed = 0usize;

        // fan-in：每個任務各自結算，直到全部收完
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((reference, TaskOutcome::Book(record))) => {
                    tracing::debug!("📖 Scraped book {} ({})", reference.id, record.title);
                    records.push(record);
                }
                Ok((reference, TaskOutcome::Absent)) => {
                    tracing::debug!(
                        "🔶 No linked-data block for {} ({})",
                        reference.id,
                        reference.url
                    );
                    absent += 1;
                }
                Ok((reference, TaskOutcome::Failed(e))) => {
                    tracing::warn!("❌ Failed book {} ({}): {}", reference.id, reference.url, e);
                    failed += 1;
                }
                Err(e) => {
                    // 任務 panic 也算一筆失敗，維持數量守恆
                    tracing::error!("❌ Scrape task aborted: {}", e);
                    failed += 1;
                }
            }
        }

        let run = PipelineRun {
            records,
            absent,
            failed,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "🏁 Pipeline finished: {} scraped, {} without metadata, {} failed in {:?}",
            run.records.len(),
            run.absent,
            run.failed,
            run.elapsed
        );

        run
    }
}

/// 單一任務：Pending → 入場 → 延遲 → 抓取 → 解析，不重試
async fn scrape_detail<F: PageFetcher>(
    fetcher: Arc<F>,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
    delay: Duration,
    reference: &ItemReference,
) -> TaskOutcome {
    let cancelled = || {
        TaskOutcome::Failed(ScrapeError::CancelledError {
            url: reference.url.clone(),
        })
    };

    // 等待閘門空位；取消時不再入場
    let _permit = tokio::select! {
        permit = gate.acquire() => match permit {
            Ok(permit) => permit,
            Err(_) => return cancelled(),
        },
        _ = cancel.cancelled() => return cancelled(),
    };

    // 固定延遲在取得空位後套用，和抓取一樣佔用名額
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = cancel.cancelled() => return cancelled(),
    }

    match fetcher.fetch(&reference.url).await {
        Ok(page) => match extract_book(reference, &page.body) {
            Ok(Some(record)) => TaskOutcome::Book(record),
            Ok(None) => TaskOutcome::Absent,
            Err(e) => TaskOutcome::Failed(e),
        },
        Err(e) => TaskOutcome::Failed(e),
    }
}
