use crate::utils::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// 收藏清單中的一筆待抓取項目，由 Discoverer 產生
#[derive(Debug, Clone, PartialEq)]
pub struct ItemReference {
    pub id: i64,
    pub title: String,
    /// 詳細頁的絕對 URL
    pub url: String,
    pub year_of_production: Option<i32>,
}

/// 從詳細頁的 linked-data 區塊解析出的完整書籍記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "author")]
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub genres: BTreeSet<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub image_url: Option<String>,
    pub publication_date: Option<String>,
    pub year_of_production: Option<i32>,
}

/// 抓到的原始頁面內容，解析後即丟棄
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// 單一任務的最終結果：成功、頁面沒有結構化資料、或失敗
#[derive(Debug)]
pub enum TaskOutcome {
    Book(BookRecord),
    Absent,
    Failed(ScrapeError),
}

/// 一次完整管道執行的彙總結果
///
/// `records` 依完成順序排列，不保證輸入順序；
/// `records.len() + absent + failed` 恆等於輸入的 reference 數。
#[derive(Debug)]
pub struct PipelineRun {
    pub records: Vec<BookRecord>,
    pub absent: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl PipelineRun {
    /// 已處理的任務總數
    pub fn total(&self) -> usize {
        self.records.len() + self.absent + self.failed
    }
}

/// 引擎執行完成後回報給呼叫端的摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub scraped: usize,
    pub absent: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// 收藏排序方式，對應 API 的 CollectionSort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SortOrder {
    LastAction,
    Alphabetical,
    ReleaseDate,
    UserRating,
}

impl SortOrder {
    pub fn as_api_value(&self) -> &'static str {
        match self {
            SortOrder::LastAction => "LAST_ACTION",
            SortOrder::Alphabetical => "TITLE",
            SortOrder::ReleaseDate => "RELEASE_DATE",
            SortOrder::UserRating => "USER_RATING",
        }
    }
}

/// 清單探索策略：GraphQL API 分頁或 HTML 頁面掃描
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DiscoveryStrategy {
    Api,
    Pages,
}

/// 收藏過濾條件，全部未設定表示不過濾
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionFilters {
    pub category_id: Option<i32>,
    pub genre_id: Option<i32>,
    pub keywords: Option<String>,
    pub year_done: Option<i32>,
    pub year_release: Option<i32>,
}
