use crate::domain::model::{
    CollectionFilters, DiscoveryStrategy, FetchedPage, ItemReference, SortOrder,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 抓取單一頁面的邊界。非 2xx 回應視為該次呼叫的錯誤，不會中止整個執行。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// 產生待抓取項目清單。分頁途中失敗時回傳已收集到的部分結果。
#[async_trait]
pub trait Discoverer: Send + Sync {
    async fn discover(&self) -> Result<Vec<ItemReference>>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn graphql_endpoint(&self) -> &str;
    fn username(&self) -> &str;
    fn universe(&self) -> &str;
    fn sort_order(&self) -> SortOrder;
    fn strategy(&self) -> DiscoveryStrategy;
    fn concurrent_requests(&self) -> usize;
    fn request_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn batch_size(&self) -> usize;
    fn filters(&self) -> CollectionFilters;
    fn output_path(&self) -> &str;
    fn output_filename(&self) -> String;
    fn monitoring_enabled(&self) -> bool;
}
