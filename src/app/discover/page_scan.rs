use super::{absolutize, CollectionParams};
use crate::domain::model::ItemReference;
use crate::domain::ports::Discoverer;
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

const PRODUCT_LINK_SELECTOR: &str = r#"a[data-testid="product-title"]"#;

/// 頁面掃描策略：從第 1 頁開始抓列表頁，直到遇到沒有任何項目的頁面
pub struct PageScanDiscoverer {
    client: Client,
    base_url: String,
    params: CollectionParams,
}

impl PageScanDiscoverer {
    pub fn new(client: Client, base_url: String, params: CollectionParams) -> Self {
        Self {
            client,
            base_url,
            params,
        }
    }

    fn listing_url(&self, page: usize) -> String {
        format!(
            "{}/{}/collection?universe={}&page={}",
            self.base_url.trim_end_matches('/'),
            self.params.username,
            self.params.universe,
            page
        )
    }

    async fn fetch_listing(&self, page: usize) -> Result<String> {
        let url = self.listing_url(page);
        tracing::debug!("📡 GET {}", url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatusError {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response.text().await?)
    }

    fn parse_listing(&self, body: &str) -> Vec<ItemReference> {
        let document = Html::parse_document(body);
        let selector = Selector::parse(PRODUCT_LINK_SELECTOR).unwrap();

        document
            .select(&selector)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let id = item_id_from_href(href)?;
                let title = anchor.text().collect::<String>().trim().to_string();
                Some(ItemReference {
                    id,
                    title,
                    url: absolutize(&self.base_url, href),
                    year_of_production: None,
                })
            })
            .collect()
    }
}

/// 詳細頁路徑的最後一段是數字 id，例如 /livre/dune/123456
fn item_id_from_href(href: &str) -> Option<i64> {
    href.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

#[async_trait]
impl Discoverer for PageScanDiscoverer {
    async fn discover(&self) -> Result<Vec<ItemReference>> {
        let mut references = Vec::new();
        let mut page = 1usize;

        loop {
            let body = match self.fetch_listing(page).await {
                Ok(body) => body,
                Err(e) => {
                    // 請求失敗：記錄後提前結束，保留已收集的部分
                    tracing::error!("❌ Listing page {} failed: {}", page, e);
                    break;
                }
            };

            let items = self.parse_listing(&body);
            if items.is_empty() {
                // 空頁代表收藏到此為止，不是錯誤
                break;
            }

            tracing::debug!("📥 Page {}: {} items", page, items.len());
            references.extend(items);
            page += 1;
        }

        Ok(references)
    }
}
