use super::{absolutize, CollectionParams};
use crate::domain::model::ItemReference;
use crate::domain::ports::Discoverer;
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// 收藏查詢，欄位和站方的 Apollo schema 對齊
const COLLECTION_QUERY: &str = r#"
query UserCollection($action: ProductAction, $categoryId: Int, $gameSystemId: Int,
                    $genreId: Int, $isAgenda: Boolean, $keywords: String, $limit: Int,
                    $month: Int, $offset: Int, $order: CollectionSort, $showTvAgenda: Boolean,
                    $universe: String, $username: String!, $versus: Boolean, $year: Int,
                    $yearDateDone: Int, $yearDateRelease: Int) {
    user(username: $username) {
        collection(
            action: $action
            categoryId: $categoryId
            gameSystemId: $gameSystemId
            genreId: $genreId
            isAgenda: $isAgenda
            keywords: $keywords
            limit: $limit
            month: $month
            offset: $offset
            order: $order
            showTvAgenda: $showTvAgenda
            universe: $universe
            versus: $versus
            year: $year
            yearDateDone: $yearDateDone
            yearDateRelease: $yearDateRelease
        ) {
            total
            products {
                title
                id
                url
                yearOfProduction
                __typename
            }
            __typename
        }
    }
}
"#;

/// API 分頁策略：固定批量、遞增 offset，直到拿到空批
pub struct GraphqlDiscoverer {
    client: Client,
    endpoint: String,
    base_url: String,
    params: CollectionParams,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    data: Option<DataNode>,
}

#[derive(Debug, Deserialize)]
struct DataNode {
    user: Option<UserNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    collection: Option<CollectionNode>,
}

#[derive(Debug, Deserialize)]
struct CollectionNode {
    total: Option<u64>,
    #[serde(default)]
    products: Vec<ProductNode>,
}

#[derive(Debug, Deserialize)]
struct ProductNode {
    id: i64,
    title: String,
    url: String,
    #[serde(rename = "yearOfProduction")]
    year_of_production: Option<i32>,
}

impl GraphqlDiscoverer {
    pub fn new(
        client: Client,
        endpoint: String,
        base_url: String,
        params: CollectionParams,
    ) -> Self {
        Self {
            client,
            endpoint,
            base_url,
            params,
        }
    }

    async fn fetch_batch(&self, offset: usize, limit: usize) -> Result<CollectionNode> {
        let variables = serde_json::json!({
            "action": null,
            "categoryId": self.params.filters.category_id,
            "gameSystemId": null,
            "genreId": self.params.filters.genre_id,
            "keywords": self.params.filters.keywords,
            "limit": limit,
            "offset": offset,
            "order": self.params.sort_order.as_api_value(),
            "universe": self.params.universe,
            "username": self.params.username,
            "yearDateDone": self.params.filters.year_done,
            "yearDateRelease": self.params.filters.year_release,
        });

        let payload = serde_json::json!({
            "operationName": "UserCollection",
            "variables": variables,
            "query": COLLECTION_QUERY,
        });

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatusError {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let parsed: CollectionResponse = response.json().await?;
        let collection = parsed
            .data
            .and_then(|data| data.user)
            .and_then(|user| user.collection);

        Ok(collection.unwrap_or(CollectionNode {
            total: None,
            products: Vec::new(),
        }))
    }

    fn reference_from_product(&self, product: ProductNode) -> ItemReference {
        ItemReference {
            id: product.id,
            title: product.title,
            url: absolutize(&self.base_url, &product.url),
            year_of_production: product.year_of_production,
        }
    }
}

#[async_trait]
impl Discoverer for GraphqlDiscoverer {
    async fn discover(&self) -> Result<Vec<ItemReference>> {
        let mut references = Vec::new();
        let mut offset = 0usize;
        let limit = self.params.batch_size.max(1);

        loop {
            match self.fetch_batch(offset, limit).await {
                Ok(collection) => {
                    if offset == 0 {
                        if let Some(total) = collection.total {
                            tracing::info!("📚 Collection reports {} items", total);
                        }
                    }
                    if collection.products.is_empty() {
                        break;
                    }
                    references.extend(
                        collection
                            .products
                            .into_iter()
                            .map(|product| self.reference_from_product(product)),
                    );
                    tracing::debug!(
                        "📥 Collected {} references so far (offset {})",
                        references.len(),
                        offset
                    );
                    offset += limit;
                }
                Err(e) => {
                    // 途中失敗：記錄後以部分清單繼續，不讓整個執行失敗
                    tracing::error!("❌ Collection fetch failed at offset {}: {}", offset, e);
                    break;
                }
            }
        }

        Ok(references)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CollectionFilters, SortOrder};
    use httpmock::prelude::*;

    fn params(batch_size: usize) -> CollectionParams {
        CollectionParams {
            username: "spif".to_string(),
            universe: "2".to_string(),
            sort_order: SortOrder::LastAction,
            batch_size,
            filters: CollectionFilters::default(),
        }
    }

    fn batch_body(products: serde_json::Value, total: u64) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "user": {
                    "collection": {
                        "total": total,
                        "products": products
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn test_discover_paginates_until_empty_batch() {
        let server = MockServer::start();

        // 批次 [3, 2, 0] 筆，應得到 5 筆並保持遇到順序
        let first = server.mock(|when, then| {
            when.method(POST).path("/").body_contains("\"offset\":0,");
            then.status(200).json_body(batch_body(
                serde_json::json!([
                    {"id": 1, "title": "Dune", "url": "/livre/dune/1", "yearOfProduction": 1965},
                    {"id": 2, "title": "Hyperion", "url": "/livre/hyperion/2", "yearOfProduction": 1989},
                    {"id": 3, "title": "Ubik", "url": "/livre/ubik/3", "yearOfProduction": 1969}
                ]),
                5,
            ));
        });
        let second = server.mock(|when, then| {
            when.method(POST).path("/").body_contains("\"offset\":3,");
            then.status(200).json_body(batch_body(
                serde_json::json!([
                    {"id": 4, "title": "Solaris", "url": "/livre/solaris/4", "yearOfProduction": 1961},
                    {"id": 5, "title": "Fondation", "url": "/livre/fondation/5", "yearOfProduction": 1951}
                ]),
                5,
            ));
        });
        let last = server.mock(|when, then| {
            when.method(POST).path("/").body_contains("\"offset\":6,");
            then.status(200)
                .json_body(batch_body(serde_json::json!([]), 5));
        });

        let discoverer = GraphqlDiscoverer::new(
            Client::new(),
            server.url("/"),
            "https://www.senscritique.com".to_string(),
            params(3),
        );

        let references = discoverer.discover().await.unwrap();

        first.assert();
        second.assert();
        last.assert();

        assert_eq!(references.len(), 5);
        let ids: Vec<i64> = references.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            references[0].url,
            "https://www.senscritique.com/livre/dune/1"
        );
        assert_eq!(references[0].year_of_production, Some(1965));
    }

    #[tokio::test]
    async fn test_discover_returns_partial_results_on_mid_fetch_error() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/").body_contains("\"offset\":0,");
            then.status(200).json_body(batch_body(
                serde_json::json!([
                    {"id": 1, "title": "Dune", "url": "/livre/dune/1", "yearOfProduction": 1965},
                    {"id": 2, "title": "Hyperion", "url": "/livre/hyperion/2", "yearOfProduction": 1989}
                ]),
                10,
            ));
        });
        server.mock(|when, then| {
            when.method(POST).path("/").body_contains("\"offset\":2,");
            then.status(500);
        });

        let discoverer = GraphqlDiscoverer::new(
            Client::new(),
            server.url("/"),
            "https://www.senscritique.com".to_string(),
            params(2),
        );

        let references = discoverer.discover().await.unwrap();

        // 提前終止但保留已收集的部分
        assert_eq!(references.len(), 2);
    }

    #[tokio::test]
    async fn test_discover_sends_username_and_filters() {
        let server = MockServer::start();

        let collection_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("\"username\":\"spif\"")
                .body_contains("\"genreId\":42");
            then.status(200)
                .json_body(batch_body(serde_json::json!([]), 0));
        });

        let mut params = params(10);
        params.filters.genre_id = Some(42);

        let discoverer = GraphqlDiscoverer::new(
            Client::new(),
            server.url("/"),
            "https://www.senscritique.com".to_string(),
            params,
        );

        let references = discoverer.discover().await.unwrap();

        collection_mock.assert();
        assert!(references.is_empty());
    }
}
