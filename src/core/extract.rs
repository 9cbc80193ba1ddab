use crate::domain::model::{BookRecord, ItemReference};
use crate::utils::error::{Result, ScrapeError};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeSet;

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// 有些欄位（creator、genre）單筆時不是陣列
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LdCreator {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LdAggregateRating {
    #[serde(rename = "ratingValue")]
    rating_value: Option<f64>,
    #[serde(rename = "ratingCount")]
    rating_count: Option<u64>,
}

/// 詳細頁內嵌的 linked-data 描述，只取我們需要的欄位
#[derive(Debug, Deserialize)]
struct LdBook {
    name: Option<String>,
    creator: Option<OneOrMany<LdCreator>>,
    isbn: Option<String>,
    description: Option<String>,
    genre: Option<OneOrMany<String>>,
    #[serde(rename = "aggregateRating")]
    aggregate_rating: Option<LdAggregateRating>,
    image: Option<String>,
    #[serde(rename = "dateCreated")]
    date_created: Option<String>,
}

/// 從詳細頁內容解析書籍記錄
///
/// 頁面沒有 linked-data 區塊時回傳 `Ok(None)`；
/// 區塊存在但不是合法 JSON 時回傳 `MalformedDataError`。
pub fn extract_book(reference: &ItemReference, body: &str) -> Result<Option<BookRecord>> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(LD_JSON_SELECTOR).unwrap();

    let node = match document.select(&selector).next() {
        Some(node) => node,
        None => return Ok(None),
    };

    let raw: String = node.text().collect();
    let book: LdBook =
        serde_json::from_str(&raw).map_err(|source| ScrapeError::MalformedDataError {
            url: reference.url.clone(),
            source,
        })?;

    // 作者永遠正規化成有序列表，即使來源只有單一物件
    let authors: Vec<String> = book
        .creator
        .map(|creators| creators.into_vec().into_iter().map(|c| c.name).collect())
        .unwrap_or_default();

    let genres: BTreeSet<String> = book
        .genre
        .map(|genres| genres.into_vec().into_iter().collect())
        .unwrap_or_default();

    let (rating, rating_count) = match book.aggregate_rating {
        Some(aggregate) => (aggregate.rating_value, aggregate.rating_count),
        None => (None, None),
    };

    Ok(Some(BookRecord {
        id: reference.id,
        title: book.name.unwrap_or_else(|| reference.title.clone()),
        authors,
        isbn: book.isbn,
        description: book.description,
        genres,
        rating,
        rating_count,
        image_url: book.image,
        publication_date: book.date_created,
        year_of_production: reference.year_of_production,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ItemReference {
        ItemReference {
            id: 42,
            title: "Listing Title".to_string(),
            url: "https://www.senscritique.com/livre/dune/42".to_string(),
            year_of_production: Some(1965),
        }
    }

    fn page_with_ld_json(ld_json: &str) -> String {
        format!(
            "<html><head><title>Book</title>\
             <script type=\"application/ld+json\">{}</script>\
             </head><body><h1>Book page</h1></body></html>",
            ld_json
        )
    }

    #[test]
    fn test_extract_well_formed_record() {
        let body = page_with_ld_json(
            r#"{"name":"Dune","creator":[{"name":"Frank Herbert"}],"isbn":"9780441013593"}"#,
        );

        let record = extract_book(&reference(), &body).unwrap().unwrap();

        assert_eq!(record.title, "Dune");
        assert_eq!(record.authors, vec!["Frank Herbert".to_string()]);
        assert_eq!(record.isbn.as_deref(), Some("9780441013593"));
        assert_eq!(record.year_of_production, Some(1965));
    }

    #[test]
    fn test_extract_single_creator_object_normalized_to_list() {
        let body = page_with_ld_json(r#"{"name":"Dune","creator":{"name":"Frank Herbert"}}"#);

        let record = extract_book(&reference(), &body).unwrap().unwrap();

        assert_eq!(record.authors, vec!["Frank Herbert".to_string()]);
    }

    #[test]
    fn test_extract_genre_string_and_array_both_become_set() {
        let body = page_with_ld_json(r#"{"name":"Dune","genre":"Science-fiction"}"#);
        let record = extract_book(&reference(), &body).unwrap().unwrap();
        assert!(record.genres.contains("Science-fiction"));

        let body = page_with_ld_json(
            r#"{"name":"Dune","genre":["Science-fiction","Roman","Science-fiction"]}"#,
        );
        let record = extract_book(&reference(), &body).unwrap().unwrap();
        assert_eq!(record.genres.len(), 2);
    }

    #[test]
    fn test_extract_aggregate_rating() {
        let body = page_with_ld_json(
            r#"{"name":"Dune","aggregateRating":{"ratingValue":8.3,"ratingCount":12345}}"#,
        );

        let record = extract_book(&reference(), &body).unwrap().unwrap();

        assert_eq!(record.rating, Some(8.3));
        assert_eq!(record.rating_count, Some(12345));
    }

    #[test]
    fn test_extract_absent_block_is_not_an_error() {
        let body = "<html><head></head><body><p>No structured data here</p></body></html>";

        let result = extract_book(&reference(), body).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_extract_malformed_json_is_hard_failure() {
        let body = page_with_ld_json(r#"{"name":"Dune","creator":["#);

        let err = extract_book(&reference(), &body).unwrap_err();

        assert!(matches!(err, ScrapeError::MalformedDataError { .. }));
    }

    #[test]
    fn test_extract_missing_name_falls_back_to_listing_title() {
        let body = page_with_ld_json(r#"{"isbn":"9780441013593"}"#);

        let record = extract_book(&reference(), &body).unwrap().unwrap();

        assert_eq!(record.title, "Listing Title");
    }
}
