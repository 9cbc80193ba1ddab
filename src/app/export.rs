use crate::domain::model::BookRecord;
use crate::utils::error::Result;
use serde::Serialize;
use std::path::Path;

/// Goodreads 匯入格式的固定欄位，順序必須和匯入範本一致
pub const GOODREADS_COLUMNS: [&str; 14] = [
    "Title",
    "Author",
    "ISBN",
    "My Rating",
    "Average Rating",
    "Publisher",
    "Binding",
    "Year Published",
    "Original Publication Year",
    "Date Read",
    "Date Added",
    "Shelves",
    "Bookshelves",
    "My Review",
];

/// 一筆書籍記錄攤平成的一列；沒有資料的欄位輸出空字串
#[derive(Debug, Clone, Serialize)]
pub struct GoodreadsRow {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub my_rating: String,
    pub average_rating: String,
    pub publisher: String,
    pub binding: String,
    pub year_published: String,
    pub original_publication_year: String,
    pub date_read: String,
    pub date_added: String,
    pub shelves: String,
    pub bookshelves: String,
    pub my_review: String,
}

/// 純函數：BookRecord → Goodreads 列。清單欄位用逗號串接。
pub fn flatten(record: &BookRecord) -> GoodreadsRow {
    GoodreadsRow {
        title: record.title.clone(),
        author: record.authors.join(", "),
        isbn: record.isbn.clone().unwrap_or_default(),
        my_rating: String::new(),
        average_rating: record
            .rating
            .map(|rating| rating.to_string())
            .unwrap_or_default(),
        publisher: String::new(),
        binding: String::new(),
        year_published: record
            .year_of_production
            .map(|year| year.to_string())
            .unwrap_or_default(),
        original_publication_year: String::new(),
        date_read: String::new(),
        date_added: String::new(),
        shelves: String::new(),
        bookshelves: String::new(),
        my_review: String::new(),
    }
}

/// 寫出 Goodreads CSV；空清單也會寫出只有標題列的合法檔案
pub fn write_goodreads_csv<P: AsRef<Path>>(records: &[BookRecord], path: P) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(GOODREADS_COLUMNS)?;
    for record in records {
        writer.serialize(flatten(record))?;
    }
    writer.flush()?;

    Ok(())
}
