//! `books` table queries
//!
//! The metadata pipeline only ever calls [`get_cached`]. Every other function
//! here is a write or maintenance query owned by the calling layer (intake,
//! backfill jobs).

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Stored fields of a book, keyed by ISBN
///
/// Blank text columns are read back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CacheRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
}

/// Full row of the `books` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredBook {
    pub id: i64,
    pub isbn: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub added_at: Option<NaiveDateTime>,
}

/// Book ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
}

/// Genre value treated as "no genre" by the catalog UI
pub const UNCATEGORIZED: &str = "Uncategorized";

const SELECT_BOOK_COLUMNS: &str = r#"
    SELECT
        id,
        COALESCE(isbn, '') AS isbn,
        NULLIF(TRIM(title), '') AS title,
        NULLIF(TRIM(author), '') AS author,
        NULLIF(TRIM(cover_url), '') AS cover_url,
        NULLIF(TRIM(genre), '') AS genre,
        added_at
    FROM books
"#;

/// Look up the stored fields for an ISBN
pub async fn get_cached(pool: &SqlitePool, isbn: &str) -> Result<Option<CacheRecord>> {
    let record = sqlx::query_as::<_, CacheRecord>(
        r#"
        SELECT
            NULLIF(TRIM(title), '') AS title,
            NULLIF(TRIM(author), '') AS author,
            NULLIF(TRIM(cover_url), '') AS cover_url,
            NULLIF(TRIM(genre), '') AS genre
        FROM books
        WHERE isbn = ?
        "#,
    )
    .bind(isbn)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Insert a new book, returning its row id
///
/// Fails with [`Error::Duplicate`] when the ISBN is already catalogued.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO books (isbn, title, author, cover_url, genre) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&book.isbn)
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.cover_url)
    .bind(&book.genre)
    .execute(pool)
    .await
    .map_err(|e| {
        if Error::is_unique_violation(&e) {
            Error::Duplicate(format!("ISBN {}", book.isbn))
        } else {
            Error::Database(e)
        }
    })?;

    Ok(result.last_insert_rowid())
}

/// Fetch a book by row id
pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<StoredBook> {
    let query = format!("{} WHERE id = ?", SELECT_BOOK_COLUMNS);
    sqlx::query_as::<_, StoredBook>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("book {}", id)))
}

/// Set the genre of a book
pub async fn update_genre(pool: &SqlitePool, id: i64, genre: &str) -> Result<()> {
    let result = sqlx::query("UPDATE books SET genre = ? WHERE id = ?")
        .bind(genre)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", id)));
    }
    Ok(())
}

/// Set the cover image URL of a book
pub async fn update_cover(pool: &SqlitePool, id: i64, cover_url: &str) -> Result<()> {
    let result = sqlx::query("UPDATE books SET cover_url = ? WHERE id = ?")
        .bind(cover_url)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", id)));
    }
    Ok(())
}

/// Books whose genre is NULL, blank or [`UNCATEGORIZED`]
pub async fn books_missing_genre(pool: &SqlitePool) -> Result<Vec<StoredBook>> {
    let query = format!(
        "{} WHERE genre IS NULL OR TRIM(genre) = '' OR genre = ? ORDER BY id",
        SELECT_BOOK_COLUMNS
    );
    let rows = sqlx::query_as::<_, StoredBook>(&query)
        .bind(UNCATEGORIZED)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Books without a cover image URL
pub async fn books_missing_cover(pool: &SqlitePool) -> Result<Vec<StoredBook>> {
    let query = format!(
        "{} WHERE cover_url IS NULL OR TRIM(cover_url) = '' ORDER BY id",
        SELECT_BOOK_COLUMNS
    );
    let rows = sqlx::query_as::<_, StoredBook>(&query)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Total number of catalogued books
pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
