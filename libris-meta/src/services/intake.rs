//! Add a book to the catalog
//!
//! Submitted fields win. Anything left blank is filled from `resolve`, and a
//! cover still missing after that is looked up by title and author.

use crate::cover_search::searchable_pair;
use crate::orchestrator::Orchestrator;
use crate::types::ResolutionSource;
use libris_common::db::{self, NewBook};
use libris_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Book submitted for insertion
///
/// Blank strings count as missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Result of a successful insertion
#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub id: i64,
    pub book: NewBook,
    /// Set when `resolve` ran to fill missing fields
    pub resolved_from: Option<ResolutionSource>,
    /// True when the cover came from the title/author search
    pub cover_from_search: bool,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Collect missing fields and insert the book
///
/// Fails with [`Error::InvalidInput`] on a blank ISBN and
/// [`Error::Duplicate`] when the ISBN is already catalogued.
pub async fn add_book(
    pool: &SqlitePool,
    orchestrator: &Orchestrator,
    request: IntakeRequest,
) -> Result<IntakeOutcome> {
    let isbn = request.isbn.trim().to_string();
    if isbn.is_empty() {
        return Err(Error::InvalidInput("ISBN is required".to_string()));
    }

    let mut title = present(request.title);
    let mut author = present(request.author);
    let mut cover_url = present(request.cover_url);
    let mut genre = present(request.genre);
    let mut resolved_from = None;

    if title.is_none() || author.is_none() || cover_url.is_none() || genre.is_none() {
        let resolution = orchestrator.resolve(&isbn).await;
        if let Some(e) = &resolution.store_error {
            warn!(isbn = %isbn, error = %e, "Store read failed during intake");
        }

        let book = resolution.book;
        title = title.or(Some(book.title));
        author = author.or(Some(book.author));
        cover_url = cover_url.or(book.cover_url);
        genre = genre.or(book.genre);
        resolved_from = Some(resolution.source);
    }

    let mut cover_from_search = false;
    if cover_url.is_none() {
        if let Some((t, a)) = searchable_pair(title.as_deref(), author.as_deref()) {
            cover_url = orchestrator.find_cover(t, Some(a)).await;
            cover_from_search = cover_url.is_some();
        }
    }

    let book = NewBook {
        isbn,
        title: title.unwrap_or_default(),
        author: author.unwrap_or_default(),
        cover_url,
        genre,
    };

    let id = db::insert_book(pool, &book).await?;

    info!(
        id = id,
        isbn = %book.isbn,
        title = %book.title,
        cover_from_search = cover_from_search,
        "Book added"
    );

    Ok(IntakeOutcome {
        id,
        book,
        resolved_from,
        cover_from_search,
    })
}
