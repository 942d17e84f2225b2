//! Repair jobs over already-catalogued books
//!
//! Both jobs query the provider chain directly. The cache would only hand
//! back the incomplete row being repaired.

use crate::classifier::classify;
use crate::cover_search::searchable_pair;
use crate::orchestrator::Orchestrator;
use libris_common::db::{self, UNCATEGORIZED};
use libris_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Outcome counters for one backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub examined: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Infer genres for books with no usable genre
pub async fn backfill_genres(pool: &SqlitePool, orchestrator: &Orchestrator) -> Result<BackfillReport> {
    let books = db::books_missing_genre(pool).await?;
    let mut report = BackfillReport {
        examined: books.len(),
        ..BackfillReport::default()
    };

    info!(count = books.len(), "Genre backfill started");

    for book in books {
        let isbn = book.isbn.trim();
        let found = if isbn.is_empty() {
            None
        } else {
            orchestrator.lookup_providers(isbn).await
        };

        let Some((provider, metadata)) = found else {
            debug!(id = book.id, isbn = %book.isbn, "No metadata found, skipping");
            report.skipped += 1;
            continue;
        };

        let genre = classify(
            &metadata.subjects,
            metadata.title.as_deref(),
            metadata.description.as_deref(),
        )
        .map(String::from)
        .filter(|g| g != UNCATEGORIZED);

        match genre {
            Some(genre) => {
                db::update_genre(pool, book.id, &genre).await?;
                info!(id = book.id, isbn = %book.isbn, provider = provider, genre = %genre, "Genre updated");
                report.updated += 1;
            }
            None => {
                debug!(id = book.id, isbn = %book.isbn, "No genre inferred, skipping");
                report.skipped += 1;
            }
        }
    }

    info!(
        examined = report.examined,
        updated = report.updated,
        skipped = report.skipped,
        "Genre backfill finished"
    );
    Ok(report)
}

/// Find covers for books without one
///
/// The provider chain is tried first, then the title/author search with the
/// stored title and author.
pub async fn backfill_covers(pool: &SqlitePool, orchestrator: &Orchestrator) -> Result<BackfillReport> {
    let books = db::books_missing_cover(pool).await?;
    let mut report = BackfillReport {
        examined: books.len(),
        ..BackfillReport::default()
    };

    info!(count = books.len(), "Cover backfill started");

    for book in books {
        let isbn = book.isbn.trim();
        let mut cover = if isbn.is_empty() {
            None
        } else {
            orchestrator
                .lookup_providers(isbn)
                .await
                .and_then(|(_, metadata)| metadata.cover_url)
        };

        if cover.is_none() {
            if let Some((title, author)) =
                searchable_pair(book.title.as_deref(), book.author.as_deref())
            {
                cover = orchestrator.find_cover(title, Some(author)).await;
            }
        }

        match cover {
            Some(url) => {
                db::update_cover(pool, book.id, &url).await?;
                info!(id = book.id, isbn = %book.isbn, "Cover updated");
                report.updated += 1;
            }
            None => {
                debug!(id = book.id, isbn = %book.isbn, "No cover found, skipping");
                report.skipped += 1;
            }
        }
    }

    info!(
        examined = report.examined,
        updated = report.updated,
        skipped = report.skipped,
        "Cover backfill finished"
    );
    Ok(report)
}
