//! Resolution Orchestrator
//!
//! Sequences one ISBN resolution:
//! 1. Cache check (no network call on a hit)
//! 2. Provider chain in priority order, first usable result wins
//! 3. Field composition: title, normalized authors, cover, classified genre
//!
//! The title/author cover search is exposed separately through
//! [`Orchestrator::find_cover`]; `resolve` never runs it.
//!
//! # Concurrency
//! With `concurrent_lookup` enabled all providers are polled at once. A
//! provider's result is only accepted after every higher-priority provider has
//! missed, so the primary still wins whenever it answers. Lookups still in
//! flight at that point are dropped.

use crate::author::join_authors;
use crate::classifier::classify;
use crate::config::PipelineConfig;
use crate::cover_search::CoverSearch;
use crate::providers::{build_http_client, GoogleBooksClient, OpenLibraryClient};
use crate::store::{BookStore, SqliteBookStore};
use crate::types::{
    BookMetadata, BookProvider, ProviderError, Resolution, ResolutionSource, ResolvedBook,
    StoreError, UNKNOWN_AUTHOR, UNKNOWN_TITLE,
};
use futures::stream::{FuturesUnordered, StreamExt};
use libris_common::db::CacheRecord;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-provider progress in concurrent mode
enum Slot {
    Pending,
    Missed,
    Found(BookMetadata),
}

/// Book metadata resolution pipeline
pub struct Orchestrator {
    store: Arc<dyn BookStore>,
    providers: Vec<Arc<dyn BookProvider>>,
    cover_search: Arc<dyn CoverSearch>,
    config: PipelineConfig,
}

impl Orchestrator {
    /// Assemble from explicit collaborators; `providers` is in priority order
    pub fn new(
        store: Arc<dyn BookStore>,
        providers: Vec<Arc<dyn BookProvider>>,
        cover_search: Arc<dyn CoverSearch>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            providers,
            cover_search,
            config,
        }
    }

    /// Standard pipeline: SQLite cache, Open Library then Google Books
    pub fn with_pool(pool: SqlitePool, config: PipelineConfig) -> Result<Self, ProviderError> {
        let http_client = build_http_client(&config)?;

        let open_library = Arc::new(OpenLibraryClient::with_client(
            http_client.clone(),
            &config.open_library_url,
        ));
        let google_books = Arc::new(GoogleBooksClient::with_client(
            http_client,
            &config.google_books_url,
            config.cover_search_max_results,
        ));

        let providers: Vec<Arc<dyn BookProvider>> = vec![
            open_library as Arc<dyn BookProvider>,
            google_books.clone() as Arc<dyn BookProvider>,
        ];

        Ok(Self::new(
            Arc::new(SqliteBookStore::new(pool)),
            providers,
            google_books,
            config,
        ))
    }

    /// Resolve an ISBN to the best available book tuple
    ///
    /// Never fails: "nothing found" is the sentinel book with
    /// [`ResolutionSource::Unresolved`]. A failed cache read is reported in
    /// [`Resolution::store_error`] and the provider chain still runs.
    pub async fn resolve(&self, isbn: &str) -> Resolution {
        let isbn = isbn.trim();

        if isbn.is_empty() {
            debug!("Empty ISBN, skipping lookup");
            return Resolution {
                book: ResolvedBook::unknown(),
                source: ResolutionSource::Unresolved,
                store_error: None,
            };
        }

        let mut store_error = None;

        match self.store.get_cached(isbn).await {
            Ok(Some(record)) => {
                info!(isbn = %isbn, "Resolved from local store");
                return Resolution {
                    book: from_cache(record),
                    source: ResolutionSource::Cache,
                    store_error: None,
                };
            }
            Ok(None) => {
                debug!(isbn = %isbn, "Cache miss");
            }
            Err(e) => {
                error!(isbn = %isbn, error = %e, "Cache lookup failed, querying providers");
                store_error = Some(StoreError(e));
            }
        }

        match self.lookup_providers(isbn).await {
            Some((provider, metadata)) => {
                let book = compose(&metadata);
                info!(
                    isbn = %isbn,
                    provider = provider,
                    title = %book.title,
                    genre = ?book.genre,
                    "Resolved from provider"
                );
                Resolution {
                    book,
                    source: ResolutionSource::Provider(provider),
                    store_error,
                }
            }
            None => {
                info!(isbn = %isbn, "No provider returned metadata");
                Resolution {
                    book: ResolvedBook::unknown(),
                    source: ResolutionSource::Unresolved,
                    store_error,
                }
            }
        }
    }

    /// Query the provider chain, bypassing the cache
    ///
    /// Returns the winning provider's name with its metadata.
    pub async fn lookup_providers(&self, isbn: &str) -> Option<(&'static str, BookMetadata)> {
        if self.config.concurrent_lookup && self.providers.len() > 1 {
            self.lookup_concurrent(isbn).await
        } else {
            self.lookup_sequential(isbn).await
        }
    }

    async fn lookup_sequential(&self, isbn: &str) -> Option<(&'static str, BookMetadata)> {
        for provider in &self.providers {
            match provider.lookup(isbn).await {
                Ok(metadata) => return Some((provider.name(), metadata)),
                Err(e) => log_miss(provider.name(), isbn, &e),
            }
        }
        None
    }

    async fn lookup_concurrent(&self, isbn: &str) -> Option<(&'static str, BookMetadata)> {
        let mut pending: FuturesUnordered<_> = self
            .providers
            .iter()
            .enumerate()
            .map(|(index, provider)| async move { (index, provider.lookup(isbn).await) })
            .collect();

        let mut slots: Vec<Slot> = self.providers.iter().map(|_| Slot::Pending).collect();

        while let Some((index, result)) = pending.next().await {
            slots[index] = match result {
                Ok(metadata) => Slot::Found(metadata),
                Err(e) => {
                    log_miss(self.providers[index].name(), isbn, &e);
                    Slot::Missed
                }
            };

            for (index, slot) in slots.iter_mut().enumerate() {
                match *slot {
                    Slot::Pending => break,
                    Slot::Missed => continue,
                    Slot::Found(_) => {
                        if let Slot::Found(metadata) = std::mem::replace(slot, Slot::Missed) {
                            if !pending.is_empty() {
                                debug!(
                                    isbn = %isbn,
                                    dropped = pending.len(),
                                    "Cancelling lower-priority lookups"
                                );
                            }
                            return Some((self.providers[index].name(), metadata));
                        }
                    }
                }
            }
        }

        None
    }

    /// Cover image by title and optional author
    pub async fn find_cover(&self, title: &str, author: Option<&str>) -> Option<String> {
        self.cover_search.find_cover(title, author).await
    }
}

fn log_miss(provider: &'static str, isbn: &str, err: &ProviderError) {
    if err.is_not_found() {
        debug!(provider = provider, isbn = %isbn, "Provider has no record");
    } else {
        warn!(provider = provider, isbn = %isbn, error = %err, "Provider lookup failed");
    }
}

/// Compose the final tuple from one provider's metadata
pub fn compose(metadata: &BookMetadata) -> ResolvedBook {
    let genre = classify(
        &metadata.subjects,
        metadata.title.as_deref(),
        metadata.description.as_deref(),
    );

    ResolvedBook {
        title: metadata
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        author: join_authors(&metadata.authors).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        cover_url: metadata.cover_url.clone(),
        genre: genre.map(String::from),
    }
}

/// Stored record as a tuple, sentinels only for missing title/author
pub fn from_cache(record: CacheRecord) -> ResolvedBook {
    ResolvedBook {
        title: record.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        author: record.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        cover_url: record.cover_url,
        genre: record.genre,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_fills_sentinels() {
        let book = compose(&BookMetadata::default());
        assert_eq!(book, ResolvedBook::unknown());
    }

    #[test]
    fn test_compose_normalizes_and_classifies() {
        let metadata = BookMetadata {
            title: Some("Murder on the Orient Express".to_string()),
            authors: vec!["Christie, Agatha".to_string()],
            cover_url: Some("m.jpg".to_string()),
            subjects: vec!["Crime fiction".to_string(), "romance subplot".to_string()],
            description: None,
        };

        let book = compose(&metadata);
        assert_eq!(book.title, "Murder on the Orient Express");
        assert_eq!(book.author, "Agatha Christie");
        assert_eq!(book.cover_url.as_deref(), Some("m.jpg"));
        assert_eq!(book.genre.as_deref(), Some("Crime"));
    }

    #[test]
    fn test_from_cache_passes_nulls_through() {
        let book = from_cache(CacheRecord {
            title: None,
            author: Some("Ursula K. Le Guin".to_string()),
            cover_url: None,
            genre: None,
        });
        assert_eq!(book.title, UNKNOWN_TITLE);
        assert_eq!(book.author, "Ursula K. Le Guin");
        assert!(book.cover_url.is_none());
        assert!(book.genre.is_none());
    }
}
