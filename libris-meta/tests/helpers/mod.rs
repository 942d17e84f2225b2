//! Shared test fixtures: stub providers, stub stores and local stub servers

#![allow(dead_code)]

use async_trait::async_trait;
use libris_common::db::CacheRecord;
use libris_meta::config::PipelineConfig;
use libris_meta::cover_search::CoverSearch;
use libris_meta::store::BookStore;
use libris_meta::types::{BookMetadata, BookProvider, ProviderError};
use libris_meta::Orchestrator;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory database with the books table
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory database");
    libris_common::db::create_books_table(&pool)
        .await
        .expect("Failed to create books table");
    pool
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_stub_server(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// Pipeline configuration with a short timeout
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        request_timeout: Duration::from_secs(1),
        ..PipelineConfig::default()
    }
}

/// What a [`StubProvider`] answers
#[derive(Clone)]
pub enum StubReply {
    Found(BookMetadata),
    Missing,
    Failing,
}

/// In-process provider with a canned reply
pub struct StubProvider {
    name: &'static str,
    reply: StubReply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: &'static str, reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn delayed(name: &'static str, reply: StubReply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookProvider for StubProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, isbn: &str) -> Result<BookMetadata, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            StubReply::Found(metadata) => Ok(metadata.clone()),
            StubReply::Missing => Err(ProviderError::NotFound(isbn.to_string())),
            StubReply::Failing => Err(ProviderError::Network("connection refused".to_string())),
        }
    }
}

/// Cover search with a canned answer
pub struct StubCovers {
    cover: Option<String>,
    calls: AtomicUsize,
}

impl StubCovers {
    pub fn new(cover: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            cover: cover.map(str::to_string),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoverSearch for StubCovers {
    async fn find_cover(&self, _title: &str, _author: Option<&str>) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cover.clone()
    }
}

/// Store backed by a map
#[derive(Default)]
pub struct MapStore(pub HashMap<String, CacheRecord>);

#[async_trait]
impl BookStore for MapStore {
    async fn get_cached(&self, isbn: &str) -> libris_common::Result<Option<CacheRecord>> {
        Ok(self.0.get(isbn).cloned())
    }
}

/// Store whose reads always fail
pub struct BrokenStore;

#[async_trait]
impl BookStore for BrokenStore {
    async fn get_cached(&self, _isbn: &str) -> libris_common::Result<Option<CacheRecord>> {
        Err(libris_common::Error::Internal("store offline".to_string()))
    }
}

/// Orchestrator over stub collaborators
pub fn orchestrator(
    store: Arc<dyn BookStore>,
    providers: Vec<Arc<dyn BookProvider>>,
    covers: Arc<dyn CoverSearch>,
) -> Orchestrator {
    Orchestrator::new(store, providers, covers, test_config())
}

/// Metadata with just a title and authors
pub fn metadata(title: &str, authors: &[&str]) -> BookMetadata {
    BookMetadata {
        title: Some(title.to_string()),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        ..BookMetadata::default()
    }
}

/// Provider chain in the given priority order
pub fn chain(providers: &[Arc<StubProvider>]) -> Vec<Arc<dyn BookProvider>> {
    providers
        .iter()
        .map(|p| Arc::clone(p) as Arc<dyn BookProvider>)
        .collect()
}
