//! Read contract between the pipeline and the book store
//!
//! The pipeline only reads. Writes belong to the calling layer and go
//! straight through `libris_common::db`.

use async_trait::async_trait;
use libris_common::db::{self, CacheRecord};
use sqlx::SqlitePool;

/// Cache lookup by ISBN
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn get_cached(&self, isbn: &str) -> libris_common::Result<Option<CacheRecord>>;
}

/// [`BookStore`] backed by the SQLite `books` table
#[derive(Clone)]
pub struct SqliteBookStore {
    pool: SqlitePool,
}

impl SqliteBookStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn get_cached(&self, isbn: &str) -> libris_common::Result<Option<CacheRecord>> {
        db::get_cached(&self.pool, isbn).await
    }
}
