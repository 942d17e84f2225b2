//! Cover-by-title search
//!
//! Secondary lookup used when ISBN providers yielded no image but the caller
//! already knows the title and author. Not part of `resolve`; intake and the
//! cover backfill call it directly.

use crate::providers::GoogleBooksClient;
use crate::types::{UNKNOWN_AUTHOR, UNKNOWN_TITLE};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Finds a cover image from a title and optional author
#[async_trait]
pub trait CoverSearch: Send + Sync {
    /// First cover image found, or `None` (failures included)
    async fn find_cover(&self, title: &str, author: Option<&str>) -> Option<String>;
}

#[async_trait]
impl CoverSearch for GoogleBooksClient {
    async fn find_cover(&self, title: &str, author: Option<&str>) -> Option<String> {
        match self.search_cover(title, author).await {
            Ok(cover) => cover,
            Err(e) if e.is_not_found() => {
                debug!(title = %title, "Cover search found nothing");
                None
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Cover search failed");
                None
            }
        }
    }
}

/// Title/author pair usable for a cover search
///
/// Sentinel and blank values do not count as known.
pub fn searchable_pair<'a>(
    title: Option<&'a str>,
    author: Option<&'a str>,
) -> Option<(&'a str, &'a str)> {
    let title = title.map(str::trim).filter(|t| !t.is_empty() && *t != UNKNOWN_TITLE)?;
    let author = author.map(str::trim).filter(|a| !a.is_empty() && *a != UNKNOWN_AUTHOR)?;
    Some((title, author))
}
