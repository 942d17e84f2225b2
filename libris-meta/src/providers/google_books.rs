//! Google Books volumes API client
//!
//! Secondary provider. Queried by `isbn:{isbn}` for ISBN lookups and by
//! `intitle:{title} inauthor:{author}` for the cover search. Categories are
//! coarser than Open Library subjects but feed the classifier the same way.

use super::{build_http_client, clean_list, first_non_blank, lenient, lenient_list};
use crate::config::PipelineConfig;
use crate::types::{BookMetadata, BookProvider, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;

/// Volumes search reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GBVolumes {
    #[serde(default, deserialize_with = "lenient_list")]
    pub items: Vec<GBVolume>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GBVolume {
    #[serde(rename = "volumeInfo", default, deserialize_with = "lenient")]
    pub volume_info: GBVolumeInfo,
}

/// Fields of an unexpected shape read as absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GBVolumeInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub authors: Vec<String>,
    #[serde(rename = "imageLinks", default, deserialize_with = "lenient")]
    pub image_links: Option<GBImageLinks>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GBImageLinks {
    #[serde(default, deserialize_with = "lenient")]
    pub thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail", default, deserialize_with = "lenient")]
    pub small_thumbnail: Option<String>,
}

impl GBImageLinks {
    /// Preferred image: thumbnail, then small thumbnail
    pub fn preferred(&self) -> Option<String> {
        first_non_blank([self.thumbnail.as_deref(), self.small_thumbnail.as_deref()])
    }
}

impl GBVolumeInfo {
    fn cover_url(&self) -> Option<String> {
        self.image_links.as_ref().and_then(GBImageLinks::preferred)
    }
}

impl From<GBVolumeInfo> for BookMetadata {
    fn from(info: GBVolumeInfo) -> Self {
        BookMetadata {
            title: first_non_blank([info.title.as_deref()]),
            cover_url: info.cover_url(),
            authors: clean_list(&info.authors),
            subjects: clean_list(&info.categories),
            description: first_non_blank([info.description.as_deref()]),
        }
    }
}

/// Build the free-text query for a title/author cover search
pub fn cover_query(title: &str, author: Option<&str>) -> String {
    let mut query = format!("intitle:{}", title.trim());
    if let Some(author) = author.map(str::trim).filter(|a| !a.is_empty()) {
        query.push_str(" inauthor:");
        query.push_str(author);
    }
    query
}

/// Google Books API client
pub struct GoogleBooksClient {
    http_client: reqwest::Client,
    base_url: String,
    max_results: u32,
}

impl GoogleBooksClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_client(
            build_http_client(config)?,
            &config.google_books_url,
            config.cover_search_max_results,
        ))
    }

    /// Share an existing HTTP client (connection pool and timeout)
    pub fn with_client(http_client: reqwest::Client, base_url: &str, max_results: u32) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
            max_results,
        }
    }

    /// Run a volumes query
    pub async fn search(
        &self,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<GBVolumes, ProviderError> {
        tracing::debug!(query = %query, url = %self.base_url, "Querying Google Books");

        let mut request = self.http_client.get(&self.base_url).query(&[("q", query)]);
        if let Some(max_results) = max_results {
            request = request.query(&[("maxResults", max_results)]);
        }

        let response = request.send().await.map_err(ProviderError::from_transport)?;

        let status = response.status();

        if status == 404 {
            return Err(ProviderError::NotFound(query.to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }

    /// Cover image for a title and optional author
    ///
    /// Returns the first image found across up to `max_results` candidates.
    pub async fn search_cover(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<Option<String>, ProviderError> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        let query = cover_query(title, author);
        let volumes = self.search(&query, Some(self.max_results)).await?;

        let cover = volumes
            .items
            .iter()
            .take(self.max_results as usize)
            .find_map(|item| item.volume_info.cover_url());

        tracing::debug!(query = %query, found = cover.is_some(), "Cover search finished");
        Ok(cover)
    }
}

#[async_trait]
impl BookProvider for GoogleBooksClient {
    fn name(&self) -> &'static str {
        "google_books"
    }

    async fn lookup(&self, isbn: &str) -> Result<BookMetadata, ProviderError> {
        let query = format!("isbn:{}", isbn);
        let volumes = self.search(&query, None).await?;

        let metadata = volumes
            .items
            .into_iter()
            .next()
            .map(|item| BookMetadata::from(item.volume_info))
            .filter(|metadata| !metadata.is_empty())
            .ok_or(ProviderError::NotFound(query))?;

        tracing::debug!(
            isbn = %isbn,
            title = ?metadata.title,
            categories = metadata.subjects.len(),
            "Google Books volume found"
        );

        Ok(metadata)
    }
}
