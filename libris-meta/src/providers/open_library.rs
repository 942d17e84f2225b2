//! Open Library books API client
//!
//! Primary provider. Queried by ISBN through the `bibkeys` endpoint with
//! `jscmd=data`; the reply is an object keyed by `ISBN:{isbn}` that is empty
//! when the catalog has no record.

use super::{build_http_client, clean_list, first_non_blank, lenient, lenient_list};
use crate::config::PipelineConfig;
use crate::types::{BookMetadata, BookProvider, ProviderError};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// One book record from the `jscmd=data` reply
///
/// Fields of an unexpected shape read as absent; the rest of the record
/// still counts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OLRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub authors: Vec<OLNamed>,
    #[serde(default, deserialize_with = "lenient")]
    pub cover: Option<OLCover>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub subjects: Vec<OLNamed>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<OLDescription>,
}

/// Author or subject entry (`{"name": ...}`, occasionally a bare string)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OLNamed {
    Object {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
    },
    Plain(String),
}

impl OLNamed {
    fn name(&self) -> Option<&str> {
        match self {
            OLNamed::Object { name } => name.as_deref(),
            OLNamed::Plain(name) => Some(name),
        }
    }
}

/// Cover image URLs by size
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OLCover {
    #[serde(default, deserialize_with = "lenient")]
    pub small: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub medium: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub large: Option<String>,
}

impl OLCover {
    /// Preferred size: medium, then large, then small
    pub fn preferred(&self) -> Option<String> {
        first_non_blank([
            self.medium.as_deref(),
            self.large.as_deref(),
            self.small.as_deref(),
        ])
    }
}

/// Description as a plain string or a typed text object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OLDescription {
    Text(String),
    Typed { value: String },
}

impl OLDescription {
    pub fn text(&self) -> &str {
        match self {
            OLDescription::Text(text) => text,
            OLDescription::Typed { value } => value,
        }
    }
}

impl From<OLRecord> for BookMetadata {
    fn from(record: OLRecord) -> Self {
        BookMetadata {
            title: first_non_blank([record.title.as_deref()]),
            authors: clean_list(record.authors.iter().filter_map(OLNamed::name)),
            cover_url: record.cover.as_ref().and_then(OLCover::preferred),
            subjects: clean_list(record.subjects.iter().filter_map(OLNamed::name)),
            description: first_non_blank([record.description.as_ref().map(OLDescription::text)]),
        }
    }
}

/// Open Library API client
pub struct OpenLibraryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ProviderError> {
        Ok(Self::with_client(
            build_http_client(config)?,
            &config.open_library_url,
        ))
    }

    /// Share an existing HTTP client (connection pool and timeout)
    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the raw record for an ISBN
    pub async fn fetch_record(&self, isbn: &str) -> Result<OLRecord, ProviderError> {
        let bibkey = format!("ISBN:{}", isbn);

        tracing::debug!(isbn = %isbn, url = %self.base_url, "Querying Open Library");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("bibkeys", bibkey.as_str()),
                ("format", "json"),
                ("jscmd", "data"),
            ])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();

        if status == 404 {
            return Err(ProviderError::NotFound(bibkey));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let mut records: HashMap<String, OLRecord> = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        records
            .remove(&bibkey)
            .ok_or(ProviderError::NotFound(bibkey))
    }
}

#[async_trait]
impl BookProvider for OpenLibraryClient {
    fn name(&self) -> &'static str {
        "open_library"
    }

    async fn lookup(&self, isbn: &str) -> Result<BookMetadata, ProviderError> {
        let record = self.fetch_record(isbn).await?;
        let metadata = BookMetadata::from(record);

        if metadata.is_empty() {
            return Err(ProviderError::NotFound(format!("ISBN:{}", isbn)));
        }

        tracing::debug!(
            isbn = %isbn,
            title = ?metadata.title,
            subjects = metadata.subjects.len(),
            "Open Library record found"
        );

        Ok(metadata)
    }
}
