//! Bibliographic Provider Clients
//!
//! Independent adapters, one per external source. Each implements
//! [`BookProvider`](crate::types::BookProvider) and translates its upstream
//! response into [`BookMetadata`](crate::types::BookMetadata).
//!
//! # Providers (priority order)
//! 1. **open_library** - ISBN lookup with rich subject data
//! 2. **google_books** - ISBN lookup with coarse categories, plus the
//!    title/author cover search
//!
//! Every request carries the configured hard timeout. Failures never leave
//! the client as panics; they surface as [`ProviderError`] and the
//! orchestrator moves on to the next provider.

pub mod google_books;
pub mod open_library;

pub use google_books::GoogleBooksClient;
pub use open_library::OpenLibraryClient;

use crate::config::PipelineConfig;
use crate::types::ProviderError;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Build the HTTP client shared by the provider adapters
pub fn build_http_client(config: &PipelineConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

/// First non-blank string, trimmed
pub(crate) fn first_non_blank<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trim and drop blank entries
pub(crate) fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Field deserializer that maps `null` or an unexpected shape to the default
///
/// Upstream records vary field by field; one odd field must not discard the
/// rest of the record.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// List deserializer keeping the entries that parse
///
/// Anything other than an array yields an empty list.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}
