//! Core Types and Trait Definitions for libris-meta
//!
//! Defines the data carried through the resolution pipeline:
//! - **BookMetadata:** what a single provider returned for one lookup
//! - **ResolvedBook:** the composed (title, author, cover, genre) tuple
//! - **BookProvider:** the capability every bibliographic source implements
//!
//! # Pipeline
//! cache check → provider chain (priority order) → classification → field merge

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when no provider or stored record supplies one
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Author used when no provider or stored record supplies one
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

// ============================================================================
// Provider Output
// ============================================================================

/// Metadata returned by one provider for one lookup
///
/// Ephemeral: created per provider call and discarded after composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    /// Author names in provider order, as the provider spells them
    pub authors: Vec<String>,
    pub cover_url: Option<String>,
    /// Free-text subject tags (classification input)
    pub subjects: Vec<String>,
    pub description: Option<String>,
}

impl BookMetadata {
    /// True when the provider supplied no field at all
    ///
    /// Providers report such a reply as [`ProviderError::NotFound`].
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_empty()
            && self.cover_url.is_none()
            && self.subjects.is_empty()
            && self.description.is_none()
    }
}

// ============================================================================
// Pipeline Output
// ============================================================================

/// Final resolution tuple handed to the calling layer
///
/// `title` and `author` are never empty (sentinels fill the gaps);
/// `cover_url` and `genre` are `None` rather than sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedBook {
    pub title: String,
    /// Comma-joined, normalized author names
    pub author: String,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
}

impl ResolvedBook {
    /// Terminal result when nothing was found anywhere
    pub fn unknown() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            cover_url: None,
            genre: None,
        }
    }

    /// True when the title is the sentinel value
    pub fn has_unknown_title(&self) -> bool {
        self.title == UNKNOWN_TITLE
    }

    /// True when the author is the sentinel value
    pub fn has_unknown_author(&self) -> bool {
        self.author == UNKNOWN_AUTHOR
    }
}

/// Where a resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum ResolutionSource {
    /// Local store hit, no network call made
    Cache,
    /// First provider in priority order that returned metadata
    Provider(&'static str),
    /// Cache miss and every provider came back empty
    Unresolved,
}

/// Outcome of one `resolve` call
#[derive(Debug)]
pub struct Resolution {
    pub book: ResolvedBook,
    pub source: ResolutionSource,
    /// Set when the cache read failed; the provider chain still ran
    pub store_error: Option<StoreError>,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// A bibliographic data source queried by ISBN
///
/// Implementations translate their provider-specific response into
/// [`BookMetadata`]. A structured miss is [`ProviderError::NotFound`]; every
/// other variant is a transport or payload failure. The orchestrator treats
/// both as "try the next provider".
///
/// # Example
/// ```rust,ignore
/// use libris_meta::types::{BookMetadata, BookProvider, ProviderError};
///
/// pub struct StaticProvider;
///
/// #[async_trait::async_trait]
/// impl BookProvider for StaticProvider {
///     fn name(&self) -> &'static str { "static" }
///
///     async fn lookup(&self, isbn: &str) -> Result<BookMetadata, ProviderError> {
///         Err(ProviderError::NotFound(isbn.to_string()))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait BookProvider: Send + Sync {
    /// Provider name for logging and provenance
    fn name(&self) -> &'static str;

    /// Look up one ISBN
    async fn lookup(&self, isbn: &str) -> Result<BookMetadata, ProviderError>;

    /// Look up one ISBN, collapsing every failure to "not found"
    async fn lookup_optional(&self, isbn: &str) -> Option<BookMetadata> {
        self.lookup(isbn).await.ok()
    }
}

/// Provider lookup failure
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream has no record for the key
    #[error("No record for {0}")]
    NotFound(String),

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
}

impl ProviderError {
    /// True for a structured miss, false for transport/parse failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }

    /// Classify a reqwest transport error
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Local store read failure
#[derive(Debug, Error)]
#[error("Store unavailable: {0}")]
pub struct StoreError(pub libris_common::Error);
