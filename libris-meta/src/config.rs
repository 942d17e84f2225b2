//! Pipeline configuration
//!
//! Built once from the bootstrap [`ProviderSettings`] and handed to the
//! orchestrator and every provider client at construction. Nothing in the
//! pipeline reads process-wide configuration.

use libris_common::config::ProviderSettings;
use libris_common::{Error, Result};
use std::time::Duration;
use tracing::warn;

/// Upper bound on the per-request timeout
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the resolution pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Hard timeout applied to every provider request
    pub request_timeout: Duration,
    pub open_library_url: String,
    pub google_books_url: String,
    pub user_agent: String,
    /// Candidates inspected by the title/author cover search
    pub cover_search_max_results: u32,
    /// Poll all providers at once (priority order still decides the winner)
    pub concurrent_lookup: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let settings = ProviderSettings::default();
        let request_timeout =
            Duration::from_secs(settings.request_timeout_secs.max(1)).min(MAX_REQUEST_TIMEOUT);
        Self::normalized(&settings, request_timeout)
    }
}

impl PipelineConfig {
    /// Validate provider settings and convert them to pipeline configuration
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        if settings.request_timeout_secs == 0 {
            return Err(Error::Config(
                "providers.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        let mut request_timeout = Duration::from_secs(settings.request_timeout_secs);
        if request_timeout > MAX_REQUEST_TIMEOUT {
            warn!(
                "providers.request_timeout_secs = {} exceeds {}s, clamping",
                settings.request_timeout_secs,
                MAX_REQUEST_TIMEOUT.as_secs()
            );
            request_timeout = MAX_REQUEST_TIMEOUT;
        }

        if !is_valid_url(&settings.open_library_url) {
            return Err(Error::Config(format!(
                "providers.open_library_url is not an http(s) URL: {}",
                settings.open_library_url
            )));
        }
        if !is_valid_url(&settings.google_books_url) {
            return Err(Error::Config(format!(
                "providers.google_books_url is not an http(s) URL: {}",
                settings.google_books_url
            )));
        }

        Ok(Self::normalized(settings, request_timeout))
    }

    /// Shared by `from_settings` and `Default`: trims URLs, clamps result count
    fn normalized(settings: &ProviderSettings, request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            open_library_url: settings.open_library_url.trim().trim_end_matches('/').to_string(),
            google_books_url: settings.google_books_url.trim().trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            cover_search_max_results: settings.cover_search_max_results.clamp(1, 40),
            concurrent_lookup: settings.concurrent_lookup,
        }
    }

    /// Point both providers at another base URL (local stub servers in tests)
    pub fn with_base_urls(
        mut self,
        open_library_url: impl Into<String>,
        google_books_url: impl Into<String>,
    ) -> Self {
        self.open_library_url = open_library_url.into();
        self.google_books_url = google_books_url.into();
        self
    }
}

fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}
