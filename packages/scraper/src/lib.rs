#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page fetching for the Clayton meeting scraper.
//!
//! Provides the [`Fetcher`] trait the spider crawls through, a [`Page`]
//! wrapper pairing a response body with the URL it was served from, and the
//! reqwest-backed [`HttpFetcher`] whose requests go through the
//! [`retry`] helpers.

pub mod retry;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use scraper::Html;

use crate::retry::RetryPolicy;

/// User agent sent with every request.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; clayton-meetings/0.1; +https://www.claytonmo.gov)";

/// Per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors that can occur while fetching pages.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Numeric HTTP status code.
        status: u16,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Parse(String),
}

/// A fetched HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    url: Url,
    body: String,
}

impl Page {
    /// Creates a page from a URL string and its body.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if `url` is not an absolute URL.
    pub fn new(url: &str, body: impl Into<String>) -> Result<Self, ScrapeError> {
        let url = Url::parse(url).map_err(|e| ScrapeError::Parse(format!("{url}: {e}")))?;
        Ok(Self::from_parts(url, body.into()))
    }

    /// Creates a page from an already-parsed URL.
    #[must_use]
    pub const fn from_parts(url: Url, body: String) -> Self {
        Self { url, body }
    }

    /// Loads a saved HTML file as if it had been served from `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the file cannot be read or `url` is invalid.
    pub fn from_file(path: &Path, url: &str) -> Result<Self, ScrapeError> {
        let body = std::fs::read_to_string(path)?;
        Self::new(url, body)
    }

    /// The URL the page was served from (after redirects).
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// The raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as an HTML document.
    ///
    /// The returned [`Html`] is not `Send`; drop it before the next `.await`.
    #[must_use]
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Resolves `href` against the page URL.
    ///
    /// Returns `None` if the href cannot be resolved.
    #[must_use]
    pub fn urljoin(&self, href: &str) -> Option<String> {
        self.url.join(href.trim()).ok().map(String::from)
    }
}

/// Something that can fetch a page by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the request fails or the server answers
    /// with a non-success status.
    async fn fetch(&self, url: &str) -> Result<Page, ScrapeError>;
}

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    /// Builds a fetcher with the default user agent, timeout and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            policy: RetryPolicy::default(),
        })
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| ScrapeError::Parse(format!("{url}: {e}")))?;
        log::debug!("GET {parsed}");
        let (final_url, body) =
            retry::send_text(|| self.client.get(parsed.clone()), &self.policy).await?;
        Ok(Page::from_parts(final_url, body))
    }
}
