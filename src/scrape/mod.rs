//! Detail-page scraping for offering records.
//!
//! The regulator serves detail pages as a client-rendered application: the
//! initial HTML is an empty shell that fills in asynchronously, and on bad
//! days it never fills in at all until a reload. Everything here therefore
//! operates on the rendered text of the page, never on raw HTML, and the
//! fetch loop keeps reloading until a readiness probe accepts the text.

pub mod browser;
pub mod detail;
pub mod extract;
pub mod fetcher;
pub mod readiness;

use async_trait::async_trait;
use thiserror::Error;

pub use browser::{BrowserOptions, BrowserSession};
pub use detail::DetailScraper;
pub use fetcher::{fetch_until_ready, FetchOutcome, RetryPolicy};
pub use readiness::is_ready;

/// Errors a page source can report.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("reload failed: {0}")]
    Reload(String),

    #[error("could not read page text: {0}")]
    PageText(String),
}

/// Anything that can open a detail page and hand back its rendered text.
///
/// The production implementation drives a Chrome instance over CDP; tests
/// substitute scripted sources that replay canned page text.
#[async_trait]
pub trait DetailPageSource: Send {
    /// Navigate to a URL, replacing whatever page is currently open.
    async fn navigate(&mut self, url: &str) -> Result<(), SourceError>;

    /// Reload the current page.
    async fn refresh(&mut self) -> Result<(), SourceError>;

    /// The page text as a user would see it rendered.
    async fn visible_text(&mut self) -> Result<String, SourceError>;
}
