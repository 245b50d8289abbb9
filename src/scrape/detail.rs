//! One-record scrape: load the detail page, wait it out, read it.

use tracing::{info, warn};

use crate::models::ExtractionResult;

use super::extract;
use super::fetcher::{fetch_until_ready, FetchOutcome, RetryPolicy};
use super::readiness::is_ready;
use super::DetailPageSource;

/// Scrapes detail pages for record keys against a configured portal URL.
pub struct DetailScraper {
    base_url: String,
    policy: RetryPolicy,
}

impl DetailScraper {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            policy,
        }
    }

    /// The detail-page URL for a record key.
    pub fn page_url(&self, key: u32) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, key)
        } else {
            format!("{}/{}", self.base_url, key)
        }
    }

    /// Fetch and read the page for `key`. Never fails: a page that won't
    /// render comes back as a failed result the reconciler knows how to
    /// handle.
    pub async fn scrape<S>(&self, source: &mut S, key: u32) -> ExtractionResult
    where
        S: DetailPageSource + ?Sized,
    {
        let url = self.page_url(key);

        match fetch_until_ready(source, &url, &self.policy, is_ready).await {
            FetchOutcome::Ready { text, attempts } => {
                let series = extract::page_entries(&text);
                let rating = extract::rating(&text);
                let incentive_14801 = extract::incentive_14801(&text);
                info!(
                    "Key {}: {} series, rating {}, {} attempt(s)",
                    key,
                    series.len(),
                    rating.as_str(),
                    attempts
                );
                ExtractionResult {
                    key,
                    fetched: true,
                    attempts,
                    series,
                    rating,
                    incentive_14801,
                }
            }
            FetchOutcome::Failed {
                attempts,
                last_error,
            } => {
                match last_error {
                    Some(error) => {
                        warn!("Key {}: page never rendered ({} attempts): {}", key, attempts, error)
                    }
                    None => warn!("Key {}: page never rendered ({} attempts)", key, attempts),
                }
                ExtractionResult::failed(key, attempts)
            }
        }
    }
}
