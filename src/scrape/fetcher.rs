//! Retry loop that drives a page source until the page renders.

use std::time::Duration;

use tracing::{debug, warn};

use super::{DetailPageSource, SourceError};

/// How long and how often to wait for a page to render.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts: one navigation plus reloads.
    pub max_attempts: u32,
    /// Settle time after the first navigation. The application shell takes
    /// noticeably longer on a cold load than on a reload.
    pub initial_wait: Duration,
    /// Settle time after each reload.
    pub retry_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_wait: Duration::from_secs(20),
            retry_wait: Duration::from_secs(15),
        }
    }
}

/// What the retry loop produced.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The readiness probe accepted the page text.
    Ready { text: String, attempts: u32 },
    /// Every attempt was exhausted without a ready page.
    Failed {
        attempts: u32,
        last_error: Option<SourceError>,
    },
}

impl FetchOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, FetchOutcome::Ready { .. })
    }
}

/// Load `url` and keep reloading until `ready` accepts the rendered text or
/// attempts run out. Source errors are logged and consume an attempt; the
/// loop carries on, since a flaky render often recovers on the next reload.
pub async fn fetch_until_ready<S, F>(
    source: &mut S,
    url: &str,
    policy: &RetryPolicy,
    ready: F,
) -> FetchOutcome
where
    S: DetailPageSource + ?Sized,
    F: Fn(&str) -> bool,
{
    let mut last_error = None;
    let mut navigated = false;

    for attempt in 1..=policy.max_attempts {
        debug!("Attempt {}/{} for {}", attempt, policy.max_attempts, url);

        // Reloading only makes sense once the page is actually open; after a
        // failed navigation the next attempt navigates again.
        let step = if navigated {
            source.refresh().await
        } else {
            source.navigate(url).await
        };
        match step {
            Ok(()) => navigated = true,
            Err(error) => {
                warn!("Page load error on attempt {}: {}", attempt, error);
                last_error = Some(error);
                continue;
            }
        }

        let wait = if attempt == 1 {
            policy.initial_wait
        } else {
            policy.retry_wait
        };
        tokio::time::sleep(wait).await;

        match source.visible_text().await {
            Ok(text) if ready(&text) => {
                return FetchOutcome::Ready { text, attempts: attempt };
            }
            Ok(_) => {
                debug!("Page not rendered yet on attempt {}", attempt);
            }
            Err(error) => {
                warn!("Could not read page on attempt {}: {}", attempt, error);
                last_error = Some(error);
            }
        }
    }

    FetchOutcome::Failed {
        attempts: policy.max_attempts,
        last_error,
    }
}
