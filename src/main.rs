//! cvmtrack - CVM public-offering tracker.
//!
//! Keeps a curated spreadsheet of Resolução 160 public offerings current by
//! diffing the regulator's bulk feed, scraping offering detail pages, and
//! reconciling the results with a third-party reference feed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cvmtrack::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "cvmtrack=info"
    } else {
        "cvmtrack=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run().await
}
