//! Single-record scrape diagnostic.

use console::style;

use crate::config::Settings;
use crate::models::RatingOutcome;
use crate::scrape::{BrowserSession, DetailScraper};

/// Fetch one detail page and print everything the extractors see, without
/// touching the table.
pub async fn cmd_probe(settings: &Settings, key: u32) -> anyhow::Result<()> {
    let scraper = DetailScraper::new(settings.base_url.clone(), settings.retry_policy());
    println!("Fetching {}", scraper.page_url(key));

    let mut session = BrowserSession::start(&settings.browser).await?;
    let result = scraper.scrape(&mut session, key).await;

    if !result.fetched {
        println!(
            "{} Page never rendered after {} attempt(s)",
            style("✗").red(),
            result.attempts
        );
        return Ok(());
    }

    println!(
        "{} Page rendered after {} attempt(s)",
        style("✓").green(),
        result.attempts
    );
    println!();
    let rating = match &result.rating {
        RatingOutcome::Rated(code) => code.clone(),
        RatingOutcome::Pending => "pending (section present, no grade)".to_string(),
        RatingOutcome::NoSection => "no risk section".to_string(),
    };
    println!("{:<16} {}", "Rating:", rating);
    let incentive = if result.incentive_14801.is_empty() {
        "not stated"
    } else {
        result.incentive_14801.as_str()
    };
    println!("{:<16} {}", "Lei 14.801:", incentive);
    println!("{:<16} {}", "Series found:", result.series.len());

    for entry in &result.series {
        println!();
        println!("{}", style(format!("Série {}", entry.number)).bold());
        println!("{}", "-".repeat(40));
        print_field("Espécie:", &entry.species);
        print_field("Emissão:", &entry.issuance_date);
        print_field("Vencimento:", &entry.maturity_date);
        print_field("Taxa teto:", &entry.ceiling_rate);
        print_field("Taxa final:", &entry.final_rate);
        print_field("Volume:", &entry.settled_volume);
    }

    Ok(())
}

fn print_field(label: &str, value: &str) {
    let shown = if value.is_empty() { "-" } else { value };
    println!("{:<16} {}", label, shown);
}
