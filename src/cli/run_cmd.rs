//! Batch refresh command.

use std::path::PathBuf;

use console::style;

use crate::config::Settings;
use crate::pipeline::{self, RunOptions};

pub async fn cmd_run(
    settings: &Settings,
    limit: Option<usize>,
    no_scrape: bool,
    reference: Option<PathBuf>,
) -> anyhow::Result<()> {
    let options = RunOptions {
        scrape: !no_scrape,
        limit,
        reference_path: reference,
    };

    let summary = pipeline::run(settings, &options).await?;

    println!();
    println!("{}", style("Run Summary").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "New:", summary.new_records);
    println!("{:<20} {}", "Updated:", summary.updated_records);
    println!("{:<20} {}", "Closed:", summary.closed_records);
    println!("{:<20} {}", "Processed:", summary.processed);
    if !no_scrape {
        println!("{:<20} {}", "Pages read:", summary.scraped_ok);
        if summary.scraped_failed > 0 {
            println!(
                "{:<20} {}",
                "Pages failed:",
                style(summary.scraped_failed).yellow()
            );
        }
    }
    println!(
        "{:<20} {} ({} in pipeline, {} closed)",
        "Table rows:",
        summary.table_rows,
        summary.pipeline_rows,
        summary.closed_rows
    );
    if summary.interrupted {
        println!(
            "{} Interrupted: remaining records stay queued for the next run",
            style("!").yellow()
        );
    }
    println!(
        "  {} Table saved to {}",
        style("✓").green(),
        settings.table_path().display()
    );

    Ok(())
}
