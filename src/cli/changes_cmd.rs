//! Dry-run change detection.

use std::collections::HashMap;

use console::style;

use crate::changes;
use crate::config::Settings;
use crate::feeds::{load_bulk, load_table};
use crate::models::BulkRow;
use crate::normalize::truncate_chars;

pub async fn cmd_changes(settings: &Settings) -> anyhow::Result<()> {
    let bulk_rows = load_bulk(&settings.bulk_path())?;
    let table_rows = load_table(&settings.table_path())?;
    let change_set = changes::detect(&bulk_rows, &table_rows);

    if change_set.is_empty() {
        println!("{} Nothing to process", style("✓").green());
        return Ok(());
    }

    let mut by_key: HashMap<u32, &BulkRow> = HashMap::new();
    for row in &bulk_rows {
        by_key.entry(row.key).or_insert(row);
    }

    print_group("New", &change_set.new_keys, &by_key);
    print_group("Updated", &change_set.updated, &by_key);
    print_group("Closed", &change_set.closed, &by_key);

    println!();
    println!(
        "{} record(s) would be processed by a run",
        style(change_set.total()).bold()
    );

    Ok(())
}

fn print_group(label: &str, keys: &[u32], by_key: &HashMap<u32, &BulkRow>) {
    if keys.is_empty() {
        return;
    }
    println!();
    println!("{} ({})", style(label).bold(), keys.len());
    println!("{}", "-".repeat(60));
    for key in keys {
        match by_key.get(key) {
            Some(row) => println!(
                "  {:<8} {:<12} {:<30} {}",
                key,
                row.product,
                truncate_chars(&row.issuer_name, 30),
                row.status
            ),
            None => println!("  {}", key),
        }
    }
}
