//! Loader for the settlement reference feed (closed-offering export).
//!
//! Rows are keyed by a composite offer code; the record key hides in its
//! tail. The feed is optional: a missing or unreadable file just means no
//! reference data this run.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use csv::StringRecord;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::models::ReferenceRow;
use crate::normalize::parse_decimal;

use super::FeedError;

/// `SRE/2025/23267` shape.
static SRE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"SRE/\d{4}/(\d+)").unwrap());

/// Older `RJ-2016-07894` shape; the key is the final dash group.
static TRAILING_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-(\d+)$").unwrap());

/// Pull the record key out of a composite offer code.
pub fn extract_key(code: &str) -> Option<u32> {
    if let Some(caps) = SRE_CODE.captures(code) {
        return caps[1].parse().ok();
    }
    TRAILING_CODE
        .captures(code)
        .and_then(|caps| caps[1].parse().ok())
}

/// Read the reference feed into a key-indexed map. The first row seen for
/// a key wins; rows without a resolvable key are skipped and counted.
pub fn load_reference(path: &Path) -> HashMap<u32, ReferenceRow> {
    if !path.exists() {
        warn!("Reference feed not found: {}", path.display());
        return HashMap::new();
    }
    match read_rows(path) {
        Ok(map) => {
            info!("Reference feed: {} unique offerings", map.len());
            map
        }
        Err(err) => {
            warn!("Reference feed unreadable ({err}), continuing without it");
            HashMap::new()
        }
    }
}

fn read_rows(path: &Path) -> Result<HashMap<u32, ReferenceRow>, FeedError> {
    let bytes = fs::read(path)?;
    let decoded = String::from_utf8_lossy(&bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(decoded.as_bytes());

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), idx))
        .collect();
    let field = |record: &StringRecord, name: &str| -> String {
        columns
            .get(name)
            .and_then(|&idx| record.get(idx))
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let mut map = HashMap::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        let code = field(&record, "Código da oferta");
        let Some(key) = extract_key(&code) else {
            debug!("Reference row without resolvable key: {code:?}");
            skipped += 1;
            continue;
        };
        map.entry(key).or_insert_with(|| ReferenceRow {
            key,
            offer_code: code.clone(),
            settled_volume: field(&record, "Valor total encerrado da série"),
            index_label: field(&record, "Indexador"),
            spread: parse_decimal(&field(&record, "Spread")),
            settlement_date: field(&record, "Data de encerramento"),
            maturity_date: field(&record, "Data de vencimento"),
        });
    }
    if skipped > 0 {
        debug!("Reference feed: {skipped} rows without keys");
    }
    Ok(map)
}
