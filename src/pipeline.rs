//! One refresh run end to end: read the feeds, diff against the stored
//! table, visit the changed detail pages, write the table back.
//!
//! The stored table is rebuilt by replacing only the rows whose keys were
//! actually processed this run. Rows left untouched keep their original
//! order and every hand-maintained column. Ctrl-C is honored between
//! records, and whatever was processed before the interrupt still lands
//! in the saved table.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::changes;
use crate::config::Settings;
use crate::feeds::{load_bulk, load_reference, load_table, save_table};
use crate::models::{BulkRow, CanonicalRow};
use crate::reconcile::{is_closed_status, is_pipeline_status, reconcile};
use crate::scrape::{BrowserSession, DetailPageSource, DetailScraper};

/// Knobs for a single refresh run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Start a browser and visit the detail page of every changed record.
    /// Off, the run still refreshes the feed-sourced columns.
    pub scrape: bool,
    /// Process at most this many changed records; the rest wait for the
    /// next run.
    pub limit: Option<usize>,
    /// Reference feed override. Unset falls back to the configured path.
    pub reference_path: Option<PathBuf>,
}

/// What a run did, for the caller to report.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Keys seen in the feed for the first time.
    pub new_records: usize,
    /// Keys whose status moved since the last run.
    pub updated_records: usize,
    /// Keys that reached a closed status this run.
    pub closed_records: usize,
    /// Records actually processed (the limit and interrupts cut this
    /// below the detected total).
    pub processed: usize,
    pub scraped_ok: usize,
    pub scraped_failed: usize,
    /// Rows in the saved table.
    pub table_rows: usize,
    /// Saved rows sitting in an in-flight status.
    pub pipeline_rows: usize,
    /// Saved rows in a closed status.
    pub closed_rows: usize,
    pub interrupted: bool,
}

/// Run a full refresh. Scraping starts a browser per the settings.
pub async fn run(settings: &Settings, options: &RunOptions) -> Result<RunSummary> {
    run_with_source(settings, options, None).await
}

/// Like [`run`], but an injected page source replaces the browser. With
/// `None` and scraping on, a browser session is started once changes are
/// known to exist.
pub async fn run_with_source(
    settings: &Settings,
    options: &RunOptions,
    source: Option<&mut dyn DetailPageSource>,
) -> Result<RunSummary> {
    settings.ensure_directories()?;

    let bulk_rows = load_bulk(&settings.bulk_path())?;
    let table_rows = load_table(&settings.table_path())?;
    let change_set = changes::detect(&bulk_rows, &table_rows);

    let mut summary = RunSummary {
        new_records: change_set.new_keys.len(),
        updated_records: change_set.updated.len(),
        closed_records: change_set.closed.len(),
        ..Default::default()
    };

    if change_set.is_empty() {
        info!("No changes since the last run");
        save_table(&settings.table_path(), &table_rows)?;
        fill_totals(&mut summary, &table_rows);
        return Ok(summary);
    }

    let queue = change_set.work_queue(options.limit);
    if queue.len() < change_set.total() {
        info!(
            "Processing {} of {} changed records this run",
            queue.len(),
            change_set.total()
        );
    }

    let reference = match options
        .reference_path
        .clone()
        .or_else(|| settings.reference_path())
    {
        Some(path) => load_reference(&path),
        None => HashMap::new(),
    };

    let mut by_key: HashMap<u32, &BulkRow> = HashMap::new();
    for row in &bulk_rows {
        by_key.entry(row.key).or_insert(row);
    }

    let mut session: Option<BrowserSession> = None;
    let mut page: Option<&mut dyn DetailPageSource> = source;
    if options.scrape && page.is_none() {
        session = Some(BrowserSession::start(&settings.browser).await?);
        page = session.as_mut().map(|s| s as &mut dyn DetailPageSource);
    }

    let scraper = DetailScraper::new(settings.base_url.clone(), settings.retry_policy());

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    let progress = page.is_some().then(|| {
        let pb = indicatif::ProgressBar::new(queue.len() as u64);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    });

    let mut replacements: HashMap<u32, Vec<CanonicalRow>> = HashMap::new();
    let mut processed: Vec<u32> = Vec::new();

    for &key in &queue {
        if interrupted.load(Ordering::SeqCst) {
            warn!(
                "Interrupted, saving the {} record(s) already processed",
                processed.len()
            );
            summary.interrupted = true;
            break;
        }

        let bulk = match by_key.get(&key) {
            Some(bulk) => *bulk,
            None => continue,
        };

        let extraction = match page.as_deref_mut() {
            Some(open_page) => {
                if let Some(pb) = &progress {
                    pb.set_message(key.to_string());
                }
                let result = scraper.scrape(open_page, key).await;
                if result.fetched {
                    summary.scraped_ok += 1;
                } else {
                    summary.scraped_failed += 1;
                }
                Some(result)
            }
            None => {
                debug!("Key {}: refreshing from feeds only", key);
                None
            }
        };

        let rows = reconcile(bulk, reference.get(&key), extraction.as_ref());
        replacements.insert(key, rows);
        processed.push(key);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress {
        if summary.interrupted {
            pb.abandon_with_message("interrupted");
        } else {
            pb.finish_with_message("done");
        }
    }

    summary.processed = processed.len();

    // Untouched rows survive in place; every processed key is replaced by
    // its freshly reconciled rows, appended in processing order.
    let processed_keys: HashSet<u32> = processed.iter().copied().collect();
    let mut next_rows: Vec<CanonicalRow> = table_rows
        .iter()
        .filter(|row| !processed_keys.contains(&row.key))
        .cloned()
        .collect();
    for key in &processed {
        if let Some(rows) = replacements.remove(key) {
            next_rows.extend(rows);
        }
    }

    save_table(&settings.table_path(), &next_rows)?;
    fill_totals(&mut summary, &next_rows);
    info!(
        "Table saved: {} rows, {} in pipeline, {} closed",
        summary.table_rows, summary.pipeline_rows, summary.closed_rows
    );

    Ok(summary)
}

fn fill_totals(summary: &mut RunSummary, rows: &[CanonicalRow]) {
    summary.table_rows = rows.len();
    summary.pipeline_rows = rows
        .iter()
        .filter(|row| is_pipeline_status(&row.status))
        .count();
    summary.closed_rows = rows
        .iter()
        .filter(|row| is_closed_status(&row.status))
        .count();
}

#[cfg(test)]
mod tests {
    use super::*;

    const BULK_HEADER: &str = "Numero_Requerimento;Valor_Mobiliario;Status_Requerimento;Nome_Emissor;Valor_Total_Registrado;Bookbuilding";

    fn write_bulk(settings: &Settings, lines: &[&str]) {
        let mut body = String::from(BULK_HEADER);
        for line in lines {
            body.push('\n');
            body.push_str(line);
        }
        body.push('\n');
        std::fs::write(settings.bulk_path(), body).unwrap();
    }

    #[tokio::test]
    async fn test_feed_only_run_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        write_bulk(
            &settings,
            &["501;Debêntures Simples;Concedido;ENERGIA LIMPA;150000000.00;N"],
        );

        let summary = run_with_source(&settings, &RunOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(summary.new_records, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.table_rows, 1);
        assert_eq!(summary.pipeline_rows, 1);
        assert_eq!(summary.closed_rows, 0);
        assert!(!summary.interrupted);

        let rows = load_table(&settings.table_path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, 501);
        assert_eq!(rows[0].status, "Registro Concedido");
        assert_eq!(rows[0].product, "Debêntures");
        assert_eq!(rows[0].issuer, "Energia Limpa");
        assert_eq!(rows[0].initial_volume, "150.000.000");
        // No page visit, so the settlement column stays open.
        assert_eq!(rows[0].final_volume, "");
    }

    #[tokio::test]
    async fn test_untouched_rows_keep_hand_edits() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        write_bulk(
            &settings,
            &[
                "501;Debêntures Simples;Concedido;ENERGIA LIMPA;150000000.00;N",
                "502;Debêntures Simples;Concedido;HIDRO FORTE;80000000.00;S",
            ],
        );

        let stored = vec![
            CanonicalRow {
                key: 502,
                status: "Registro Concedido".to_string(),
                notes: "ver prospecto".to_string(),
                book_date: "10/04/2025".to_string(),
                ..Default::default()
            },
            CanonicalRow {
                key: 501,
                status: "Aguardando Bookbuilding".to_string(),
                ..Default::default()
            },
        ];
        save_table(&settings.table_path(), &stored).unwrap();

        let summary = run_with_source(&settings, &RunOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(summary.new_records, 0);
        assert_eq!(summary.updated_records, 1);
        assert_eq!(summary.processed, 1);

        let rows = load_table(&settings.table_path()).unwrap();
        assert_eq!(rows.len(), 2);
        // 502 was untouched: same position, hand-maintained columns intact.
        assert_eq!(rows[0].key, 502);
        assert_eq!(rows[0].notes, "ver prospecto");
        assert_eq!(rows[0].book_date, "10/04/2025");
        // 501 was reprocessed and appended after the survivors.
        assert_eq!(rows[1].key, 501);
        assert_eq!(rows[1].status, "Registro Concedido");
        assert_eq!(rows[1].issuer, "Energia Limpa");
    }

    #[tokio::test]
    async fn test_limit_defers_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        write_bulk(
            &settings,
            &[
                "601;Debêntures Simples;Concedido;ALFA;10000000.00;N",
                "602;Debêntures Simples;Concedido;BETA;20000000.00;N",
                "603;Debêntures Simples;Concedido;GAMA;30000000.00;N",
            ],
        );

        let options = RunOptions {
            limit: Some(2),
            ..Default::default()
        };
        let summary = run_with_source(&settings, &options, None).await.unwrap();

        assert_eq!(summary.new_records, 3);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.table_rows, 2);

        let rows = load_table(&settings.table_path()).unwrap();
        let keys: Vec<u32> = rows.iter().map(|row| row.key).collect();
        assert_eq!(keys, vec![601, 602]);
    }

    #[tokio::test]
    async fn test_no_changes_still_rewrites_table() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path().to_path_buf());
        write_bulk(
            &settings,
            &["501;Debêntures Simples;Concedido;ENERGIA LIMPA;150000000.00;N"],
        );

        let stored = vec![CanonicalRow {
            key: 501,
            status: "Registro Concedido".to_string(),
            notes: "intacto".to_string(),
            ..Default::default()
        }];
        save_table(&settings.table_path(), &stored).unwrap();

        let summary = run_with_source(&settings, &RunOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(summary.new_records, 0);
        assert_eq!(summary.updated_records, 0);
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.table_rows, 1);

        let rows = load_table(&settings.table_path()).unwrap();
        assert_eq!(rows[0].notes, "intacto");
    }
}
