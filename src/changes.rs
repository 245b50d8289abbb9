//! Change detection between a fresh bulk feed and the stored table.
//!
//! Closed offerings are terminal: once the table records one, later feed
//! rows for that key are ignored. Everything else is compared by status,
//! so a record reappears in the work queue whenever the regulator moves
//! it along.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::models::{BulkRow, CanonicalRow};
use crate::reconcile::{is_closed_status, is_ignored_status};

/// Keys partitioned by what happened to them since the last run, each
/// group in feed order.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// In the feed, not in the table.
    pub new_keys: Vec<u32>,
    /// In the table with a different (non-closed) status.
    pub updated: Vec<u32>,
    /// Moved to a closed status.
    pub closed: Vec<u32>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.new_keys.is_empty() && self.updated.is_empty() && self.closed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.new_keys.len() + self.updated.len() + self.closed.len()
    }

    /// Keys to process this run: new first, then updated, then closed.
    /// The limit cuts across the concatenation.
    pub fn work_queue(&self, limit: Option<usize>) -> Vec<u32> {
        let mut queue = Vec::with_capacity(self.total());
        queue.extend_from_slice(&self.new_keys);
        queue.extend_from_slice(&self.updated);
        queue.extend_from_slice(&self.closed);
        if let Some(limit) = limit {
            queue.truncate(limit);
        }
        queue
    }
}

/// Compare the feed against the stored table.
///
/// Feed rows with an ignored status are dropped before partitioning.
/// Multi-series records collapse to one decision per key (every series
/// row carries the same status).
pub fn detect(bulk_rows: &[BulkRow], table_rows: &[CanonicalRow]) -> ChangeSet {
    let mut table_status: HashMap<u32, &str> = HashMap::new();
    for row in table_rows {
        table_status.entry(row.key).or_insert(row.status.as_str());
    }

    let mut changes = ChangeSet::default();
    let mut seen = HashSet::new();
    for row in bulk_rows {
        if is_ignored_status(&row.status) || !seen.insert(row.key) {
            continue;
        }
        match table_status.get(&row.key) {
            None => changes.new_keys.push(row.key),
            Some(stored) => {
                if is_closed_status(stored) {
                    continue;
                }
                if is_closed_status(&row.status) {
                    changes.closed.push(row.key);
                } else if row.status != *stored {
                    changes.updated.push(row.key);
                }
            }
        }
    }

    info!(
        "Changes: {} new, {} updated, {} closed",
        changes.new_keys.len(),
        changes.updated.len(),
        changes.closed.len()
    );
    changes
}
