//! One row from the settlement reference feed.

use crate::normalize::{normalize_volume, reference_rate};

/// Settlement data for one offering, keyed by the record key extracted
/// from the feed's composite offer code. The feed reports audited
/// post-settlement figures, so these win over scraped values.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRow {
    pub key: u32,
    /// Composite code the key was extracted from (kept for diagnostics).
    pub offer_code: String,
    /// Settled volume as published.
    pub settled_volume: String,
    /// Index vocabulary of the publisher (DI, IPCA, Prefixado, ...).
    pub index_label: String,
    /// Spread over the index, percent.
    pub spread: Option<f64>,
    pub settlement_date: String,
    pub maturity_date: String,
}

impl ReferenceRow {
    /// Final rate in the canonical rendering, empty when the index is
    /// unmapped or unidentified.
    pub fn formatted_rate(&self) -> String {
        reference_rate(&self.index_label, self.spread)
    }

    /// Settled volume in the canonical rendering.
    pub fn formatted_volume(&self) -> String {
        normalize_volume(&self.settled_volume)
    }
}
