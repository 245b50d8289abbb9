//! Merging the three inputs into canonical table rows.
//!
//! Each record starts as a projection of its bulk-feed row. The
//! settlement reference feed then fills the final rate and volume, and a
//! scrape of the detail page fills whatever is still open. Precedence is
//! fixed: audited reference figures beat scraped ones, and scraped ones
//! beat the bookbuilding fallback. A page with several series fans the
//! record out into one row per series.

pub mod issuer;
pub mod tables;

pub use issuer::resolve_issuer;
pub use tables::{
    abbreviate_coordinator, is_closed_status, is_ignored_status, is_pipeline_status,
    map_target_public, normalize_status, simplify_product,
};

use crate::models::{BulkRow, CanonicalRow, ExtractionResult, ReferenceRow};
use crate::normalize::{normalize_date, normalize_volume, term_years, truncate_chars};

/// Feed flags come as a literal `S`; anything else reads as no.
fn flag(value: &str) -> String {
    if value == "S" { "S" } else { "N" }.to_string()
}

/// Project a bulk record onto a canonical row. Columns owned by the
/// reference feed, the scraper, or manual upkeep start empty.
pub fn base_row(bulk: &BulkRow) -> CanonicalRow {
    CanonicalRow {
        request_date: normalize_date(&bulk.request_date),
        registration_date: normalize_date(&bulk.registration_date),
        status: bulk.status.clone(),
        key: bulk.key,
        target_public: map_target_public(&bulk.target_public),
        product: bulk.product.clone(),
        issuer: resolve_issuer(bulk, &bulk.product),
        coordinators: abbreviate_coordinator(&bulk.lead_coordinator),
        issuance_number: bulk.issuance_number.clone(),
        initial_volume: normalize_volume(&bulk.requested_volume),
        incentive_12431: flag(&bulk.incentivized),
        offer_type: bulk.offer_type.clone(),
        distribution_regime: bulk.distribution_regime.clone(),
        bookbuilding: bulk.bookbuilding.clone(),
        initial_offer: flag(&bulk.initial_offer),
        communicating_vessels: flag(&bulk.communicating_vessels),
        sustainable: flag(&bulk.sustainable),
        backing_type: bulk.backing_type.clone(),
        fiduciary_regime: flag(&bulk.fiduciary_regime),
        guarantees: truncate_chars(&bulk.guarantees, 500).to_string(),
        backing: truncate_chars(&bulk.backing, 500).to_string(),
        proceeds_destination: truncate_chars(&bulk.proceeds_destination, 500).to_string(),
        fiduciary_agent: bulk.fiduciary_agent.clone(),
        ..Default::default()
    }
}

/// Build the table rows for one record.
///
/// Without an extraction the bulk projection (plus any reference data)
/// stands alone. A failed extraction still marks the rating `TBD` so the
/// gap is visible. With series data the record fans out into one row per
/// series, all sharing the page-level fields.
pub fn reconcile(
    bulk: &BulkRow,
    reference: Option<&ReferenceRow>,
    extraction: Option<&ExtractionResult>,
) -> Vec<CanonicalRow> {
    let mut base = base_row(bulk);

    if let Some(reference) = reference {
        let rate = reference.formatted_rate();
        if !rate.is_empty() {
            base.final_rate = rate;
        }
        let volume = reference.formatted_volume();
        if !volume.is_empty() {
            base.final_volume = volume;
        }
    }
    let reference_rate_set = !base.final_rate.is_empty();
    let reference_volume_set = !base.final_volume.is_empty();

    let Some(extraction) = extraction else {
        return vec![base];
    };

    if extraction.series.is_empty() {
        base.rating = extraction.rating.render();
        base.incentive_14801 = extraction.incentive_14801.clone();
        if !reference_rate_set && bulk.skips_bookbuilding() {
            base.final_volume = base.initial_volume.clone();
        }
        return vec![base];
    }

    let mut rows = Vec::with_capacity(extraction.series.len());
    for entry in &extraction.series {
        let mut row = base.clone();
        row.series = entry.number.clone();
        row.species = entry.species.clone();
        row.rating = extraction.rating.render();
        row.incentive_14801 = extraction.incentive_14801.clone();

        if reference_volume_set {
            // Audited settlement figure, keep it.
        } else if bulk.skips_bookbuilding() {
            row.final_volume = base.initial_volume.clone();
        } else if !entry.settled_volume.is_empty() {
            row.final_volume = entry.settled_volume.clone();
        }

        row.issuance_date = entry.issuance_date.clone();
        row.maturity_date = entry.maturity_date.clone();
        row.ceiling_rate = entry.ceiling_rate.clone();
        if !reference_rate_set {
            row.final_rate = entry.final_rate.clone();
        }

        if !row.issuance_date.is_empty() && !row.maturity_date.is_empty() {
            row.term = term_years(&row.issuance_date, &row.maturity_date);
        }

        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RatingOutcome, SeriesEntry};

    fn sample_bulk() -> BulkRow {
        BulkRow {
            key: 23267,
            issuer_name: "SECURITIZADORA ALFA S.A.".to_string(),
            product: "CRI".to_string(),
            requested_volume: "150000000.00".to_string(),
            lead_coordinator: "BANCO ITAÚ BBA S.A.".to_string(),
            request_date: "2025-03-10 00:00:00".to_string(),
            registration_date: "2025-04-01".to_string(),
            status: "Registro Concedido".to_string(),
            incentivized: "S".to_string(),
            debtors: "Devedora: FAZENDA SANTA FÉ LTDA, inscrita no CNPJ sob nº 12.345.678/0001-90"
                .to_string(),
            bookbuilding: "S".to_string(),
            target_public: "Investidores Profissionais".to_string(),
            issuance_number: "3".to_string(),
            offer_type: "Registro Automático".to_string(),
            distribution_regime: "Melhores Esforços".to_string(),
            initial_offer: "N".to_string(),
            communicating_vessels: "N".to_string(),
            sustainable: "S".to_string(),
            backing_type: "Imobiliário".to_string(),
            fiduciary_regime: "S".to_string(),
            guarantees: "Alienação fiduciária de imóveis".to_string(),
            backing: "Créditos imobiliários".to_string(),
            proceeds_destination: "Reembolso de despesas".to_string(),
            fiduciary_agent: "OLIVEIRA TRUST".to_string(),
        }
    }

    fn sample_entry() -> SeriesEntry {
        SeriesEntry {
            number: "1".to_string(),
            species: "Quirografária".to_string(),
            settled_volume: "120.000.000".to_string(),
            issuance_date: "15/04/2025".to_string(),
            maturity_date: "15/04/2030".to_string(),
            ceiling_rate: "CDI + 2,50%".to_string(),
            final_rate: "CDI + 1,80%".to_string(),
        }
    }

    fn sample_extraction(series: Vec<SeriesEntry>) -> ExtractionResult {
        ExtractionResult {
            key: 23267,
            fetched: true,
            attempts: 1,
            series,
            rating: RatingOutcome::Rated("AAA(bra)".to_string()),
            incentive_14801: "S".to_string(),
        }
    }

    #[test]
    fn test_base_row_maps_feed_columns() {
        let row = base_row(&sample_bulk());
        assert_eq!(row.request_date, "10/03/2025");
        assert_eq!(row.registration_date, "01/04/2025");
        assert_eq!(row.status, "Registro Concedido");
        assert_eq!(row.key, 23267);
        assert_eq!(row.target_public, "Profissional");
        assert_eq!(row.product, "CRI");
        assert_eq!(row.issuer, "Fazenda Santa Fé LTDA");
        assert_eq!(row.coordinators, "BBA");
        assert_eq!(row.initial_volume, "150.000.000");
        assert_eq!(row.incentive_12431, "S");
        assert_eq!(row.initial_offer, "N");
        assert_eq!(row.sustainable, "S");
        assert_eq!(row.fiduciary_regime, "S");
        assert_eq!(row.fiduciary_agent, "OLIVEIRA TRUST");
        // Columns owned by later stages start empty.
        assert_eq!(row.series, "");
        assert_eq!(row.rating, "");
        assert_eq!(row.final_volume, "");
        assert_eq!(row.term, "");
        assert_eq!(row.book_date, "");
        assert_eq!(row.sale, "");
    }

    #[test]
    fn test_no_extraction_single_row() {
        let rows = reconcile(&sample_bulk(), None, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, "");
        assert_eq!(rows[0].final_volume, "");
        assert_eq!(rows[0].final_rate, "");
    }

    #[test]
    fn test_reference_beats_scraped_values() {
        let reference = ReferenceRow {
            key: 23267,
            index_label: "DI".to_string(),
            spread: Some(1.2),
            settled_volume: "130.000.000,00".to_string(),
            ..Default::default()
        };
        let extraction = sample_extraction(vec![sample_entry()]);
        let rows = reconcile(&sample_bulk(), Some(&reference), Some(&extraction));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].final_rate, "CDI + 1,20%");
        assert_eq!(rows[0].final_volume, "130.000.000");
        // Page-only fields still come from the scrape.
        assert_eq!(rows[0].ceiling_rate, "CDI + 2,50%");
        assert_eq!(rows[0].issuance_date, "15/04/2025");
        assert_eq!(rows[0].rating, "AAA(bra)");
    }

    #[test]
    fn test_scraped_values_fill_without_reference() {
        let extraction = sample_extraction(vec![sample_entry()]);
        let rows = reconcile(&sample_bulk(), None, Some(&extraction));
        assert_eq!(rows[0].final_rate, "CDI + 1,80%");
        assert_eq!(rows[0].final_volume, "120.000.000");
        assert_eq!(rows[0].incentive_14801, "S");
    }

    #[test]
    fn test_no_bookbuilding_settles_at_requested_volume() {
        let mut bulk = sample_bulk();
        bulk.bookbuilding = "N".to_string();
        let mut entry = sample_entry();
        entry.settled_volume = String::new();
        let extraction = sample_extraction(vec![entry]);
        let rows = reconcile(&bulk, None, Some(&extraction));
        assert_eq!(rows[0].final_volume, "150.000.000");
    }

    #[test]
    fn test_failed_extraction_marks_rating_tbd() {
        let extraction = ExtractionResult::failed(23267, 3);
        let rows = reconcile(&sample_bulk(), None, Some(&extraction));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, "TBD");
        assert_eq!(rows[0].incentive_14801, "");
        assert_eq!(rows[0].series, "");
        assert_eq!(rows[0].final_volume, "");
    }

    #[test]
    fn test_failed_extraction_still_applies_bookbuilding_rule() {
        let mut bulk = sample_bulk();
        bulk.bookbuilding = "Sem bookbuilding".to_string();
        let extraction = ExtractionResult::failed(23267, 3);
        let rows = reconcile(&bulk, None, Some(&extraction));
        assert_eq!(rows[0].final_volume, "150.000.000");
    }

    #[test]
    fn test_multi_series_fan_out() {
        let mut second = sample_entry();
        second.number = "2".to_string();
        second.species = "Subordinada".to_string();
        second.final_rate = "IPCA + 7,00%".to_string();
        let extraction = sample_extraction(vec![sample_entry(), second]);
        let rows = reconcile(&sample_bulk(), None, Some(&extraction));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].series, "1");
        assert_eq!(rows[1].series, "2");
        assert_eq!(rows[1].species, "Subordinada");
        assert_eq!(rows[1].final_rate, "IPCA + 7,00%");
        // Shared page-level fields repeat on every row.
        assert_eq!(rows[0].rating, rows[1].rating);
        assert_eq!(rows[0].key, rows[1].key);
    }

    #[test]
    fn test_term_computed_from_scraped_dates() {
        let extraction = sample_extraction(vec![sample_entry()]);
        let rows = reconcile(&sample_bulk(), None, Some(&extraction));
        assert_eq!(rows[0].term, "5.00");
    }

    #[test]
    fn test_term_skipped_when_date_missing() {
        let mut entry = sample_entry();
        entry.maturity_date = String::new();
        let extraction = sample_extraction(vec![entry]);
        let rows = reconcile(&sample_bulk(), None, Some(&extraction));
        assert_eq!(rows[0].term, "");
    }
}
