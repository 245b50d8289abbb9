//! One record from the regulator's bulk registry feed.

/// A bulk-feed record after key parsing and product simplification.
/// String fields hold the feed's raw text; formatting happens in the
/// reconciler so the loader stays a dumb reader.
#[derive(Debug, Clone, Default)]
pub struct BulkRow {
    /// Requirement number, the record key.
    pub key: u32,
    /// Nominal issuer name.
    pub issuer_name: String,
    /// Simplified product label (Debêntures, CRI, CRA, ...).
    pub product: String,
    /// Requested volume as registered.
    pub requested_volume: String,
    /// Lead coordinator name.
    pub lead_coordinator: String,
    pub request_date: String,
    pub registration_date: String,
    /// Offer status, already normalized to the canonical vocabulary.
    pub status: String,
    /// Tax-incentive flag (law 12.431), "S"/"N" in the feed.
    pub incentivized: String,
    /// Debtor/obligor description, used for securitization issuers.
    pub debtors: String,
    pub bookbuilding: String,
    pub target_public: String,
    pub issuance_number: String,
    pub offer_type: String,
    pub distribution_regime: String,
    /// First public offer flag (IPO).
    pub initial_offer: String,
    pub communicating_vessels: String,
    pub sustainable: String,
    pub backing_type: String,
    pub fiduciary_regime: String,
    pub guarantees: String,
    pub backing: String,
    pub proceeds_destination: String,
    pub fiduciary_agent: String,
}

impl BulkRow {
    /// Offers sold without a bookbuilding round settle at the requested
    /// volume; the feed spells the absence three different ways.
    pub fn skips_bookbuilding(&self) -> bool {
        matches!(self.bookbuilding.trim(), "N" | "Sem bookbuilding" | "Não")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_bookbuilding_spellings() {
        for label in ["N", "Sem bookbuilding", "Não"] {
            let row = BulkRow {
                bookbuilding: label.to_string(),
                ..Default::default()
            };
            assert!(row.skips_bookbuilding(), "{label}");
        }
        let row = BulkRow {
            bookbuilding: "S".to_string(),
            ..Default::default()
        };
        assert!(!row.skips_bookbuilding());
    }
}
