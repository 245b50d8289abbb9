//! Output of one detail-page scrape.

/// What the rating scan found. Both non-rated cases render as the `TBD`
/// sentinel in the table, but they mean different things upstream: a
/// page can lack the risk-assessment section entirely, or carry it with
/// an explicit "not applicable" / no recognizable grade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingOutcome {
    /// No risk-assessment section on the page.
    NoSection,
    /// Section present but no usable grade; needs manual follow-up.
    Pending,
    /// A recognized grade, verbatim as printed.
    Rated(String),
}

impl RatingOutcome {
    /// Table rendering: the grade, or the manual-fill sentinel.
    pub fn render(&self) -> String {
        match self {
            RatingOutcome::Rated(grade) => grade.clone(),
            RatingOutcome::NoSection | RatingOutcome::Pending => "TBD".to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RatingOutcome::NoSection => "no-section",
            RatingOutcome::Pending => "pending",
            RatingOutcome::Rated(_) => "rated",
        }
    }
}

/// One financing tranche as read off the page. Field values are already
/// normalized; empty means the page did not offer the datum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesEntry {
    /// Series designator: a number or a named tranche (Única, Sênior, ...).
    pub number: String,
    pub species: String,
    /// Settled volume found on the page.
    pub settled_volume: String,
    pub issuance_date: String,
    pub maturity_date: String,
    pub ceiling_rate: String,
    pub final_rate: String,
}

/// Everything one scrape produced for a record key.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub key: u32,
    /// False when the page never became ready.
    pub fetched: bool,
    /// Fetch attempts consumed.
    pub attempts: u32,
    /// At least one entry on a successful fetch, empty on failure.
    pub series: Vec<SeriesEntry>,
    pub rating: RatingOutcome,
    /// Law 14.801 incentive flag: "S", "N", or empty when unlabeled.
    pub incentive_14801: String,
}

impl ExtractionResult {
    /// A fetch that never produced a ready page.
    pub fn failed(key: u32, attempts: u32) -> Self {
        Self {
            key,
            fetched: false,
            attempts,
            series: Vec::new(),
            rating: RatingOutcome::Pending,
            incentive_14801: String::new(),
        }
    }
}
