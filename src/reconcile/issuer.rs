//! Issuer resolution.
//!
//! For securitizations the formally registered issuer is a shell company;
//! the name worth tracking is the debtor behind the receivables. The feed
//! buries that name in a free-text column along with CNPJ numbers,
//! guarantor lists and legal boilerplate, all of which gets cut away here.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::BulkRow;
use crate::normalize::{title_case, truncate_chars};

/// Products whose table issuer comes from the debtor column.
const DEBTOR_PRODUCTS: &[&str] = &["CRI", "CRA", "CR"];

/// Debtor descriptions meaning "many small debtors, no single name".
const DISPERSED_TERMS: &[&str] = &[
    "pessoa física",
    "pessoas físicas",
    "diversos",
    "pulverizado",
    "pessoa jurídica",
    "pessoas jurídicas",
    "n/a",
    "não aplicável",
];

const DEBTOR_PREFIXES: &[&str] = &["Devedora:", "Devedoras:", "Devedor:", "Cedente:", "Cedentes:"];

/// First match of any of these truncates the debtor text.
static CUT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "inscrita no CNPJ sob nº ..."
        Regex::new(r"(?i)\s*,?\s*inscrit[ao]").unwrap(),
        Regex::new(r"(?i)\s*,?\s*CNPJ").unwrap(),
        Regex::new(r"(?i)\s*\|\s*Avalistas?:").unwrap(),
        Regex::new(r"(?i)\s*,?\s*com\s+aval").unwrap(),
        Regex::new(r"(?i)\s*,?\s*Os\s+Direitos").unwrap(),
        Regex::new(r"(?i)\s*,?\s*100%").unwrap(),
        // Bare CNPJ digit groups
        Regex::new(r"(?i)\s*:\s*\d+\.\d+\.\d+").unwrap(),
    ]
});

static TRAILING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,.\s]+$").unwrap());

/// The table issuer for a row, title-cased. "Pulverizado" for dispersed
/// securitizations, "N/A" when the feed offers no name at all.
pub fn resolve_issuer(row: &BulkRow, product: &str) -> String {
    let raw = if DEBTOR_PRODUCTS.contains(&product) {
        let debtors = row.debtors.trim();
        if debtors.is_empty() {
            row.issuer_name.clone()
        } else {
            let lowered = debtors.to_lowercase();
            if DISPERSED_TERMS.iter().any(|term| lowered.contains(term)) {
                return "Pulverizado".to_string();
            }
            let cleaned = clean_debtor(debtors);
            if cleaned.trim().is_empty() {
                row.issuer_name.clone()
            } else {
                cleaned
            }
        }
    } else {
        row.issuer_name.clone()
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return "N/A".to_string();
    }
    title_case(raw)
}

/// Reduce a debtor description to the company name at its front.
fn clean_debtor(text: &str) -> String {
    let mut current = text.to_string();
    for prefix in DEBTOR_PREFIXES {
        if let Some(rest) = current.strip_prefix(prefix) {
            current = rest.trim().to_string();
        }
        current = current.replace(prefix, "").trim().to_string();
    }

    let mut result = current.clone();
    for pattern in CUT_PATTERNS.iter() {
        if let Some(m) = pattern.find(&result) {
            result = result[..m.start()].trim().to_string();
        }
    }

    result = TRAILING_PUNCT.replace(&result, "").to_string();

    // Cut too deep: fall back to the uncut text.
    if result.chars().count() < 3 {
        result = truncate_chars(&current, 100).to_string();
    }

    if result.chars().count() > 100 {
        result = cut_at_separator(&result);
    }

    result.trim().to_string()
}

/// Shorten an overlong name at a natural separator, keeping at least the
/// first fifty characters.
fn cut_at_separator(text: &str) -> String {
    let head: String = text.chars().take(100).collect();
    for sep in [" | ", ", ", " - "] {
        if head.contains(sep) {
            let from = text
                .char_indices()
                .nth(50)
                .map(|(offset, _)| offset)
                .unwrap_or(text.len());
            if let Some(pos) = text[from..].find(sep) {
                return text[..from + pos].to_string();
            }
            return head;
        }
    }
    head
}
