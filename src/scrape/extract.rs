//! Field extraction from rendered detail-page text.
//!
//! The page is a label/value layout flattened to plain text, so every
//! extractor here is anchored on a Portuguese label and reads forward from
//! it. Labels are matched case-insensitively; values come back already
//! normalized, with the empty string standing in for anything the page
//! does not carry.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::models::{RatingOutcome, SeriesEntry};
use crate::normalize::{normalize_date, normalize_rate, normalize_volume, truncate_chars};

/// Volume labels in precedence order. The post-bookbuilding amount wins
/// over the base lot, which wins over the generic total.
const VOLUME_LABELS: &[&str] = &["Valor Pós Coleta de Intenções", "Lote Base", "Valor Total"];

/// Ceiling-rate section labels in precedence order.
const CEILING_RATE_LABELS: &[&str] = &["Informações sobre remuneração", "remuneração máxima"];

/// Final-rate section labels in precedence order.
const FINAL_RATE_LABELS: &[&str] = &[
    "remuneração final (pós bookbuilding)",
    "pós bookbuilding",
    "remuneração final",
];

/// Rate and rating sections run for several lines; this many characters
/// after the section label is enough to cover them.
const SECTION_WINDOW: usize = 800;

static DATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}/\d{2}/\d{4}|\d{4}-\d{2}-\d{2})").unwrap());

static MONEY_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"R?\$?\s*([\d.,]+)").unwrap());

static SERIES_DESIGNATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ss]érie\s*:?\s*(\d+|[Úú]nica|[Ss]ênior|[Mm]ezanino|[Ss]ubordinada)").unwrap()
});

/// Grade patterns in priority order. Case matters: agency grades mix cases
/// meaningfully (brAAA, Aa2), so these run without `(?i)`.
static RATING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Scale suffix in parentheses: AAA(bra), AA+(sf), BB-(bra)
        Regex::new(r"([A-D]{1,3}[+-]?\s*\([a-zA-Z]{2,4}\))").unwrap(),
        // National-scale prefix: brAAA, brAA+, brBB-
        Regex::new(r"(br[A-D]{1,3}[+-]?)").unwrap(),
        // Moody's: Aaa, Aa1, Aa2, Baa1, Ba2
        Regex::new(r"([A-C]a{1,2}[1-3]?)").unwrap(),
        Regex::new(r"(Ba[a]?[1-3]?)").unwrap(),
        // S&P/Fitch global scale: AAA, AA+, AA-, BBB+
        Regex::new(r"\b([A-D]{2,3}[+-])\b").unwrap(),
        Regex::new(r"\b([A-D]{3})\b").unwrap(),
    ]
});

/// Company-suffix strings the grade patterns keep tripping over.
const RATING_REJECTS: &[&str] = &[
    "S.A.", "S/A", "LTDA", "CIA", "LTD", "AAB", "ABA", "BAA", "ABC", "CAD",
];

static RATING_SHAPE_PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(br)?[a-d]{2,3}").unwrap());

static RATING_SHAPE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-d]{1,3}[+-]?\s*\([a-z]+\)$").unwrap());

/// Case-insensitive search for a literal label, as a byte range into the
/// original text. Escaped literals always compile, so a build error just
/// reads as absent.
fn find_label(text: &str, label: &str) -> Option<Range<usize>> {
    let matcher = RegexBuilder::new(&regex::escape(label))
        .case_insensitive(true)
        .build()
        .ok()?;
    matcher.find(text).map(|m| m.range())
}

/// Up to `max_chars` characters of `text` starting at byte offset `start`.
fn char_window(text: &str, start: usize, max_chars: usize) -> &str {
    let tail = &text[start..];
    match tail.char_indices().nth(max_chars) {
        Some((end, _)) => &tail[..end],
        None => tail,
    }
}

/// The value printed after a label: the rest of the label's line, or the
/// next line when the label sits alone. Empty when the label is absent.
pub fn labeled_value(text: &str, label: &str) -> String {
    let Some(range) = find_label(text, label) else {
        return String::new();
    };
    let rest = text[range.end..].trim_start();
    let line = rest.lines().next().unwrap_or("");
    let value = line.trim().trim_start_matches(':').trim();
    truncate_chars(value, 200).to_string()
}

/// A date printed after a label, normalized to dd/mm/yyyy. The value line
/// often carries trailing words, so a date token is preferred over the
/// whole line.
pub fn date_field(text: &str, label: &str) -> String {
    let value = labeled_value(text, label);
    if value.is_empty() {
        return String::new();
    }
    match DATE_TOKEN.captures(&value) {
        Some(caps) => normalize_date(&caps[1]),
        None => normalize_date(&value),
    }
}

/// A monetary amount, trying labels in order. The first label present on
/// the page decides the outcome even when its value does not parse.
pub fn money_field(text: &str, labels: &[&str]) -> String {
    for label in labels {
        let value = labeled_value(text, label);
        if value.is_empty() {
            continue;
        }
        return match MONEY_TOKEN.captures(&value) {
            Some(caps) => normalize_volume(caps[1].trim()),
            None => normalize_volume(&value),
        };
    }
    String::new()
}

/// A remuneration rate, trying section labels in order and classifying the
/// text that follows each one. Labels whose section yields nothing fall
/// through to the next.
pub fn rate_field(text: &str, labels: &[&str]) -> String {
    for label in labels {
        let Some(range) = find_label(text, label) else {
            continue;
        };
        let window = char_window(text, range.start, SECTION_WINDOW);
        let rate = normalize_rate(window);
        if !rate.is_empty() {
            return rate;
        }
    }
    String::new()
}

/// The risk grade from the page's assessment section.
pub fn rating(text: &str) -> RatingOutcome {
    let range = match find_label(text, "avaliação de risco") {
        Some(range) => range,
        None => match find_label(text, "rating") {
            Some(range) => range,
            None => return RatingOutcome::NoSection,
        },
    };

    let window = char_window(text, range.start, SECTION_WINDOW);

    // An explicit not-applicable right after the section title means the
    // grade is pending publication.
    let head = char_window(window, 0, 100).to_lowercase();
    if head.contains("n/a") || head.contains("não aplicável") {
        return RatingOutcome::Pending;
    }

    for pattern in RATING_PATTERNS.iter() {
        for m in pattern.find_iter(window) {
            let candidate = m.as_str();
            let compact = candidate.to_uppercase().replace(' ', "");
            if RATING_REJECTS.contains(&compact.as_str()) {
                continue;
            }
            if RATING_SHAPE_PLAIN.is_match(candidate) || RATING_SHAPE_PAREN.is_match(candidate) {
                return RatingOutcome::Rated(candidate.to_string());
            }
        }
    }

    RatingOutcome::Pending
}

/// Distinct series designators in page order. The designator is a number
/// or a named tranche; a page that never names one is a single implied
/// first series.
pub fn series_designators(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    let mut designators = Vec::new();
    for caps in SERIES_DESIGNATOR.captures_iter(text) {
        let designator = caps[1].to_string();
        let folded = designator.to_lowercase();
        if seen.contains(&folded) {
            continue;
        }
        seen.push(folded);
        designators.push(designator);
    }
    if designators.is_empty() {
        designators.push("1".to_string());
    }
    designators
}

/// The Law 14.801 infrastructure-debenture answer: "S", "N", or empty when
/// the page has no such field.
pub fn incentive_14801(text: &str) -> String {
    let mut value = labeled_value(text, "Lei 14.801");
    if value.is_empty() {
        value = labeled_value(text, "14801");
    }
    if value.is_empty() {
        return String::new();
    }
    if value.to_lowercase().contains("sim") {
        "S".to_string()
    } else {
        "N".to_string()
    }
}

/// One entry per series designator. The page states characteristics once,
/// so every entry shares the page-level fields.
pub fn page_entries(text: &str) -> Vec<SeriesEntry> {
    let species = labeled_value(text, "Espécie");
    let issuance_date = date_field(text, "Data de emissão");
    let maturity_date = date_field(text, "Data de vencimento");
    let ceiling_rate = rate_field(text, CEILING_RATE_LABELS);
    let final_rate = rate_field(text, FINAL_RATE_LABELS);
    let settled_volume = money_field(text, VOLUME_LABELS);

    series_designators(text)
        .into_iter()
        .map(|number| SeriesEntry {
            number,
            species: species.clone(),
            settled_volume: settled_volume.clone(),
            issuance_date: issuance_date.clone(),
            maturity_date: maturity_date.clone(),
            ceiling_rate: ceiling_rate.clone(),
            final_rate: final_rate.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_value_same_line() {
        let text = "Espécie: Quirografária\nOutra coisa";
        assert_eq!(labeled_value(text, "Espécie"), "Quirografária");
    }

    #[test]
    fn test_labeled_value_next_line() {
        let text = "Espécie\nSubordinada\nOutra coisa";
        assert_eq!(labeled_value(text, "Espécie"), "Subordinada");
    }

    #[test]
    fn test_labeled_value_case_insensitive() {
        let text = "ESPÉCIE: Quirografária";
        assert_eq!(labeled_value(text, "Espécie"), "Quirografária");
    }

    #[test]
    fn test_labeled_value_missing() {
        assert_eq!(labeled_value("nada aqui", "Espécie"), "");
    }

    #[test]
    fn test_labeled_value_caps_length() {
        let text = format!("Garantias: {}", "x".repeat(300));
        assert_eq!(labeled_value(&text, "Garantias").chars().count(), 200);
    }

    #[test]
    fn test_date_field_token_in_longer_line() {
        let text = "Data de emissão: 15/01/2025 (primeira série)";
        assert_eq!(date_field(text, "Data de emissão"), "15/01/2025");
    }

    #[test]
    fn test_date_field_iso_token() {
        let text = "Data de vencimento: 2030-06-15";
        assert_eq!(date_field(text, "Data de vencimento"), "15/06/2030");
    }

    #[test]
    fn test_date_field_unparseable() {
        let text = "Data de emissão: a definir";
        assert_eq!(date_field(text, "Data de emissão"), "");
    }

    #[test]
    fn test_money_field_prefers_post_bookbuilding() {
        let text = "Lote Base: R$ 100.000.000,00\nValor Pós Coleta de Intenções: R$ 120.000.000,00";
        assert_eq!(money_field(text, VOLUME_LABELS), "120.000.000");
    }

    #[test]
    fn test_money_field_falls_back_to_base_lot() {
        let text = "Lote Base: R$ 50.000.000,00 (cinquenta milhões)";
        assert_eq!(money_field(text, VOLUME_LABELS), "50.000.000");
    }

    #[test]
    fn test_money_field_first_label_wins_even_unparsed() {
        // A present but useless first label keeps later labels out.
        let text = "Valor Pós Coleta de Intenções: a definir\nLote Base: R$ 10.000,00";
        assert_eq!(money_field(text, VOLUME_LABELS), "");
    }

    #[test]
    fn test_rate_field_ceiling() {
        let text = "Informações sobre remuneração\nTaxa DI + 2,20% ao ano base 252";
        assert_eq!(rate_field(text, CEILING_RATE_LABELS), "CDI + 2,20%");
    }

    #[test]
    fn test_rate_field_final_chain() {
        let text = "Remuneração final (pós bookbuilding): IPCA + 6,10% ao ano";
        assert_eq!(rate_field(text, FINAL_RATE_LABELS), "IPCA + 6,10%");
    }

    #[test]
    fn test_rate_field_percent_outside_window_is_missed() {
        let text = format!("remuneração máxima{}2,20%", " ".repeat(900));
        assert_eq!(rate_field(&text, CEILING_RATE_LABELS), "");
    }

    #[test]
    fn test_rating_national_scale() {
        let text = "Avaliação de risco\nAgência: S&P Global\nNota: brAAA perspectiva estável";
        assert_eq!(rating(text), RatingOutcome::Rated("brAAA".to_string()));
    }

    #[test]
    fn test_rating_parenthesized_scale() {
        let text = "Avaliação de risco\nNota atribuída: AA+(bra)";
        assert_eq!(rating(text), RatingOutcome::Rated("AA+(bra)".to_string()));
    }

    #[test]
    fn test_rating_moodys_scale() {
        let text = "Rating\nMoody's Local atribuiu Aa2 com perspectiva positiva";
        assert_eq!(rating(text), RatingOutcome::Rated("Aa2".to_string()));
    }

    #[test]
    fn test_rating_not_applicable() {
        let text = "Avaliação de risco: N/A";
        assert_eq!(rating(text), RatingOutcome::Pending);
    }

    #[test]
    fn test_rating_section_missing() {
        let text = "Características do Valor Mobiliário\nLote Base: R$ 1,00";
        assert_eq!(rating(text), RatingOutcome::NoSection);
    }

    #[test]
    fn test_rating_skips_lookalike_words() {
        // "CAD" hits the bare-triple pattern first and must be rejected.
        let text = "Avaliação de risco\nprocesso CAD 2024\nnota AAA concedida";
        assert_eq!(rating(text), RatingOutcome::Rated("AAA".to_string()));
    }

    #[test]
    fn test_series_designators_distinct() {
        let text = "Série: 1 Lote Base\nSérie: 2 Lote Base\nSérie: 1 repetida";
        assert_eq!(series_designators(text), vec!["1", "2"]);
    }

    #[test]
    fn test_series_designator_named() {
        assert_eq!(series_designators("Série Única"), vec!["Única"]);
    }

    #[test]
    fn test_series_designator_default() {
        assert_eq!(series_designators("sem menção alguma"), vec!["1"]);
    }

    #[test]
    fn test_incentive_14801() {
        assert_eq!(incentive_14801("Lei 14.801: Sim"), "S");
        assert_eq!(incentive_14801("Lei 14.801: Não"), "N");
        assert_eq!(incentive_14801("nada sobre o tema"), "");
    }

    #[test]
    fn test_page_entries_share_page_fields() {
        let text = "Série: 1\nSérie: 2\nEspécie: Quirografária\n\
                    Data de emissão: 15/01/2025\nData de vencimento: 15/01/2030\n\
                    Informações sobre remuneração\nCDI + 1,80% base 252\n\
                    Lote Base: R$ 80.000.000,00";
        let entries = page_entries(text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].number, "1");
        assert_eq!(entries[1].number, "2");
        for entry in &entries {
            assert_eq!(entry.species, "Quirografária");
            assert_eq!(entry.issuance_date, "15/01/2025");
            assert_eq!(entry.maturity_date, "15/01/2030");
            assert_eq!(entry.ceiling_rate, "CDI + 1,80%");
            assert_eq!(entry.settled_volume, "80.000.000");
        }
    }
}
