//! Remuneration-text normalization to the table's canonical rate shapes.
//!
//! Detail pages describe remuneration in free prose spanning several
//! lines ("taxa máxima de 1,35% a.a., base 360 dias, ..."). The
//! normalizer reduces that to `<INDEX> + <spread>%` (or `Pré <spread>%`
//! for fixed-rate series), keyed on two signals: the day-count basis and
//! the index token. A 360-day basis means exchange-variation ("VC")
//! paper; the default 252-business-day basis without any other index
//! token is CDI paper.

use std::sync::LazyLock;

use regex::Regex;

/// Spread tokens: decimal form preferred, bare integer as fallback.
static DECIMAL_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[,.]\d+)\s*%").unwrap());
static INTEGER_PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*%").unwrap());

/// 360-day basis markers.
static BASIS_360: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(b360|e360|base\s*360|360\s*dias)").unwrap());

/// "pre" as a standalone word (accent dropped by some pages).
static PRE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bpre\b").unwrap());

/// Extract the first percentage token, comma-decimal.
fn first_percent(text: &str) -> Option<String> {
    DECIMAL_PERCENT
        .captures(text)
        .or_else(|| INTEGER_PERCENT.captures(text))
        .map(|caps| caps[1].replace('.', ","))
}

/// Normalize a free-text remuneration snippet to one of the canonical
/// rate shapes. Returns empty when no percentage token is present.
pub fn normalize_rate(raw: &str) -> String {
    let Some(spread) = first_percent(raw) else {
        return String::new();
    };
    let lower = raw.to_lowercase();

    if BASIS_360.is_match(&lower) {
        return format!("VC + {spread}%");
    }
    if lower.contains("ipca") {
        return format!("IPCA + {spread}%");
    }
    if lower.contains("ntn") {
        return format!("NTN-B + {spread}%");
    }
    if lower.contains("selic") {
        return format!("SELIC + {spread}%");
    }
    if lower.contains("b30") {
        return format!("B30 + {spread}%");
    }
    if lower.contains("prefixad") || lower.contains("pré") || PRE_WORD.is_match(&lower) {
        return format!("Pré {spread}%");
    }
    // 252-business-day basis is the default and its index is CDI.
    format!("CDI + {spread}%")
}

/// Render the settlement feed's index + spread pair. The feed publishes
/// its own index vocabulary; unmapped or unidentified indices yield
/// empty, and a zero/absent spread yields the bare index.
pub fn reference_rate(index_label: &str, spread: Option<f64>) -> String {
    let label = index_label.trim();
    if label.is_empty() || label == "Não identificado" {
        return String::new();
    }
    let index = if label.contains("DI") {
        "CDI"
    } else if label.contains("IPCA") {
        "IPCA"
    } else if label.contains("Pré") || label.contains("Prefixado") {
        "Pré"
    } else {
        return String::new();
    };
    match spread {
        Some(value) if value != 0.0 => {
            let rendered = format!("{value:.2}").replace('.', ",");
            if index == "Pré" {
                format!("Pré {rendered}%")
            } else {
                format!("{index} + {rendered}%")
            }
        }
        _ => index.to_string(),
    }
}
