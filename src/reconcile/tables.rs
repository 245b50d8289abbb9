//! Lookup tables for classifying bulk-feed rows.

use std::sync::LazyLock;

use crate::normalize::name::capitalize;
use crate::normalize::truncate_chars;

/// Feed security-type labels mapped to table product codes. The regulator
/// flips between UTF-8 and Latin-1 exports; a Latin-1 file decoded
/// leniently turns each accented letter into U+FFFD, so that spelling is
/// listed next to the clean one.
pub const PRODUCT_LABELS: &[(&str, &str)] = &[
    ("Debêntures", "Debêntures"),
    ("Deb\u{fffd}ntures", "Debêntures"),
    ("Debêntures Conversíveis", "Debêntures"),
    ("Deb\u{fffd}ntures Convers\u{fffd}veis", "Debêntures"),
    ("Certificados de Recebíveis do Agronegócio", "CRA"),
    ("Certificados de Receb\u{fffd}veis do Agroneg\u{fffd}cio", "CRA"),
    ("Certificados de Recebíveis Imobiliários", "CRI"),
    ("Certificados de Receb\u{fffd}veis Imobili\u{fffd}rios", "CRI"),
    ("Notas Comerciais", "NC"),
    ("Certificados de Recebíveis", "CR"),
    ("Certificados de Receb\u{fffd}veis", "CR"),
    ("Cédula de Produto Rural Financeira", "CPR-F"),
    ("C\u{fffd}dula de Produto Rural Financeira", "CPR-F"),
    ("Notas Promissórias", "NP"),
    ("Notas Promiss\u{fffd}rias", "NP"),
    ("Outros títulos de securitização", "Outros"),
    ("Outros t\u{fffd}tulos de securitiza\u{fffd}\u{fffd}o", "Outros"),
];

/// Statuses of offerings still moving through the process.
pub const PIPELINE_STATUSES: &[&str] = &[
    "Registro Concedido",
    "Aguardando Bookbuilding",
    "Aguardando Encerramento",
];

/// Terminal statuses.
pub const CLOSED_STATUSES: &[&str] = &["Oferta Encerrada"];

/// Statuses whose rows are dropped outright.
pub const IGNORED_STATUSES: &[&str] = &["Registro Caducado"];

/// Short feed spellings folded into the canonical status names.
const STATUS_ALIASES: &[(&str, &str)] = &[
    ("Encerrado", "Oferta Encerrada"),
    ("Concedido", "Registro Concedido"),
];

/// Lead-coordinator names to their spreadsheet abbreviations. Matched as
/// substrings of the uppercased feed name.
pub const COORDINATOR_LABELS: &[(&str, &str)] = &[
    ("BANCO BRADESCO BBI", "BBI"),
    ("BRADESCO BBI", "BBI"),
    ("ITAU BBA", "BBA"),
    ("ITAÚ BBA", "BBA"),
    ("BANCO SANTANDER", "San"),
    ("SANTANDER", "San"),
    ("BTG PACTUAL", "BTG"),
    ("BANCO BTG PACTUAL", "BTG"),
    ("XP INVESTIMENTOS", "XP"),
    ("UBS BB", "UBS"),
    ("UBS BRASIL", "UBS"),
    ("BANCO SAFRA", "Safra"),
    ("SAFRA", "Safra"),
    ("BANCO CITIBANK", "Citi"),
    ("CITIBANK", "Citi"),
    ("CITI", "Citi"),
    ("INTER DISTRIBUIDORA", "Inter"),
    ("BANCO INTER", "Inter"),
    ("ATIVA INVESTIMENTOS", "Ativa"),
    ("ATIVA", "Ativa"),
    ("TERRA INVESTIMENTOS", "Terra"),
    ("TERRA", "Terra"),
    ("BANCO BV", "BV"),
    ("BANCO VOTORANTIM", "BV"),
    ("BV", "BV"),
    ("BANCO GENIAL", "Genial"),
    ("GENIAL", "Genial"),
    ("CAIXA ECONÔMICA", "Caixa"),
    ("CAIXA ECONOMICA", "Caixa"),
    ("CAIXA", "Caixa"),
    ("BNDES", "BNDES"),
    ("BANCO ABC", "ABC"),
    ("ABC BRASIL", "ABC"),
    ("BR PARTNERS", "BR Partners"),
    ("OPEA", "Opea"),
    ("BANCO DO BRASIL", "BB"),
    ("BANCO DAYCOVAL", "Daycoval"),
    ("DAYCOVAL", "Daycoval"),
    ("BANCO MODAL", "Modal"),
    ("MODAL", "Modal"),
    ("BANCO RODOBENS", "Rodobens"),
    ("BANCO PINE", "Pine"),
    ("PINE", "Pine"),
    ("GUIDE INVESTIMENTOS", "Guide"),
    ("GUIDE", "Guide"),
    ("ORAMA", "Orama"),
    ("BANCO PAN", "Pan"),
    ("PAN", "Pan"),
    ("BANCO ORIGINAL", "Original"),
    ("BANCO BMG", "BMG"),
    ("BMG", "BMG"),
    ("PLURAL", "Plural"),
    ("GAIA", "Gaia"),
    ("TRUE SECURITIZADORA", "True"),
    ("TRUE", "True"),
    ("VIRGO COMPANHIA", "Virgo"),
    ("VIRGO", "Virgo"),
    ("ISEC", "Isec"),
    ("OCTANTE", "Octante"),
    ("RB CAPITAL", "RB"),
    ("RB", "RB"),
    ("VINCI", "Vinci"),
    ("SPX", "SPX"),
    ("HABITASEC", "Habitasec"),
    ("BARIGUI", "Barigui"),
    ("FIDUCIAL", "Fiducial"),
    ("MASTER", "Master"),
    ("FATOR", "Fator"),
    ("OURINVEST", "Ourinvest"),
];

/// Corporate boilerplate stripped before falling back to the first word.
const COORDINATOR_NOISE: &[&str] = &[
    "BANCO",
    "S.A.",
    "S/A",
    "LTDA",
    "CORRETORA",
    "DISTRIBUIDORA",
    "DTVM",
    "CTVM",
    "CCTVM",
    "INVESTIMENTOS",
    "ASSESSORIA",
    "FINANCEIRA",
];

/// Coordinator labels longest first, so "BANCO BTG PACTUAL" wins over
/// "BTG PACTUAL" before either is tried as a substring.
static COORDINATORS_BY_LENGTH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut pairs = COORDINATOR_LABELS.to_vec();
    pairs.sort_by_key(|(label, _)| std::cmp::Reverse(label.len()));
    pairs
});

/// The product code for a feed security-type label, or `None` when the
/// label is not a tracked product.
pub fn simplify_product(raw: &str) -> Option<&'static str> {
    let label = raw.trim();
    if label.is_empty() {
        return None;
    }
    for (feed_label, code) in PRODUCT_LABELS {
        if *feed_label == label {
            return Some(code);
        }
    }
    let lowered = label.to_lowercase();
    for (feed_label, code) in PRODUCT_LABELS {
        if lowered.contains(&feed_label.to_lowercase()) {
            return Some(code);
        }
    }
    None
}

/// Fold feed status spellings into the canonical names.
pub fn normalize_status(raw: &str) -> String {
    let status = raw.trim();
    for (alias, canonical) in STATUS_ALIASES {
        if status == *alias {
            return (*canonical).to_string();
        }
    }
    status.to_string()
}

pub fn is_pipeline_status(status: &str) -> bool {
    PIPELINE_STATUSES.contains(&status)
}

pub fn is_closed_status(status: &str) -> bool {
    CLOSED_STATUSES.contains(&status)
}

pub fn is_ignored_status(status: &str) -> bool {
    IGNORED_STATUSES.contains(&status)
}

/// The spreadsheet abbreviation for a lead coordinator. Unknown houses
/// fall back to their first meaningful word.
pub fn abbreviate_coordinator(raw: &str) -> String {
    let original = raw.trim();
    if original.is_empty() {
        return String::new();
    }

    let upper = original.to_uppercase();
    for (label, short) in COORDINATORS_BY_LENGTH.iter() {
        if upper.contains(label) {
            return (*short).to_string();
        }
    }

    let mut cleaned = upper;
    for term in COORDINATOR_NOISE {
        cleaned = cleaned.replace(term, "");
    }
    if let Some(word) = cleaned.split_whitespace().find(|w| w.chars().count() > 2) {
        return capitalize(word);
    }

    // Last resort: a trimmed slice of the original name.
    truncate_chars(original, 20)
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Standardize the target-public wording.
pub fn map_target_public(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }
    let lowered = value.to_lowercase();
    if lowered.contains("profissional") {
        return "Profissional".to_string();
    }
    if lowered.contains("qualificado") {
        return "Qualificado".to_string();
    }
    if lowered.contains("geral") {
        return "Geral".to_string();
    }
    lowered
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_exact_and_substring() {
        assert_eq!(simplify_product("Debêntures"), Some("Debêntures"));
        assert_eq!(
            simplify_product("Certificados de Recebíveis Imobiliários"),
            Some("CRI")
        );
        assert_eq!(
            simplify_product("Emissão de Certificados de Recebíveis do Agronegócio em série única"),
            Some("CRA")
        );
        assert_eq!(simplify_product("Ações Ordinárias"), None);
        assert_eq!(simplify_product(""), None);
    }

    #[test]
    fn test_product_lenient_decode_spelling() {
        assert_eq!(simplify_product("Deb\u{fffd}ntures"), Some("Debêntures"));
        assert_eq!(
            simplify_product("Certificados de Receb\u{fffd}veis Imobili\u{fffd}rios"),
            Some("CRI")
        );
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!(normalize_status("Encerrado"), "Oferta Encerrada");
        assert_eq!(normalize_status("Concedido"), "Registro Concedido");
        assert_eq!(normalize_status(" Registro Concedido "), "Registro Concedido");
        assert_eq!(normalize_status("Em Análise"), "Em Análise");
    }

    #[test]
    fn test_status_sets() {
        assert!(is_pipeline_status("Aguardando Bookbuilding"));
        assert!(is_closed_status("Oferta Encerrada"));
        assert!(is_ignored_status("Registro Caducado"));
        assert!(!is_pipeline_status("Oferta Encerrada"));
    }

    #[test]
    fn test_coordinator_known_houses() {
        assert_eq!(abbreviate_coordinator("BANCO BTG PACTUAL S.A."), "BTG");
        assert_eq!(abbreviate_coordinator("Banco Bradesco BBI S.A."), "BBI");
        assert_eq!(abbreviate_coordinator("XP Investimentos CCTVM S.A."), "XP");
        assert_eq!(abbreviate_coordinator("BANCO ITAÚ BBA S.A."), "BBA");
    }

    #[test]
    fn test_coordinator_fallback_first_word() {
        assert_eq!(abbreviate_coordinator("BANCO XPTO INVESTIMENTOS LTDA"), "Xpto");
        assert_eq!(abbreviate_coordinator(""), "");
    }

    #[test]
    fn test_target_public() {
        assert_eq!(map_target_public("Investidores Profissionais"), "Profissional");
        assert_eq!(map_target_public("Investidores Qualificados"), "Qualificado");
        assert_eq!(map_target_public("Público em geral"), "Geral");
        assert_eq!(map_target_public("Outros Perfis"), "Outros Perfis");
        assert_eq!(map_target_public(""), "");
    }
}
