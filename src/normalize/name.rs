//! Portuguese title-casing for issuer and coordinator names.

/// Connectives kept lowercase unless they open the name.
const PREPOSITIONS: &[&str] = &[
    "de", "do", "da", "dos", "das", "em", "e", "para", "por", "com", "sem", "sob",
];

/// Corporate suffixes and vehicle acronyms kept uppercase wherever they
/// appear. Matched ignoring trailing periods.
const ACRONYMS: &[&str] = &[
    "S.A.", "S/A", "LTDA", "LTDA.", "CIA", "CIA.", "CNPJ", "FIDC", "FII", "FIP", "FIAGRO",
];

/// Capitalize one word: first letter upper, rest lower.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Title-case a name, keeping prepositions lowercase and corporate
/// acronyms uppercase. The `N/A` sentinel passes through untouched.
pub fn title_case(name: &str) -> String {
    if name.is_empty() || name == "N/A" {
        return name.to_string();
    }

    let mut words = Vec::new();
    for (i, word) in name.split_whitespace().enumerate() {
        let upper = word.to_uppercase();
        let stripped = upper.replace('.', "");
        let is_acronym = ACRONYMS
            .iter()
            .any(|a| *a == upper || a.replace('.', "") == stripped);

        if is_acronym {
            words.push(upper);
        } else if i > 0 && PREPOSITIONS.contains(&word.to_lowercase().as_str()) {
            words.push(word.to_lowercase());
        } else {
            words.push(capitalize(word));
        }
    }
    words.join(" ")
}

/// Cut a string to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("COMPANHIA BRASILEIRA DE ALUMÍNIO"), "Companhia Brasileira de Alumínio");
    }

    #[test]
    fn test_prepositions_stay_lowercase_except_first() {
        assert_eq!(title_case("DE OLHO NO CAMPO LTDA"), "De Olho No Campo LTDA");
    }

    #[test]
    fn test_acronyms_preserved() {
        assert_eq!(title_case("energisa s.a."), "Energisa S.A.");
        assert_eq!(title_case("vale s/a mineração"), "Vale S/A Mineração");
        assert_eq!(title_case("fundo fidc crédito"), "Fundo FIDC Crédito");
    }

    #[test]
    fn test_sentinel_passthrough() {
        assert_eq!(title_case("N/A"), "N/A");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
