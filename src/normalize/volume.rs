//! Money normalization to the table's grouped integer rendering.

/// Parse a decimal that may use Brazilian separators (`1.234.567,89`),
/// a bare comma decimal (`1234,56`), a plain dot decimal (`1234.56`),
/// or dot-grouped integers (`1.234.567`). With both separators present
/// the period groups thousands and the comma marks the decimal; a lone
/// comma marks the decimal; a lone period is a decimal mark unless it
/// repeats, in which case it groups thousands.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let stripped = raw.trim().replace("R$", "");
    let cleaned = stripped.trim();
    if cleaned.is_empty() {
        return None;
    }
    let has_comma = cleaned.contains(',');
    let dot_count = cleaned.matches('.').count();
    let plain = if has_comma && dot_count > 0 {
        cleaned.replace('.', "").replace(',', ".")
    } else if has_comma {
        cleaned.replace(',', ".")
    } else if dot_count > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned.to_string()
    };
    plain.parse::<f64>().ok()
}

/// Normalize a money string to its integer part with period thousands
/// separators (`1.234.567`). Zero, empty, and unparseable values all map
/// to empty: the table treats "no volume" and "volume zero" the same way.
pub fn normalize_volume(raw: &str) -> String {
    match parse_decimal(raw) {
        Some(value) if value != 0.0 => format_thousands(value as i64),
        _ => String::new(),
    }
}

fn format_thousands(value: i64) -> String {
    let negative = value < 0;
    let digits: Vec<char> = value.abs().to_string().chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brazilian_both_separators() {
        assert_eq!(normalize_volume("1.234.567,89"), "1.234.567");
        assert_eq!(normalize_volume("R$ 50.000.000,00"), "50.000.000");
    }

    #[test]
    fn test_comma_decimal_only() {
        assert_eq!(normalize_volume("1234567,5"), "1.234.567");
    }

    #[test]
    fn test_plain_decimal() {
        assert_eq!(normalize_volume("1234567.89"), "1.234.567");
        assert_eq!(normalize_volume("1000000"), "1.000.000");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        assert_eq!(normalize_volume("1.234.567"), "1.234.567");
        assert_eq!(normalize_volume(&normalize_volume("1.234.567,89")), "1.234.567");
    }

    #[test]
    fn test_zero_and_empty_map_to_empty() {
        assert_eq!(normalize_volume("0"), "");
        assert_eq!(normalize_volume("0,00"), "");
        assert_eq!(normalize_volume(""), "");
    }

    #[test]
    fn test_unparseable_is_empty() {
        assert_eq!(normalize_volume("a combinar"), "");
    }

    #[test]
    fn test_small_values() {
        assert_eq!(normalize_volume("999"), "999");
        assert_eq!(normalize_volume("1000"), "1.000");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1,25"), Some(1.25));
        assert_eq!(parse_decimal("1.250,75"), Some(1250.75));
        assert_eq!(parse_decimal("1.25"), Some(1.25));
        assert_eq!(parse_decimal("abc"), None);
    }
}
