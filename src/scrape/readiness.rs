//! Readiness probe for rendered detail pages.

/// Header that every fully rendered detail page carries.
const REQUIRED_HEADER: &str = "características do valor mobiliário";

/// At least one of these must also be present. The header alone can appear
/// while the data grid below it is still loading.
const SECONDARY_MARKERS: &[&str] = &[
    "data de emissão",
    "data de vencimento",
    "lote base",
    "remuneração",
];

/// Whether the rendered text looks like a finished page rather than the
/// application shell. Matching is case-insensitive.
pub fn is_ready(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if !lowered.contains(REQUIRED_HEADER) {
        return false;
    }
    SECONDARY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
