//! Pure string normalizers shared by the feed loaders, the page
//! extractors, and the reconciler.
//!
//! Everything here is total: bad input maps to an empty string (the
//! table-wide "unknown" convention), never to an error.

pub mod date;
pub mod name;
pub mod rate;
pub mod volume;

pub use date::{normalize_date, term_years};
pub use name::{title_case, truncate_chars};
pub use rate::{normalize_rate, reference_rate};
pub use volume::{normalize_volume, parse_decimal};
