//! Data models for cvmtrack.

mod bulk;
mod canonical;
mod extraction;
mod reference;

pub use bulk::BulkRow;
pub use canonical::CanonicalRow;
pub use extraction::{ExtractionResult, RatingOutcome, SeriesEntry};
pub use reference::ReferenceRow;
