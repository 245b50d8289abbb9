//! File-based inputs and outputs: the regulator's bulk CSV, the
//! settlement reference CSV, and the canonical table store.

pub mod bulk;
pub mod reference;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use bulk::load_bulk;
pub use reference::{extract_key, load_reference};
pub use store::{load_table, save_table};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed not found: {0}")]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {0}")]
    MissingColumn(String),
}
