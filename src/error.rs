use crate::Adducts::adduct_table::AdductError;
use crate::Store::StoreError;
use thiserror::Error;

/// Error returned by the public search operations. A call either yields a (possibly empty)
/// result collection or exactly one of these.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0} files not supported")]
    UnsupportedFormat(String),
    #[error("Malformed peak '{0}': expected an m/z value")]
    MalformedPeak(String),
    #[error("Adduct error: {0}")]
    Adduct(#[from] AdductError),
    #[error("Search canceled")]
    Canceled,
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
