pub mod error;
pub mod types;

#[cfg(feature = "ratios")]
pub mod ratios;

#[cfg(feature = "ingest")]
pub mod ingest;

pub use error::ValuationError;
pub use types::*;

/// Standard result type for fallible valuation-ratios operations
pub type ValuationResult<T> = Result<T, ValuationError>;
