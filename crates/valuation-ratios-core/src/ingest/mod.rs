//! Assembles [`CompanyFinancials`](crate::ratios::CompanyFinancials) snapshots
//! from per-company statement datasets that were exported to JSON by an
//! external downloader. Pure parsing: reading the files is the caller's job.

pub mod dataset;
pub mod layout;
pub mod statement;

pub use dataset::{CompanyDataset, PeriodSelection, PeriodSnapshot};
pub use layout::{DatasetKind, FieldSource, SourceLayout};
pub use statement::StatementTable;
