//! Reference data module
//!
//! Loads the analyte dataset and serves lookups by name.

pub mod analyte;
pub mod store;
pub mod tabular;

pub use analyte::{display_name, normalize_name, AnalyteRecord, AnalyteTable, REQUIRED_COLUMNS};
pub use store::{DataError, DataResult, ReferenceData};
