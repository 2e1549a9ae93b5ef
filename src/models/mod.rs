//! Data models
//!
//! Session-scoped records kept by the converter.

mod conversion_record;

pub use conversion_record::{
    round_to, ConversionLog, ConversionRecord, EXPORT_COLUMNS, LOGGED_OUTPUT_DECIMALS,
    MAX_HISTORY_ENTRIES, TIMESTAMP_FORMAT,
};
