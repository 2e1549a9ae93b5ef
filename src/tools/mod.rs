//! BUC Tools module
//!
//! MCP tool implementations for the Biochemical Unit Converter.

pub mod analytes;
pub mod ask;
pub mod convert;
pub mod history;
pub mod status;
