//! Biochemical Unit Converter (BUC) Library
//!
//! Converts analyte concentrations between clinical units using reference
//! molar masses.

pub mod build_info;
pub mod config;
pub mod conversion;
pub mod extract;
pub mod mcp;
pub mod models;
pub mod reference;
pub mod tools;
