//! Concentration conversion module
//!
//! Unit vocabulary and the two-stage conversion through moles per liter.

pub mod converter;
pub mod units;

pub use converter::{
    conversion_formula, convert, convert_units, is_supported_unit, parse_unit, resolve_units,
    validate_value, ConversionError, ConversionResult,
};
pub use units::{normalize_symbol, unit_symbols, ConcentrationUnit, UnitScale};
