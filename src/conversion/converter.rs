//! Concentration conversion
//!
//! Converts a value between two concentration units by way of moles per
//! liter, using the analyte's molar mass for the mass-based units.

use thiserror::Error;

use super::units::{unit_symbols, ConcentrationUnit};

/// Conversion error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported unit '{0}'. Supported units: {}", unit_symbols().join(", "))]
    UnsupportedUnit(String),
}

/// Result type for conversions
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Convert a concentration between two unit symbols
///
/// Value and molar mass are validated before the unit symbols.
///
/// Examples:
/// - `convert(200.0, "mg/dL", "mmol/L", 386.65)` -> ~5.1726 (cholesterol)
/// - `convert(19243.0, "µmol/L", "g/L", 113.12)` -> ~2.1767 (creatinine)
pub fn convert(
    value: f64,
    from_unit: &str,
    to_unit: &str,
    molar_mass: f64,
) -> ConversionResult<f64> {
    let (from, to) = resolve_units(value, from_unit, to_unit, molar_mass)?;
    convert_units(value, from, to, molar_mass)
}

/// Check value and molar mass, then parse both unit symbols
///
/// Same validation order as `convert`, for callers that need the parsed
/// units as well as the result.
pub fn resolve_units(
    value: f64,
    from_unit: &str,
    to_unit: &str,
    molar_mass: f64,
) -> ConversionResult<(ConcentrationUnit, ConcentrationUnit)> {
    validate_inputs(value, molar_mass)?;
    Ok((parse_unit(from_unit)?, parse_unit(to_unit)?))
}

/// Convert between already-parsed units
pub fn convert_units(
    value: f64,
    from: ConcentrationUnit,
    to: ConcentrationUnit,
    molar_mass: f64,
) -> ConversionResult<f64> {
    validate_inputs(value, molar_mass)?;

    let mol_per_liter = (from.scale().to_mol_per_liter)(value, molar_mass);
    let result = (to.scale().from_mol_per_liter)(mol_per_liter, molar_mass);

    tracing::debug!(
        "Converted {} {} -> {} {} (molar mass {} g/mol)",
        value,
        from,
        result,
        to,
        molar_mass
    );

    Ok(result)
}

/// Parse a unit symbol into the vocabulary, or fail with `UnsupportedUnit`
pub fn parse_unit(symbol: &str) -> ConversionResult<ConcentrationUnit> {
    ConcentrationUnit::parse(symbol)
        .ok_or_else(|| ConversionError::UnsupportedUnit(symbol.to_string()))
}

/// Check whether a unit symbol belongs to the supported vocabulary
pub fn is_supported_unit(symbol: &str) -> bool {
    ConcentrationUnit::parse(symbol).is_some()
}

/// Human-readable description of the conversion route
pub fn conversion_formula(from: ConcentrationUnit, to: ConcentrationUnit) -> String {
    format!("{} → mol/L → {}", from.symbol(), to.symbol())
}

/// Reject negative, NaN and infinite concentration values
pub fn validate_value(value: f64) -> ConversionResult<()> {
    // Negated comparison so NaN fails too
    if !(value >= 0.0) || value.is_infinite() {
        return Err(ConversionError::InvalidInput(format!(
            "value must be a finite number >= 0, got {}",
            value
        )));
    }
    Ok(())
}

fn validate_inputs(value: f64, molar_mass: f64) -> ConversionResult<()> {
    validate_value(value)?;
    if !(molar_mass > 0.0) || molar_mass.is_infinite() {
        return Err(ConversionError::InvalidInput(format!(
            "molar mass must be a finite number > 0 g/mol, got {}",
            molar_mass
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CHOLESTEROL: f64 = 386.65;
    const CREATININE: f64 = 113.12;
    const GLUCOSE: f64 = 180.16;

    #[test]
    fn test_cholesterol_mg_dl_to_mmol_l() {
        let result = convert(200.0, "mg/dL", "mmol/L", CHOLESTEROL).unwrap();
        assert_relative_eq!(result, 5.1726, epsilon = 1e-4);
    }

    #[test]
    fn test_creatinine_umol_l_to_g_l() {
        let result = convert(19243.0, "µmol/L", "g/L", CREATININE).unwrap();
        assert_relative_eq!(result, 2.1767, epsilon = 1e-4);
    }

    #[test]
    fn test_glucose_mg_dl_to_mmol_l() {
        // 0.9 g/L / 180.16 g/mol = 4.9956 mmol/L
        let result = convert(90.0, "mg/dL", "mmol/L", GLUCOSE).unwrap();
        assert_relative_eq!(result, 4.9956, epsilon = 1e-4);
        assert!((result - 4.997).abs() < 2e-3);
    }

    #[test]
    fn test_micro_to_milli_ignores_molar_mass() {
        let result = convert(1000.0, "µmol/L", "mmol/L", CREATININE).unwrap();
        assert_relative_eq!(result, 1.0, epsilon = 1e-12);
        let other = convert(1000.0, "umol/L", "mmol/L", 1.0).unwrap();
        assert_relative_eq!(result, other, epsilon = 1e-12);
    }

    #[test]
    fn test_g_l_to_mg_dl() {
        let result = convert(2.0, "g/L", "mg/dL", CHOLESTEROL).unwrap();
        assert_relative_eq!(result, 200.0, max_relative = 1e-12);
    }

    #[test]
    fn test_same_unit_is_identity() {
        for unit in ConcentrationUnit::ALL {
            for value in [0.0, 1e-9, 0.5, 100.0, 123_456.789, 1e12] {
                let result = convert_units(value, unit, unit, GLUCOSE).unwrap();
                assert_relative_eq!(result, value, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_round_trip_all_pairs() {
        for from in ConcentrationUnit::ALL {
            for to in ConcentrationUnit::ALL {
                for molar_mass in [1.008, CREATININE, CHOLESTEROL, 66_500.0] {
                    let value = 123.45;
                    let there = convert_units(value, from, to, molar_mass).unwrap();
                    let back = convert_units(there, to, from, molar_mass).unwrap();
                    assert_relative_eq!(back, value, max_relative = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_zero_converts_to_zero() {
        for from in ConcentrationUnit::ALL {
            for to in ConcentrationUnit::ALL {
                assert_eq!(convert_units(0.0, from, to, GLUCOSE).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_negative_value_is_invalid() {
        let err = convert(-1.0, "mg/dL", "mmol/L", 100.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
    }

    #[test]
    fn test_zero_molar_mass_is_invalid() {
        let err = convert(100.0, "mg/dL", "mmol/L", 0.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
        let err = convert(100.0, "mg/dL", "mmol/L", -5.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_inputs_are_invalid() {
        assert!(matches!(
            convert(f64::NAN, "g/L", "mmol/L", 100.0),
            Err(ConversionError::InvalidInput(_))
        ));
        assert!(matches!(
            convert(f64::INFINITY, "g/L", "mmol/L", 100.0),
            Err(ConversionError::InvalidInput(_))
        ));
        assert!(matches!(
            convert(1.0, "g/L", "mmol/L", f64::NAN),
            Err(ConversionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unsupported_units() {
        let err = convert(100.0, "bogus", "mmol/L", 100.0).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedUnit("bogus".to_string()));

        let err = convert(100.0, "mg/dL", "invalid_unit", CHOLESTEROL).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedUnit(_)));
    }

    #[test]
    fn test_invalid_input_checked_before_units() {
        let err = convert(-1.0, "bogus", "mmol/L", 100.0).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
    }

    #[test]
    fn test_resolve_units() {
        let (from, to) = resolve_units(5.0, "umol/l", "MG/DL", GLUCOSE).unwrap();
        assert_eq!(from, ConcentrationUnit::MicromolPerLiter);
        assert_eq!(to, ConcentrationUnit::MilligramsPerDeciliter);

        let err = resolve_units(-1.0, "bogus", "mg/dL", GLUCOSE).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInput(_)));
        let err = resolve_units(1.0, "mg/dL", "bogus", GLUCOSE).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedUnit("bogus".to_string()));
    }

    #[test]
    fn test_validate_value() {
        assert!(validate_value(0.0).is_ok());
        assert!(validate_value(1e305).is_ok());
        assert!(validate_value(-0.5).is_err());
        assert!(validate_value(f64::NAN).is_err());
    }

    #[test]
    fn test_unit_spelling_variants_agree() {
        let a = convert(5.0, "MMOL/L", "mg/dL", GLUCOSE).unwrap();
        let b = convert(5.0, "mmol / l", "mg/dL", GLUCOSE).unwrap();
        let c = convert(5.0, "mmol/L", "MG/DL", GLUCOSE).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_very_small_and_large_values() {
        let small = convert(0.001, "mmol/L", "µmol/L", GLUCOSE).unwrap();
        assert_relative_eq!(small, 1.0, max_relative = 1e-12);

        let large = convert(100_000.0, "µmol/L", "mmol/L", CREATININE).unwrap();
        assert_relative_eq!(large, 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_clinical_reference_ranges() {
        // Fasting glucose 70-100 mg/dL is 3.9-5.6 mmol/L
        let low = convert(70.0, "mg/dL", "mmol/L", GLUCOSE).unwrap();
        let high = convert(100.0, "mg/dL", "mmol/L", GLUCOSE).unwrap();
        assert!(3.8 < low && low < 4.0);
        assert!(5.5 < high && high < 5.7);

        // Creatinine ~90 µmol/L is ~1 mg/dL
        let creatinine = convert(90.0, "µmol/L", "mg/dL", CREATININE).unwrap();
        assert!(0.9 < creatinine && creatinine < 1.1);

        let precision = convert(123.45, "mg/dL", "mmol/L", CHOLESTEROL).unwrap();
        assert_relative_eq!(precision, 3.19, epsilon = 0.01);
    }

    #[test]
    fn test_is_supported_unit() {
        for unit in ["µmol/L", "mmol/L", "mg/dL", "g/L", "umol/L", "MMOL/L", "Mmol/L", "mmol / L"] {
            assert!(is_supported_unit(unit), "{unit} should be supported");
        }
        for unit in ["invalid", "mol/L", "kg/m3", ""] {
            assert!(!is_supported_unit(unit), "{unit} should not be supported");
        }
    }

    #[test]
    fn test_conversion_formula() {
        let formula = conversion_formula(
            ConcentrationUnit::MilligramsPerDeciliter,
            ConcentrationUnit::MillimolPerLiter,
        );
        assert_eq!(formula, "mg/dL → mol/L → mmol/L");
    }

    #[test]
    fn test_unsupported_unit_message_lists_vocabulary() {
        let msg = ConversionError::UnsupportedUnit("kg".to_string()).to_string();
        assert!(msg.contains("'kg'"));
        assert!(msg.contains("µmol/L"));
        assert!(msg.contains("mg/dL"));
    }
}
