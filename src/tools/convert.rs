//! Conversion MCP Tools
//!
//! Manual-entry conversions: by analyte name (logged) and with an explicit
//! molar mass (not logged).

use serde::Serialize;

use crate::conversion::{conversion_formula, convert_units, resolve_units, ConcentrationUnit};
use crate::models::{round_to, ConversionLog, ConversionRecord, LOGGED_OUTPUT_DECIMALS};
use crate::reference::{AnalyteRecord, ReferenceData};

/// Response for convert_units
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResponse {
    pub analyte: String,
    pub value_input: f64,
    pub unit_from: &'static str,
    pub value_output: f64,
    pub value_output_rounded: f64,
    pub unit_to: &'static str,
    pub molar_mass: f64,
    pub source: String,
    pub formula: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub history_size: usize,
}

/// Response for convert_with_molar_mass
#[derive(Debug, Clone, Serialize)]
pub struct RawConvertResponse {
    pub value_input: f64,
    pub unit_from: &'static str,
    pub value_output: f64,
    pub unit_to: &'static str,
    pub molar_mass: f64,
    pub formula: String,
}

/// Error text for a name the reference data does not know
pub fn unknown_analyte_message(reference: &ReferenceData, name: &str) -> String {
    format!(
        "Unknown analyte '{}'. Known analytes: {}",
        name.trim(),
        reference.list_all().join(", ")
    )
}

/// Convert a value for a named analyte and log it
pub fn convert_analyte(
    reference: &ReferenceData,
    log: &mut ConversionLog,
    analyte: &str,
    value: f64,
    unit_from: &str,
    unit_to: &str,
) -> Result<ConvertResponse, String> {
    let record = reference
        .lookup(analyte)
        .ok_or_else(|| unknown_analyte_message(reference, analyte))?;

    let (from, to) =
        resolve_units(value, unit_from, unit_to, record.molar_mass).map_err(|e| e.to_string())?;
    let value_output =
        convert_units(value, from, to, record.molar_mass).map_err(|e| e.to_string())?;

    let warnings = conversion_warnings(&record, from, to);
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    log.record(ConversionRecord::new(&record, value, from, value_output, to));

    tracing::info!(
        "{}: {} {} = {} {}",
        record.display_name(),
        value,
        from,
        round_to(value_output, LOGGED_OUTPUT_DECIMALS),
        to
    );

    Ok(ConvertResponse {
        analyte: record.display_name(),
        value_input: value,
        unit_from: from.symbol(),
        value_output,
        value_output_rounded: round_to(value_output, LOGGED_OUTPUT_DECIMALS),
        unit_to: to.symbol(),
        molar_mass: record.molar_mass,
        source: record.source.clone(),
        formula: conversion_formula(from, to),
        warnings,
        history_size: log.len(),
    })
}

/// Convert with a caller-supplied molar mass
pub fn convert_with_molar_mass(
    value: f64,
    unit_from: &str,
    unit_to: &str,
    molar_mass: f64,
) -> Result<RawConvertResponse, String> {
    let (from, to) =
        resolve_units(value, unit_from, unit_to, molar_mass).map_err(|e| e.to_string())?;
    let value_output = convert_units(value, from, to, molar_mass).map_err(|e| e.to_string())?;

    Ok(RawConvertResponse {
        value_input: value,
        unit_from: from.symbol(),
        value_output,
        unit_to: to.symbol(),
        molar_mass,
        formula: conversion_formula(from, to),
    })
}

fn conversion_warnings(
    record: &AnalyteRecord,
    from: ConcentrationUnit,
    to: ConcentrationUnit,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if from == to {
        warnings.push(format!("Source and target unit are both {}; value unchanged", from));
    }
    for unit in [from, to] {
        if !record.accepts(unit) && !warnings.iter().any(|w| w.starts_with(unit.symbol())) {
            warnings.push(format!(
                "{} is not a usual unit for {} (usual: {})",
                unit,
                record.display_name(),
                record.accepted_symbols().join(", ")
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::reference;
    use approx::assert_relative_eq;

    #[test]
    fn test_convert_analyte_logs_entry() {
        let reference = reference();
        let mut log = ConversionLog::new();

        let resp = convert_analyte(&reference, &mut log, "Glucose", 90.0, "mg/dL", "mmol/L").unwrap();
        assert_eq!(resp.analyte, "Glucose");
        assert_relative_eq!(resp.value_output, 4.99556, epsilon = 1e-5);
        assert_eq!(resp.value_output_rounded, 4.9956);
        assert_eq!(resp.formula, "mg/dL → mol/L → mmol/L");
        assert!(resp.warnings.is_empty());
        assert_eq!(resp.history_size, 1);

        let entry = log.latest().unwrap();
        assert_eq!(entry.analyte, "Glucose");
        assert_eq!(entry.value_output, 4.9956);
        assert_eq!(entry.molar_mass, 180.16);
    }

    #[test]
    fn test_convert_analyte_canonicalizes_units() {
        let reference = reference();
        let mut log = ConversionLog::new();

        let resp =
            convert_analyte(&reference, &mut log, "creatinine", 90.0, "umol / l", "MG/DL").unwrap();
        assert_eq!(resp.unit_from, "µmol/L");
        assert_eq!(resp.unit_to, "mg/dL");
        assert_relative_eq!(resp.value_output, 1.01808, epsilon = 1e-4);
        assert_eq!(log.latest().unwrap().unit_from, "µmol/L");
    }

    #[test]
    fn test_convert_analyte_unknown() {
        let reference = reference();
        let mut log = ConversionLog::new();
        let err = convert_analyte(&reference, &mut log, "unobtainium", 1.0, "g/L", "mmol/L")
            .unwrap_err();
        assert!(err.contains("Unknown analyte 'unobtainium'"));
        assert!(err.contains("glucose"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_convert_analyte_rejections_not_logged() {
        let reference = reference();
        let mut log = ConversionLog::new();

        let err = convert_analyte(&reference, &mut log, "glucose", -1.0, "mg/dL", "mmol/L")
            .unwrap_err();
        assert!(err.starts_with("Invalid input"));

        let err = convert_analyte(&reference, &mut log, "glucose", 1.0, "mg/mL", "mmol/L")
            .unwrap_err();
        assert!(err.contains("Unsupported unit 'mg/mL'"));
        assert!(err.contains("µmol/L, mmol/L, g/L, mg/dL"));

        assert!(log.is_empty());
    }

    #[test]
    fn test_convert_analyte_warnings() {
        let reference = reference();
        let mut log = ConversionLog::new();

        let resp = convert_analyte(&reference, &mut log, "glucose", 5.0, "mmol/L", "mmol/L").unwrap();
        assert_eq!(resp.value_output, 5.0);
        assert_eq!(resp.warnings.len(), 1);

        // creatinine is reported in µmol/L and mg/dL only
        let resp = convert_analyte(&reference, &mut log, "creatinine", 1.0, "g/L", "µmol/L").unwrap();
        assert_eq!(resp.warnings.len(), 1);
        assert!(resp.warnings[0].starts_with("g/L is not a usual unit for Creatinine"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_zero_converts_to_zero() {
        let reference = reference();
        let mut log = ConversionLog::new();
        let resp = convert_analyte(&reference, &mut log, "uree", 0.0, "mmol/L", "g/L").unwrap();
        assert_eq!(resp.value_output, 0.0);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_huge_value_keeps_finite_rounding() {
        let reference = reference();
        let mut log = ConversionLog::new();
        let resp = convert_analyte(&reference, &mut log, "glucose", 1e305, "mg/dL", "mg/dL").unwrap();
        assert_relative_eq!(resp.value_output, 1e305, max_relative = 1e-12);
        assert_eq!(resp.value_output_rounded, resp.value_output);
        assert_eq!(log.latest().unwrap().value_output, resp.value_output);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["value_output_rounded"].as_f64(), Some(resp.value_output));
        assert!(!log.to_csv().contains("inf"));
    }

    #[test]
    fn test_convert_with_molar_mass() {
        let resp = convert_with_molar_mass(200.0, "mg/dL", "mmol/L", 386.65).unwrap();
        assert_relative_eq!(resp.value_output, 5.1726, epsilon = 1e-4);
        assert_eq!(resp.unit_from, "mg/dL");

        assert!(convert_with_molar_mass(100.0, "mg/dL", "mmol/L", 0.0)
            .unwrap_err()
            .starts_with("Invalid input"));
    }
}
