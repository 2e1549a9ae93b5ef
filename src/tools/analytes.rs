//! Reference Data MCP Tools
//!
//! Listing analytes and units, and reloading the dataset.

use serde::Serialize;

use crate::conversion::ConcentrationUnit;
use crate::reference::{AnalyteRecord, ReferenceData};

/// Analyte summary for listing
#[derive(Debug, Serialize)]
pub struct AnalyteSummary {
    pub name: String,
    pub display_name: String,
    pub molar_mass: f64,
    pub common_units: Vec<&'static str>,
}

/// Response for list_analytes
#[derive(Debug, Serialize)]
pub struct ListAnalytesResponse {
    pub analytes: Vec<AnalyteSummary>,
    pub total: usize,
}

/// Full analyte detail
#[derive(Debug, Serialize)]
pub struct AnalyteDetail {
    pub name: String,
    pub display_name: String,
    pub molar_mass: f64,
    pub molar_mass_unit: String,
    pub source: String,
    pub common_units: Vec<&'static str>,
}

/// One unit of the vocabulary
#[derive(Debug, Serialize)]
pub struct UnitInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub accepted_spellings: &'static [&'static str],
    pub molar: bool,
}

/// Response for list_units
#[derive(Debug, Serialize)]
pub struct ListUnitsResponse {
    pub units: Vec<UnitInfo>,
    pub note: &'static str,
}

/// Response for reload_reference_data
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub path: String,
    pub analyte_count: usize,
    pub message: String,
}

impl From<&AnalyteRecord> for AnalyteSummary {
    fn from(record: &AnalyteRecord) -> Self {
        Self {
            name: record.name.clone(),
            display_name: record.display_name(),
            molar_mass: record.molar_mass,
            common_units: record.accepted_symbols(),
        }
    }
}

impl From<AnalyteRecord> for AnalyteDetail {
    fn from(record: AnalyteRecord) -> Self {
        let display_name = record.display_name();
        let common_units = record.accepted_symbols();
        Self {
            name: record.name,
            display_name,
            molar_mass: record.molar_mass,
            molar_mass_unit: record.reference_unit,
            source: record.source,
            common_units,
        }
    }
}

/// List every analyte in load order
pub fn list_analytes(reference: &ReferenceData) -> ListAnalytesResponse {
    let table = reference.snapshot();
    let analytes: Vec<AnalyteSummary> = table.iter().map(AnalyteSummary::from).collect();
    let total = analytes.len();
    ListAnalytesResponse { analytes, total }
}

/// Get one analyte by name (case-insensitive)
pub fn get_analyte(reference: &ReferenceData, name: &str) -> Option<AnalyteDetail> {
    reference.lookup(name).map(AnalyteDetail::from)
}

/// Describe the unit vocabulary
pub fn list_units() -> ListUnitsResponse {
    let units = ConcentrationUnit::ALL
        .iter()
        .map(|unit| UnitInfo {
            symbol: unit.symbol(),
            name: unit.display_name(),
            accepted_spellings: unit.accepted_spellings(),
            molar: unit.is_molar(),
        })
        .collect();

    ListUnitsResponse {
        units,
        note: "Symbols are matched ignoring case and spaces. Mass units use the analyte's molar mass.",
    }
}

/// Re-read the reference file; the previous data stays in service on failure
pub fn reload_reference(reference: &ReferenceData) -> Result<ReloadResponse, String> {
    let analyte_count = reference
        .reload()
        .map_err(|e| format!("Reload failed, previous data kept: {}", e))?;

    Ok(ReloadResponse {
        success: true,
        path: reference.path().display().to_string(),
        analyte_count,
        message: format!("Reloaded {} analytes", analyte_count),
    })
}
