//! Natural-Language MCP Tool
//!
//! Runs free text through the extractor, then validates the extracted
//! fields against the reference data and unit vocabulary before handing
//! them to the same conversion path as manual entry.

use std::time::Duration;

use serde::Serialize;

use crate::conversion::{parse_unit, unit_symbols, validate_value, ConcentrationUnit};
use crate::extract::{ExtractError, ExtractedRequest, ExtractionContext, RequestExtractor};
use crate::models::ConversionLog;
use crate::reference::{AnalyteRecord, ReferenceData};
use crate::tools::convert::{convert_analyte, unknown_analyte_message, ConvertResponse};

/// Outcome of a natural-language request
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AskResponse {
    Converted {
        extracted: ExtractedRequest,
        result: ConvertResponse,
    },
    NeedsClarification {
        extracted: ExtractedRequest,
        missing: Vec<&'static str>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        suggested_units: Vec<&'static str>,
        message: String,
    },
    Rejected {
        extracted: ExtractedRequest,
        message: String,
    },
    NotUnderstood {
        message: String,
    },
}

impl AskResponse {
    pub fn status(&self) -> &'static str {
        match self {
            AskResponse::Converted { .. } => "converted",
            AskResponse::NeedsClarification { .. } => "needs_clarification",
            AskResponse::Rejected { .. } => "rejected",
            AskResponse::NotUnderstood { .. } => "not_understood",
        }
    }

    fn not_understood(message: impl Into<String>) -> Self {
        AskResponse::NotUnderstood { message: message.into() }
    }
}

/// Ask the extractor for request fields
///
/// Every failure comes back as a `NotUnderstood` response; manual
/// conversion stays available either way.
pub async fn extract_request(
    reference: &ReferenceData,
    extractor: Option<&dyn RequestExtractor>,
    text: &str,
    timeout: Duration,
) -> Result<ExtractedRequest, AskResponse> {
    if text.trim().is_empty() {
        return Err(AskResponse::not_understood("The request is empty"));
    }

    let extractor = extractor.ok_or_else(|| {
        AskResponse::not_understood(
            "Natural-language requests are disabled (set ANTHROPIC_API_KEY). \
             Use convert_units with analyte, value, unit_from and unit_to instead.",
        )
    })?;

    let analytes = reference.list_all();
    let units = unit_symbols();
    let context = ExtractionContext {
        analytes: &analytes,
        units: &units,
    };

    let outcome = match tokio::time::timeout(timeout, extractor.extract(text, &context)).await {
        Ok(result) => result,
        Err(_) => Err(ExtractError::Timeout(timeout.as_secs())),
    };

    outcome.map_err(|e| {
        tracing::warn!("Extractor {} failed: {}", extractor.name(), e);
        AskResponse::not_understood(format!(
            "Could not understand the request ({}). Try rephrasing, or use convert_units.",
            e
        ))
    })
}

/// Validate extracted fields and convert when everything is present
pub fn resolve_request(
    reference: &ReferenceData,
    log: &mut ConversionLog,
    extracted: ExtractedRequest,
) -> AskResponse {
    let record = match extracted.analyte.as_deref() {
        Some(name) => match reference.lookup(name) {
            Some(record) => Some(record),
            None => {
                let message = unknown_analyte_message(reference, name);
                return AskResponse::Rejected { extracted, message };
            }
        },
        None => None,
    };

    if let Err(e) = extracted.value.map(validate_value).transpose() {
        return AskResponse::Rejected { message: e.to_string(), extracted };
    }

    let from = match extracted.unit_from.as_deref().map(parse_unit).transpose() {
        Ok(unit) => unit,
        Err(e) => return AskResponse::Rejected { message: e.to_string(), extracted },
    };
    if let Err(e) = extracted.unit_to.as_deref().map(parse_unit).transpose() {
        return AskResponse::Rejected { message: e.to_string(), extracted };
    }

    let missing = extracted.missing_fields();
    if !missing.is_empty() {
        let suggested_units = suggest_units(record.as_ref(), from);
        let message = clarification_message(&missing, reference);
        return AskResponse::NeedsClarification {
            extracted,
            missing,
            suggested_units,
            message,
        };
    }

    let (Some(analyte), Some(value), Some(unit_from), Some(unit_to)) = (
        extracted.analyte.as_deref(),
        extracted.value,
        extracted.unit_from.as_deref(),
        extracted.unit_to.as_deref(),
    ) else {
        return AskResponse::not_understood("Incomplete request");
    };

    match convert_analyte(reference, log, analyte, value, unit_from, unit_to) {
        Ok(result) => AskResponse::Converted { extracted, result },
        Err(message) => AskResponse::Rejected { extracted, message },
    }
}

/// Units to offer when a unit is missing: the analyte's usual units
/// other than the source unit, or the whole vocabulary
fn suggest_units(
    record: Option<&AnalyteRecord>,
    from: Option<ConcentrationUnit>,
) -> Vec<&'static str> {
    let candidates: Vec<ConcentrationUnit> = match record {
        Some(record) => record.accepted_units.clone(),
        None => ConcentrationUnit::ALL.to_vec(),
    };
    let suggested: Vec<&'static str> = candidates
        .iter()
        .filter(|unit| Some(**unit) != from)
        .map(|unit| unit.symbol())
        .collect();

    if suggested.is_empty() {
        ConcentrationUnit::ALL
            .iter()
            .filter(|unit| Some(**unit) != from)
            .map(|unit| unit.symbol())
            .collect()
    } else {
        suggested
    }
}

fn clarification_message(missing: &[&'static str], reference: &ReferenceData) -> String {
    let mut message = format!("Please specify: {}.", missing.join(", "));
    if missing.contains(&"analyte") {
        message.push_str(&format!(" Known analytes: {}.", reference.list_all().join(", ")));
    }
    if missing.contains(&"unit_to") && !missing.contains(&"unit_from") {
        message.push_str(" Which unit should the value be converted to?");
    }
    message
}
