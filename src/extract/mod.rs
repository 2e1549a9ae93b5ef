//! Natural-language request extraction
//!
//! An extractor turns free text ("convert 90 mg/dL glucose to mmol/L") into
//! the structured fields of a conversion request. Its output is untrusted:
//! callers validate every field before converting.

pub mod anthropic;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use anthropic::AnthropicExtractor;

/// Extractor error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Natural-language extraction is not configured: {0}")]
    NotConfigured(String),

    #[error("Extractor did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Extractor unavailable: {0}")]
    Unavailable(String),

    #[error("Extractor returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// What the extractor is told about the vocabulary
#[derive(Debug, Clone)]
pub struct ExtractionContext<'a> {
    pub analytes: &'a [String],
    pub units: &'a [&'static str],
}

/// Fields pulled out of a free-text request; `None` means "not provided"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedRequest {
    pub analyte: Option<String>,
    pub value: Option<f64>,
    pub unit_from: Option<String>,
    pub unit_to: Option<String>,
}

impl ExtractedRequest {
    /// Validate an extractor payload field by field
    pub fn from_json(payload: &Value) -> ExtractResult<Self> {
        let object = payload.as_object().ok_or_else(|| {
            ExtractError::MalformedResponse("expected a JSON object".to_string())
        })?;

        Ok(Self {
            analyte: text_field(object.get("analyte"), "analyte")?,
            value: number_field(object.get("value"), "value")?,
            unit_from: text_field(object.get("unit_from"), "unit_from")?,
            unit_to: text_field(object.get("unit_to"), "unit_to")?,
        })
    }

    /// Names of the fields still missing for a conversion
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.analyte.is_none() {
            missing.push("analyte");
        }
        if self.value.is_none() {
            missing.push("value");
        }
        if self.unit_from.is_none() {
            missing.push("unit_from");
        }
        if self.unit_to.is_none() {
            missing.push("unit_to");
        }
        missing
    }
}

fn text_field(value: Option<&Value>, name: &str) -> ExtractResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(ExtractError::MalformedResponse(format!(
            "field '{}' should be a string, got {}",
            name, other
        ))),
    }
}

fn number_field(value: Option<&Value>, name: &str) -> ExtractResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
            ExtractError::MalformedResponse(format!("field '{}' is out of range", name))
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => decimal_text(s.trim())
            .and_then(|text| text.parse::<f64>().ok())
            .map(Some)
            .ok_or_else(|| {
                ExtractError::MalformedResponse(format!("field '{}' is not a number: '{}'", name, s))
            }),
        Some(other) => Err(ExtractError::MalformedResponse(format!(
            "field '{}' should be a number, got {}",
            name, other
        ))),
    }
}

/// Normalize a decimal comma to a point.
///
/// A comma is read as a decimal separator only when it is the only
/// separator and is not followed by exactly three digits, so "1,5" is 1.5
/// while "1,000" and "1,234.5" are refused rather than misread.
fn decimal_text(text: &str) -> Option<String> {
    let commas = text.matches(',').count();
    if commas == 0 {
        return Some(text.to_string());
    }
    if commas > 1 || text.contains('.') {
        return None;
    }
    let (_, fraction) = text.split_once(',')?;
    if fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(text.replacen(',', ".", 1))
}

/// A backend that maps free text onto request fields
#[async_trait]
pub trait RequestExtractor: Send + Sync {
    async fn extract(
        &self,
        text: &str,
        context: &ExtractionContext<'_>,
    ) -> ExtractResult<ExtractedRequest>;

    /// Short label for logs and status output
    fn name(&self) -> &str;
}
