//! BUC MCP Server Implementation
//!
//! Implements the MCP server with all BUC tools.

use std::path::PathBuf;
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::extract::RequestExtractor;
use crate::models::ConversionLog;
use crate::reference::ReferenceData;
use crate::tools::analytes;
use crate::tools::ask;
use crate::tools::convert;
use crate::tools::history;
use crate::tools::status::StatusTracker;

/// BUC MCP Service
#[derive(Clone)]
pub struct BucService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    reference: ReferenceData,
    /// Conversion history of this session
    history: Arc<std::sync::Mutex<ConversionLog>>,
    extractor: Option<Arc<dyn RequestExtractor>>,
    extractor_timeout: Duration,
    export_dir: PathBuf,
    tool_router: ToolRouter<BucService>,
}

impl BucService {
    pub fn new(
        reference: ReferenceData,
        extractor: Option<Arc<dyn RequestExtractor>>,
        extractor_timeout: Duration,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                reference.path().to_path_buf(),
            ))),
            reference,
            history: Arc::new(std::sync::Mutex::new(ConversionLog::new())),
            extractor,
            extractor_timeout,
            export_dir,
            tool_router: Self::tool_router(),
        }
    }

    /// Every critical section leaves the log consistent, so a poisoned lock is usable
    fn history(&self) -> MutexGuard<'_, ConversionLog> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Reference Data Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetAnalyteParams {
    /// Analyte name, case-insensitive (e.g. "glucose", "uric_acid")
    pub name: String,
}

// ============================================================================
// Conversion Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertUnitsParams {
    /// Analyte name as listed by list_analytes
    pub analyte: String,
    /// Concentration value, zero or positive
    pub value: f64,
    /// Source unit: µmol/L, umol/L, mmol/L, g/L or mg/dL
    pub unit_from: String,
    /// Target unit: µmol/L, umol/L, mmol/L, g/L or mg/dL
    pub unit_to: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertWithMolarMassParams {
    pub value: f64,
    pub unit_from: String,
    pub unit_to: String,
    /// Molar mass in g/mol, greater than zero
    pub molar_mass: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AskParams {
    /// Free-text request, e.g. "what is 90 mg/dL of glucose in mmol/L?"
    pub text: String,
}

// ============================================================================
// History Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHistoryParams {
    /// Maximum entries to return (default 10)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportHistoryParams {
    /// Destination file; defaults to a timestamped file in the export directory
    pub file_path: Option<String>,
    /// Return the CSV text instead of writing a file
    #[serde(default)]
    pub inline: bool,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl BucService {
    // --- Status ---

    #[tool(description = "Get the current status of the BUC service including build info, reference data, history size, and process information")]
    async fn buc_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let analyte_count = self.reference.snapshot().len();
        let history_entries = self.history().len();
        let extractor = self.extractor.as_ref().map(|e| e.name().to_string());
        let status = tracker.get_status(analyte_count, history_entries, extractor);
        json_result(&status)
    }

    #[tool(description = "Get step-by-step instructions for converting concentrations. Call this when starting a conversion session or when unsure how to use the conversion tools.")]
    fn conversion_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::CONVERSION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(CONVERSION_INSTRUCTIONS)]))
    }

    // --- Reference Data ---

    #[tool(description = "List the supported concentration units with accepted spellings")]
    fn list_units(&self) -> Result<CallToolResult, McpError> {
        json_result(&analytes::list_units())
    }

    #[tool(description = "List all analytes in the reference data with molar mass and usual units")]
    fn list_analytes(&self) -> Result<CallToolResult, McpError> {
        json_result(&analytes::list_analytes(&self.reference))
    }

    #[tool(description = "Get one analyte's reference record: molar mass, source citation, and usual units")]
    fn get_analyte(&self, Parameters(p): Parameters<GetAnalyteParams>) -> Result<CallToolResult, McpError> {
        match analytes::get_analyte(&self.reference, &p.name) {
            Some(detail) => json_result(&detail),
            None => json_result(&serde_json::json!({
                "error": "Analyte not found",
                "name": p.name,
                "known_analytes": self.reference.list_all(),
            })),
        }
    }

    #[tool(description = "Reload the reference data file. On failure the previous data stays in service.")]
    fn reload_reference_data(&self) -> Result<CallToolResult, McpError> {
        let result = analytes::reload_reference(&self.reference)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Conversion ---

    #[tool(description = "Convert an analyte concentration between µmol/L, mmol/L, g/L and mg/dL using the analyte's molar mass. The conversion is added to the session history.")]
    fn convert_units(&self, Parameters(p): Parameters<ConvertUnitsParams>) -> Result<CallToolResult, McpError> {
        let result = {
            let mut log = self.history();
            convert::convert_analyte(&self.reference, &mut log, &p.analyte, p.value, &p.unit_from, &p.unit_to)
        }
        .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Convert a concentration with an explicit molar mass (g/mol), for substances not in the reference data. Not added to the history.")]
    fn convert_with_molar_mass(&self, Parameters(p): Parameters<ConvertWithMolarMassParams>) -> Result<CallToolResult, McpError> {
        let result = convert::convert_with_molar_mass(p.value, &p.unit_from, &p.unit_to, p.molar_mass)
            .map_err(|e| McpError::invalid_params(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Convert from a free-text request. Returns status converted, needs_clarification (ask the user for the missing fields), rejected, or not_understood (fall back to convert_units).")]
    async fn ask(&self, Parameters(p): Parameters<AskParams>) -> Result<CallToolResult, McpError> {
        let extracted = ask::extract_request(
            &self.reference,
            self.extractor.as_deref(),
            &p.text,
            self.extractor_timeout,
        )
        .await;

        let response = match extracted {
            Ok(extracted) => {
                let mut log = self.history();
                ask::resolve_request(&self.reference, &mut log, extracted)
            }
            Err(response) => response,
        };
        json_result(&response)
    }

    // --- History ---

    #[tool(description = "Show the session's conversion history, newest first (10 entries by default, 50 kept at most)")]
    fn get_history(&self, Parameters(p): Parameters<GetHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = history::get_history(&self.history(), p.limit);
        json_result(&result)
    }

    #[tool(description = "Clear the session's conversion history")]
    fn clear_history(&self) -> Result<CallToolResult, McpError> {
        let result = history::clear_history(&mut self.history());
        json_result(&result)
    }

    #[tool(description = "Export the conversion history as CSV (UTF-8 with BOM). Writes to file_path, or a timestamped file in the export directory, or returns the text when inline is true.")]
    fn export_history(&self, Parameters(p): Parameters<ExportHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = history::export_history(&self.history(), p.file_path.as_deref(), p.inline, &self.export_dir)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for BucService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "buc".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Biochemical Unit Converter".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Biochemical Unit Converter (BUC) - converts analyte concentrations between \
                 µmol/L, mmol/L, g/L and mg/dL using reference molar masses. \
                 IMPORTANT: Call conversion_instructions before the first conversion. \
                 Reference: list_units, list_analytes, get_analyte, reload_reference_data. \
                 Convert: convert_units (logged), convert_with_molar_mass (not logged), ask (free text). \
                 History: get_history, clear_history, export_history. \
                 Units only: never interpret results clinically."
                    .into(),
            ),
        }
    }
}
