//! History MCP Tools
//!
//! Preview, clear and export the session's conversion log.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::{ConversionLog, ConversionRecord};

/// Default number of entries shown by get_history
pub const DEFAULT_PREVIEW: usize = 10;

/// Response for get_history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<ConversionRecord>,
    pub showing: usize,
    pub total: usize,
    pub capacity: usize,
    pub more: usize,
}

/// Response for clear_history
#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub success: bool,
    pub cleared: usize,
    pub message: String,
}

/// Response for export_history
#[derive(Debug, Serialize)]
pub struct ExportHistoryResponse {
    pub success: bool,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<String>,
    pub message: String,
}

/// Newest entries first, `limit` at most
pub fn get_history(log: &ConversionLog, limit: Option<usize>) -> HistoryResponse {
    let entries = log.recent(limit.unwrap_or(DEFAULT_PREVIEW));
    let showing = entries.len();
    HistoryResponse {
        entries,
        showing,
        total: log.len(),
        capacity: log.capacity(),
        more: log.len() - showing,
    }
}

pub fn clear_history(log: &mut ConversionLog) -> ClearHistoryResponse {
    let cleared = log.clear();
    tracing::info!("Cleared {} history entries", cleared);
    ClearHistoryResponse {
        success: true,
        cleared,
        message: format!("Cleared {} conversions", cleared),
    }
}

/// File name used when the caller gives no path
pub fn default_export_name() -> String {
    format!(
        "conversion_history_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Export the log as CSV, to a file or inline
///
/// With `inline` set the text is returned instead of written. Otherwise it
/// goes to `file_path`, or a timestamped file in `export_dir`.
pub fn export_history(
    log: &ConversionLog,
    file_path: Option<&str>,
    inline: bool,
    export_dir: &Path,
) -> Result<ExportHistoryResponse, String> {
    if log.is_empty() {
        return Ok(ExportHistoryResponse {
            success: false,
            rows: 0,
            file_path: None,
            csv: None,
            message: "No conversions to export yet".to_string(),
        });
    }

    if inline {
        return Ok(ExportHistoryResponse {
            success: true,
            rows: log.len(),
            file_path: None,
            csv: Some(log.to_csv()),
            message: format!("Exported {} conversions", log.len()),
        });
    }

    let target = match file_path {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p.trim()),
        _ => export_dir.join(default_export_name()),
    };

    let rows = log
        .export_to(&target)
        .map_err(|e| format!("Failed to write {}: {}", target.display(), e))?;

    tracing::info!("Exported {} conversions to {}", rows, target.display());

    Ok(ExportHistoryResponse {
        success: true,
        rows,
        file_path: Some(target.display().to_string()),
        csv: None,
        message: format!("Exported {} conversions to {}", rows, target.display()),
    })
}
