//! BUC Status Tool
//!
//! Provides runtime status information about the BUC service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Conversion instructions for AI assistants
pub const CONVERSION_INSTRUCTIONS: &str = r#"
# BUC Conversion Instructions

This guide explains how to convert laboratory concentrations with the
Biochemical Unit Converter (BUC) tools.

## Supported Units

| Symbol | Meaning | Also accepted |
|--------|---------|---------------|
| µmol/L | micromoles per liter | umol/L |
| mmol/L | millimoles per liter | |
| g/L | grams per liter | |
| mg/dL | milligrams per deciliter | |

Symbols are matched ignoring case and spaces ("MMOL / l" works).
No other units are supported. Do not invent conversions for mEq/L, IU/L,
ng/mL or any other unit: tell the user it is unsupported.

## How Conversion Works

Every conversion goes through moles per liter:

1. Source unit → mol/L (µmol/L ×1e-6, mmol/L ×1e-3, g/L ÷ molar mass,
   mg/dL ÷100 ÷ molar mass)
2. mol/L → target unit (the inverse factor)

The molar mass comes from the reference data, so the analyte must be known.
Call `list_analytes` to see which analytes are available.

## Step-by-Step Workflow

### Manual entry (preferred when the user gives all four fields)

1. Call `convert_units` with `analyte`, `value`, `unit_from`, `unit_to`
2. Report `value_output_rounded` with the unit, and the `source` of the
   molar mass
3. Mention any `warnings` (same unit, or a unit not usual for the analyte)

### Free-text requests

1. Call `ask` with the user's sentence
2. Check `status`:
   - `converted`: report the result as above
   - `needs_clarification`: ask the user for the `missing` fields, offering
     `suggested_units` when a unit is missing
   - `rejected`: relay `message` (unknown analyte, unsupported unit,
     negative value)
   - `not_understood`: fall back to asking for the four fields and use
     `convert_units`

Never guess a missing unit. Ask.

### Known molar mass, unlisted analyte

Use `convert_with_molar_mass` with the molar mass in g/mol. These
conversions are not added to the history.

## History

- `get_history`: newest first, 10 by default
- `clear_history`: empties the session history
- `export_history`: writes a CSV (or returns it inline with `inline: true`)

The history keeps the 50 most recent conversions of this session only.

## Rules

- Values must be zero or positive
- Results of exactly 0 are valid
- This tool converts units only. It does not interpret results clinically.
"#;

/// Status information returned by the buc_status tool
#[derive(Debug, Serialize)]
pub struct BucStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Reference data information
    pub reference_data_path: String,
    pub reference_data_size_bytes: Option<u64>,
    pub analyte_count: usize,
    pub bundled_analyte_count: u64,

    /// Session information
    pub history_entries: usize,
    pub extractor: Option<String>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    reference_data_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(reference_data_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            reference_data_path,
        }
    }

    /// Get the current status
    pub fn get_status(
        &self,
        analyte_count: usize,
        history_entries: usize,
        extractor: Option<String>,
    ) -> BucStatus {
        let build_info = BuildInfo::current();

        let reference_data_size_bytes = std::fs::metadata(&self.reference_data_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        BucStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            reference_data_path: self.reference_data_path.display().to_string(),
            reference_data_size_bytes,
            analyte_count,
            bundled_analyte_count: build_info.bundled_analytes,
            history_entries,
            extractor,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
