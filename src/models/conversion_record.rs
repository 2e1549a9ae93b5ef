//! Conversion history model
//!
//! Session-scoped log of completed conversions, newest first, capped at
//! `MAX_HISTORY_ENTRIES`.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::conversion::ConcentrationUnit;
use crate::reference::tabular::{join_record, UTF8_BOM};
use crate::reference::AnalyteRecord;

/// Maximum number of entries kept in a session log
pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Decimal places kept for the logged output value
pub const LOGGED_OUTPUT_DECIMALS: i32 = 4;

/// Timestamp format used in log entries and exports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the history export
pub const EXPORT_COLUMNS: [&str; 8] = [
    "timestamp",
    "analyte",
    "value_input",
    "unit_from",
    "value_output",
    "unit_to",
    "molar_mass",
    "source",
];

/// One completed conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub timestamp: String,
    /// Analyte display name
    pub analyte: String,
    pub value_input: f64,
    pub unit_from: String,
    /// Rounded to `LOGGED_OUTPUT_DECIMALS`
    pub value_output: f64,
    pub unit_to: String,
    pub molar_mass: f64,
    pub source: String,
}

impl ConversionRecord {
    /// Build a log entry stamped with the current local time
    pub fn new(
        analyte: &AnalyteRecord,
        value_input: f64,
        unit_from: ConcentrationUnit,
        value_output: f64,
        unit_to: ConcentrationUnit,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            analyte: analyte.display_name(),
            value_input,
            unit_from: unit_from.symbol().to_string(),
            value_output: round_to(value_output, LOGGED_OUTPUT_DECIMALS),
            unit_to: unit_to.symbol().to_string(),
            molar_mass: analyte.molar_mass,
            source: analyte.source.clone(),
        }
    }

    fn to_csv_row(&self) -> String {
        join_record(&[
            self.timestamp.clone(),
            self.analyte.clone(),
            self.value_input.to_string(),
            self.unit_from.clone(),
            self.value_output.to_string(),
            self.unit_to.clone(),
            self.molar_mass.to_string(),
            self.source.clone(),
        ])
    }
}

/// Round half away from zero to `decimals` places
///
/// Values too large to scale without overflow are returned as is; they
/// carry no fractional digits at that magnitude.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Bounded, newest-first conversion history owned by one session
#[derive(Debug, Clone)]
pub struct ConversionLog {
    entries: VecDeque<ConversionRecord>,
    capacity: usize,
}

impl Default for ConversionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    /// Log with a custom cap (at least one entry)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add an entry at the head, evicting the oldest past the cap.
    ///
    /// Returns the evicted entry, if any.
    pub fn record(&mut self, entry: ConversionRecord) -> Option<ConversionRecord> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Entries newest first
    pub fn entries(&self) -> impl Iterator<Item = &ConversionRecord> {
        self.entries.iter()
    }

    /// Up to `limit` newest entries
    pub fn recent(&self, limit: usize) -> Vec<ConversionRecord> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn latest(&self) -> Option<&ConversionRecord> {
        self.entries.front()
    }

    /// Remove every entry, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Serialize the log as comma-separated text, newest first.
    ///
    /// Starts with a UTF-8 byte order mark so spreadsheet tools keep "µ".
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push(UTF8_BOM);
        out.push_str(&join_record(&EXPORT_COLUMNS));
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.to_csv_row());
            out.push('\n');
        }
        out
    }

    /// Write `to_csv` output to a file
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<usize> {
        fs::write(path, self.to_csv())?;
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> ConversionRecord {
        ConversionRecord {
            timestamp: format!("2026-01-01 00:00:{:02}", n % 60),
            analyte: "Glucose".to_string(),
            value_input: n as f64,
            unit_from: "mg/dL".to_string(),
            value_output: n as f64 / 18.016,
            unit_to: "mmol/L".to_string(),
            molar_mass: 180.16,
            source: "PubChem".to_string(),
        }
    }

    fn glucose() -> AnalyteRecord {
        AnalyteRecord {
            name: "glucose".to_string(),
            molar_mass: 180.16,
            reference_unit: "g/mol".to_string(),
            source: "PubChem (NIH)".to_string(),
            accepted_units: vec![ConcentrationUnit::MillimolPerLiter],
        }
    }

    #[test]
    fn test_record_is_newest_first() {
        let mut log = ConversionLog::new();
        log.record(entry(1));
        log.record(entry(2));
        log.record(entry(3));
        let inputs: Vec<f64> = log.entries().map(|e| e.value_input).collect();
        assert_eq!(inputs, vec![3.0, 2.0, 1.0]);
        assert_eq!(log.latest().unwrap().value_input, 3.0);
    }

    #[test]
    fn test_51st_entry_evicts_oldest() {
        let mut log = ConversionLog::new();
        for n in 1..=MAX_HISTORY_ENTRIES {
            assert!(log.record(entry(n)).is_none());
        }
        assert_eq!(log.len(), MAX_HISTORY_ENTRIES);

        let evicted = log.record(entry(51)).unwrap();
        assert_eq!(evicted.value_input, 1.0);
        assert_eq!(log.len(), MAX_HISTORY_ENTRIES);

        let inputs: Vec<f64> = log.entries().map(|e| e.value_input).collect();
        let expected: Vec<f64> = (2..=51).rev().map(|n| n as f64).collect();
        assert_eq!(inputs, expected);
    }

    #[test]
    fn test_recent_and_clear() {
        let mut log = ConversionLog::with_capacity(5);
        for n in 1..=4 {
            log.record(entry(n));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].value_input, 4.0);

        assert_eq!(log.clear(), 4);
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn test_new_record_rounds_and_uses_symbols() {
        let record = ConversionRecord::new(
            &glucose(),
            90.0,
            ConcentrationUnit::MilligramsPerDeciliter,
            4.995559502664298,
            ConcentrationUnit::MillimolPerLiter,
        );
        assert_eq!(record.analyte, "Glucose");
        assert_eq!(record.value_output, 4.9956);
        assert_eq!(record.unit_from, "mg/dL");
        assert_eq!(record.unit_to, "mmol/L");
        assert_eq!(record.source, "PubChem (NIH)");
        assert!(chrono::NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_zero_output_is_kept() {
        let record = ConversionRecord::new(
            &glucose(),
            0.0,
            ConcentrationUnit::MilligramsPerDeciliter,
            0.0,
            ConcentrationUnit::MillimolPerLiter,
        );
        assert_eq!(record.value_output, 0.0);
    }

    #[test]
    fn test_to_csv() {
        let mut log = ConversionLog::new();
        let mut older = entry(1);
        older.source = "PubChem, NIH".to_string();
        log.record(older);
        let mut newer = entry(2);
        newer.unit_from = "µmol/L".to_string();
        log.record(newer);

        let csv = log.to_csv();
        assert!(csv.starts_with('\u{feff}'));

        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(
            lines[0],
            "timestamp,analyte,value_input,unit_from,value_output,unit_to,molar_mass,source"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("µmol/L"));
        assert!(lines[1].starts_with("2026-01-01 00:00:02,Glucose,2,"));
        assert!(lines[2].ends_with(",180.16,\"PubChem, NIH\""));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let mut log = ConversionLog::new();
        log.record(entry(7));

        assert_eq!(log.export_to(&path).unwrap(), 1);
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, log.to_csv());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(5.172643, 4), 5.1726);
        assert_eq!(round_to(2.17675, 2), 2.18);
        assert_eq!(round_to(0.0, 4), 0.0);
    }

    #[test]
    fn test_round_to_huge_values() {
        assert_eq!(round_to(1e305, 4), 1e305);
        assert_eq!(round_to(f64::MAX, 4), f64::MAX);
        assert_eq!(round_to(1e300, 4), 1e300);
    }
}
