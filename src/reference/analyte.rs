//! Analyte reference records
//!
//! Parses the reference dataset into an immutable, validated table of
//! analytes. Validation is all-or-nothing: one bad row fails the load.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use super::store::{DataError, DataResult};
use super::tabular::{split_record, LIST_DELIMITER, UTF8_BOM};
use crate::conversion::ConcentrationUnit;

/// Columns every dataset must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["analyte", "molar_mass", "unit", "source", "common_units"];

/// Reference properties of one analyte
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyteRecord {
    /// Lower-case canonical identifier
    pub name: String,
    /// Grams per mole, always > 0
    pub molar_mass: f64,
    /// The dataset's `unit` column, kept verbatim
    pub reference_unit: String,
    /// Citation for the molar mass
    pub source: String,
    /// Units commonly reported for this analyte, never empty
    pub accepted_units: Vec<ConcentrationUnit>,
}

impl AnalyteRecord {
    /// Human-friendly name: "uric_acid" -> "Uric acid"
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }

    pub fn accepts(&self, unit: ConcentrationUnit) -> bool {
        self.accepted_units.contains(&unit)
    }

    pub fn accepted_symbols(&self) -> Vec<&'static str> {
        self.accepted_units.iter().map(|u| u.symbol()).collect()
    }
}

/// Turn a canonical identifier into a display label
pub fn display_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize an analyte name for storage and lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Immutable, validated set of analytes in load order
#[derive(Debug, Clone, Default)]
pub struct AnalyteTable {
    records: Vec<AnalyteRecord>,
    index: HashMap<String, usize>,
}

/// Column positions resolved from the header
struct ColumnMap {
    analyte: usize,
    molar_mass: usize,
    unit: usize,
    source: usize,
    common_units: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> DataResult<Self> {
        let position = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| position(*c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DataError::Schema(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        }

        // Every lookup succeeded above
        let col = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            analyte: col("analyte"),
            molar_mass: col("molar_mass"),
            unit: col("unit"),
            source: col("source"),
            common_units: col("common_units"),
        })
    }
}

impl AnalyteTable {
    /// Load and validate a dataset file
    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DataError::SourceNotFound(path.to_path_buf()),
            _ => DataError::Io(e),
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse and validate a dataset held in memory
    pub fn parse_str(text: &str) -> DataResult<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse and validate a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> DataResult<Self> {
        let mut lines = reader.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    let line = line.trim_start_matches(UTF8_BOM);
                    if line.trim().is_empty() {
                        continue;
                    }
                    break split_record(line)
                        .map_err(|e| DataError::Schema(format!("header: {}", e)))?;
                }
                None => return Err(DataError::Schema("dataset is empty".to_string())),
            }
        };
        let columns = ColumnMap::from_header(&header)?;

        let mut table = AnalyteTable::default();
        for (line_idx, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_row(&line, &columns)
                .map_err(|msg| DataError::Schema(format!("line {}: {}", line_idx + 1, msg)))?;
            if table.index.contains_key(&record.name) {
                return Err(DataError::Schema(format!(
                    "line {}: duplicate analyte '{}'",
                    line_idx + 1,
                    record.name
                )));
            }
            table.index.insert(record.name.clone(), table.records.len());
            table.records.push(record);
        }

        if table.records.is_empty() {
            return Err(DataError::Schema("dataset contains no analyte rows".to_string()));
        }

        Ok(table)
    }

    /// Case-insensitive lookup; unknown analytes are `None`
    pub fn lookup(&self, name: &str) -> Option<&AnalyteRecord> {
        self.index
            .get(&normalize_name(name))
            .map(|&i| &self.records[i])
    }

    /// Analyte names in load order
    pub fn list_all(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn molar_mass(&self, name: &str) -> Option<f64> {
        self.lookup(name).map(|r| r.molar_mass)
    }

    pub fn common_units(&self, name: &str) -> Option<&[ConcentrationUnit]> {
        self.lookup(name).map(|r| r.accepted_units.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalyteRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_row(line: &str, columns: &ColumnMap) -> Result<AnalyteRecord, String> {
    let fields = split_record(line)?;

    let name = normalize_name(required_field(&fields, columns.analyte, "analyte")?);

    let raw_mass = required_field(&fields, columns.molar_mass, "molar_mass")?;
    let molar_mass: f64 = raw_mass
        .parse()
        .map_err(|_| format!("molar_mass '{}' is not a number", raw_mass))?;
    if !(molar_mass > 0.0) || !molar_mass.is_finite() {
        return Err(format!(
            "molar_mass for '{}' must be positive, got {}",
            name, raw_mass
        ));
    }

    let reference_unit = required_field(&fields, columns.unit, "unit")?.to_string();
    let source = required_field(&fields, columns.source, "source")?.to_string();

    let mut accepted_units = Vec::new();
    for symbol in required_field(&fields, columns.common_units, "common_units")?.split(LIST_DELIMITER) {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            continue;
        }
        let unit = ConcentrationUnit::parse(symbol)
            .ok_or_else(|| format!("common_units for '{}' has unsupported unit '{}'", name, symbol))?;
        if !accepted_units.contains(&unit) {
            accepted_units.push(unit);
        }
    }
    if accepted_units.is_empty() {
        return Err(format!("common_units for '{}' is empty", name));
    }

    Ok(AnalyteRecord {
        name,
        molar_mass,
        reference_unit,
        source,
        accepted_units,
    })
}

fn required_field<'a>(fields: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    match fields.get(idx).map(|f| f.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing value for '{}'", name)),
    }
}
