//! Concentration unit vocabulary and scale table
//!
//! Every unit converts through moles per liter. Each unit owns a pair of
//! scale functions into and out of that canonical representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four supported clinical concentration units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConcentrationUnit {
    #[serde(rename = "µmol/L", alias = "umol/L")]
    MicromolPerLiter,
    #[serde(rename = "mmol/L")]
    MillimolPerLiter,
    #[serde(rename = "g/L")]
    GramsPerLiter,
    #[serde(rename = "mg/dL")]
    MilligramsPerDeciliter,
}

/// Scale functions between a unit and moles per liter.
///
/// Both take `(value, molar_mass)`; molar units ignore the molar mass.
#[derive(Clone, Copy)]
pub struct UnitScale {
    pub to_mol_per_liter: fn(f64, f64) -> f64,
    pub from_mol_per_liter: fn(f64, f64) -> f64,
}

// ============================================================================
// Conversion Constants
// ============================================================================

/// Moles per micromole
pub const MOL_PER_UMOL: f64 = 1e-6;
/// Micromoles per mole
pub const UMOL_PER_MOL: f64 = 1e6;
/// Moles per millimole
pub const MOL_PER_MMOL: f64 = 1e-3;
/// Millimoles per mole
pub const MMOL_PER_MOL: f64 = 1e3;
/// Deciliters per liter (mg/dL -> g/L divides by this)
pub const DL_PER_L: f64 = 100.0;

/// Indexed by `ConcentrationUnit::index`
const SCALES: [UnitScale; 4] = [
    UnitScale {
        to_mol_per_liter: |v, _| v * MOL_PER_UMOL,
        from_mol_per_liter: |m, _| m * UMOL_PER_MOL,
    },
    UnitScale {
        to_mol_per_liter: |v, _| v * MOL_PER_MMOL,
        from_mol_per_liter: |m, _| m * MMOL_PER_MOL,
    },
    UnitScale {
        to_mol_per_liter: |v, mm| v / mm,
        from_mol_per_liter: |m, mm| m * mm,
    },
    UnitScale {
        to_mol_per_liter: |v, mm| v / DL_PER_L / mm,
        from_mol_per_liter: |m, mm| m * mm * DL_PER_L,
    },
];

impl ConcentrationUnit {
    /// All units, in display order
    pub const ALL: [ConcentrationUnit; 4] = [
        ConcentrationUnit::MicromolPerLiter,
        ConcentrationUnit::MillimolPerLiter,
        ConcentrationUnit::GramsPerLiter,
        ConcentrationUnit::MilligramsPerDeciliter,
    ];

    fn index(self) -> usize {
        match self {
            ConcentrationUnit::MicromolPerLiter => 0,
            ConcentrationUnit::MillimolPerLiter => 1,
            ConcentrationUnit::GramsPerLiter => 2,
            ConcentrationUnit::MilligramsPerDeciliter => 3,
        }
    }

    /// Canonical display symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ConcentrationUnit::MicromolPerLiter => "µmol/L",
            ConcentrationUnit::MillimolPerLiter => "mmol/L",
            ConcentrationUnit::GramsPerLiter => "g/L",
            ConcentrationUnit::MilligramsPerDeciliter => "mg/dL",
        }
    }

    /// Spellings accepted on input, before normalization
    pub fn accepted_spellings(&self) -> &'static [&'static str] {
        match self {
            ConcentrationUnit::MicromolPerLiter => &["µmol/L", "umol/L"],
            ConcentrationUnit::MillimolPerLiter => &["mmol/L"],
            ConcentrationUnit::GramsPerLiter => &["g/L"],
            ConcentrationUnit::MilligramsPerDeciliter => &["mg/dL"],
        }
    }

    /// Long-form name for instructions and listings
    pub fn display_name(&self) -> &'static str {
        match self {
            ConcentrationUnit::MicromolPerLiter => "micromoles per liter",
            ConcentrationUnit::MillimolPerLiter => "millimoles per liter",
            ConcentrationUnit::GramsPerLiter => "grams per liter",
            ConcentrationUnit::MilligramsPerDeciliter => "milligrams per deciliter",
        }
    }

    /// Whether the unit is amount-of-substance based (molar mass irrelevant)
    pub fn is_molar(&self) -> bool {
        matches!(
            self,
            ConcentrationUnit::MicromolPerLiter | ConcentrationUnit::MillimolPerLiter
        )
    }

    pub fn scale(&self) -> &'static UnitScale {
        &SCALES[self.index()]
    }

    /// Parse a unit symbol, ignoring case and whitespace
    ///
    /// Examples: "mmol/L", "MMOL/L", "mmol / l", "µmol/L", "umol/l", "μmol/L"
    pub fn parse(symbol: &str) -> Option<Self> {
        match normalize_symbol(symbol).as_str() {
            // U+00B5 MICRO SIGN and U+03BC GREEK SMALL LETTER MU
            "µmol/l" | "μmol/l" | "umol/l" => Some(ConcentrationUnit::MicromolPerLiter),
            "mmol/l" => Some(ConcentrationUnit::MillimolPerLiter),
            "g/l" => Some(ConcentrationUnit::GramsPerLiter),
            "mg/dl" => Some(ConcentrationUnit::MilligramsPerDeciliter),
            _ => None,
        }
    }
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Lowercase and strip every whitespace character
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Canonical symbols of the whole vocabulary
pub fn unit_symbols() -> Vec<&'static str> {
    ConcentrationUnit::ALL.iter().map(|u| u.symbol()).collect()
}
