//! Checks against the bundled reference dataset

use std::path::PathBuf;

use approx::assert_relative_eq;
use buc::conversion::{convert, convert_units, ConcentrationUnit};
use buc::models::ConversionLog;
use buc::reference::ReferenceData;
use buc::tools::convert::convert_analyte;

fn bundled() -> ReferenceData {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("scientific_data.csv");
    ReferenceData::open(path).unwrap()
}

#[test]
fn bundled_dataset_loads() {
    let reference = bundled();
    let names = reference.list_all();
    for expected in ["creatinine", "uree", "glucose", "cholesterol"] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
    assert_eq!(&names[..4], ["creatinine", "uree", "glucose", "cholesterol"]);
    assert_eq!(names.len() as u64, buc::build_info::BUNDLED_ANALYTES);
}

#[test]
fn molar_masses_match_sources() {
    let reference = bundled();
    let table = reference.snapshot();
    assert_eq!(table.molar_mass("creatinine"), Some(113.12));
    assert_eq!(table.molar_mass("Glucose"), Some(180.16));
    assert_eq!(table.molar_mass("CHOLESTEROL"), Some(386.65));
    assert_eq!(table.molar_mass("nonexistent"), None);

    let units = table.common_units("creatinine").unwrap();
    assert!(units.contains(&ConcentrationUnit::MicromolPerLiter));
    assert!(table.common_units("nonexistent").is_none());

    let triglycerides = reference.lookup("triglycerides").unwrap();
    assert_eq!(triglycerides.source, "Triolein, PubChem");
}

#[test]
fn clinical_reference_values() {
    let reference = bundled();
    let mm = |name: &str| reference.lookup(name).unwrap().molar_mass;

    assert_relative_eq!(convert(70.0, "mg/dL", "mmol/L", mm("glucose")).unwrap(), 3.885, epsilon = 1e-3);
    assert_relative_eq!(convert(100.0, "mg/dL", "mmol/L", mm("glucose")).unwrap(), 5.551, epsilon = 1e-3);
    assert_relative_eq!(convert(90.0, "µmol/L", "mg/dL", mm("creatinine")).unwrap(), 1.018, epsilon = 1e-3);
    assert_relative_eq!(convert(200.0, "mg/dL", "mmol/L", mm("cholesterol")).unwrap(), 5.1726, epsilon = 1e-4);
    assert_relative_eq!(convert(19243.0, "µmol/L", "g/L", mm("creatinine")).unwrap(), 2.1767, epsilon = 1e-4);
    assert_relative_eq!(convert(1000.0, "µmol/L", "mmol/L", mm("creatinine")).unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn every_analyte_round_trips_through_its_units() {
    let reference = bundled();
    for record in reference.snapshot().iter() {
        for &from in &record.accepted_units {
            for to in ConcentrationUnit::ALL {
                let there = convert_units(12.5, from, to, record.molar_mass).unwrap();
                let back = convert_units(there, to, from, record.molar_mass).unwrap();
                assert_relative_eq!(back, 12.5, max_relative = 1e-9);
            }
        }
    }
}

#[test]
fn session_log_keeps_fifty_newest() {
    let reference = bundled();
    let mut log = ConversionLog::new();
    for n in 0..51 {
        convert_analyte(&reference, &mut log, "glucose", n as f64, "mg/dL", "mmol/L").unwrap();
    }
    assert_eq!(log.len(), 50);
    assert_eq!(log.latest().unwrap().value_input, 50.0);
    assert_eq!(log.entries().last().unwrap().value_input, 1.0);
}
