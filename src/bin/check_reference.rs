//! Utility to validate a reference dataset and print its contents
//!
//! Usage: check_reference [PATH]

use std::path::PathBuf;

use buc::reference::ReferenceData;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(buc::config::reference_data_path);
    println!("Reference data: {}", data_path.display());

    let reference = match ReferenceData::open(&data_path) {
        Ok(reference) => reference,
        Err(e) => {
            eprintln!("Invalid reference data: {}", e);
            std::process::exit(1);
        }
    };

    let table = reference.snapshot();
    println!("{} analytes:", table.len());
    for record in table.iter() {
        println!(
            "  {:<16} {:>10.2} {:<6} [{}]  {}",
            record.name,
            record.molar_mass,
            record.reference_unit,
            record.accepted_symbols().join(", "),
            record.source
        );
    }

    Ok(())
}
