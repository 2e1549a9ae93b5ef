//! One-shot conversion from the command line
//!
//! Usage: convert <analyte> <value> <from> <to> [--data PATH]

use std::path::PathBuf;

use buc::conversion::{conversion_formula, convert_units, resolve_units};
use buc::reference::ReferenceData;

const USAGE: &str = "Usage: convert <analyte> <value> <from> <to> [--data PATH]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut data_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--data" {
            data_path = Some(PathBuf::from(args.next().ok_or(USAGE)?));
        } else {
            positional.push(arg);
        }
    }

    let [analyte, value, from, to] = positional.as_slice() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;

    let data_path = data_path.unwrap_or_else(buc::config::reference_data_path);
    let reference = ReferenceData::open(&data_path)?;

    let record = match reference.lookup(analyte) {
        Some(record) => record,
        None => {
            eprintln!(
                "Unknown analyte '{}'. Known analytes: {}",
                analyte,
                reference.list_all().join(", ")
            );
            std::process::exit(1);
        }
    };

    let (from, to) = resolve_units(value, from, to, record.molar_mass)?;
    let result = convert_units(value, from, to, record.molar_mass)?;

    println!(
        "{}: {} {} = {:.4} {}",
        record.display_name(),
        value,
        from,
        result,
        to
    );
    println!("  {}", conversion_formula(from, to));
    println!("  molar mass {} g/mol ({})", record.molar_mass, record.source);

    Ok(())
}
