//! Build script for BUC
//!
//! Bumps the build number, stamps the build time, and records how many
//! analytes the bundled reference dataset holds.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";
const BUNDLED_DATASET: &str = "data/scientific_data.csv";

fn next_build_number(path: &Path) -> u64 {
    let current: u64 = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    current + 1
}

/// Non-blank lines after the header; 0 if the file is missing
fn bundled_analyte_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|text| text.lines().skip(1).filter(|l| !l.trim().is_empty()).count())
        .unwrap_or(0)
}

fn main() {
    // Only rerun when sources or the bundled dataset change
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed={}", BUNDLED_DATASET);

    let build_number_path = Path::new(BUILD_NUMBER_FILE);
    let build_number = next_build_number(build_number_path);
    fs::write(build_number_path, build_number.to_string())
        .expect("Failed to write build number file");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let analytes = bundled_analyte_count(Path::new(BUNDLED_DATASET));

    println!("cargo:rustc-env=BUC_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=BUC_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=BUC_BUNDLED_ANALYTES={}", analytes);
    println!(
        "cargo:warning=BUC Build #{} at {} ({} bundled analytes)",
        build_number, timestamp, analytes
    );
}
