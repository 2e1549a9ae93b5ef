//! Build information module
//!
//! Values stamped in by `build.rs`: build number, build time, and the size
//! of the reference dataset shipped with this build.

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Incremented on each recompilation
pub const BUILD_NUMBER: u64 = env_u64(option_env!("BUC_BUILD_NUMBER"));

/// ISO 8601, UTC
pub const BUILD_TIMESTAMP: &str = match option_env!("BUC_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Analyte rows in `data/scientific_data.csv` at build time
pub const BUNDLED_ANALYTES: u64 = env_u64(option_env!("BUC_BUNDLED_ANALYTES"));

/// `str::parse` is not const; anything but plain digits reads as 0
const fn env_u64(value: Option<&str>) -> u64 {
    let bytes = match value {
        Some(s) => s.as_bytes(),
        None => return 0,
    };
    if bytes.is_empty() {
        return 0;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return 0;
        }
        result = result * 10 + (b - b'0') as u64;
        i += 1;
    }
    result
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub bundled_analytes: u64,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            bundled_analytes: BUNDLED_ANALYTES,
        }
    }

    /// HTTP User-Agent for outbound requests, e.g. "buc/1.0.0 (build 42)"
    pub fn user_agent(&self) -> String {
        format!("{}/{} (build {})", self.name, self.version, self.build_number)
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Biochemical Unit Converter (BUC)");
    eprintln!("  {}", DESCRIPTION);
    eprintln!("  Version: {} | Build: {}", info.version, info.build_number);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("  Bundled analytes: {}", info.bundled_analytes);
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_u64() {
        assert_eq!(env_u64(None), 0);
        assert_eq!(env_u64(Some("")), 0);
        assert_eq!(env_u64(Some("1234")), 1234);
        assert_eq!(env_u64(Some("12a")), 0);
    }

    #[test]
    fn test_build_info_current() {
        let info = BuildInfo::current();
        assert_eq!(info.name, "buc");
        assert!(info.build_number >= 1);
        assert!(info.bundled_analytes > 0);
    }

    #[test]
    fn test_user_agent() {
        let info = BuildInfo {
            build_number: 7,
            ..BuildInfo::current()
        };
        assert_eq!(info.user_agent(), format!("buc/{} (build 7)", VERSION));
    }
}
