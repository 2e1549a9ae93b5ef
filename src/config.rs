//! Environment configuration
//!
//! Every setting comes from an environment variable with a default.

use std::path::PathBuf;
use std::time::Duration;

pub const DATA_PATH_VAR: &str = "BUC_DATA_PATH";
pub const EXPORT_DIR_VAR: &str = "BUC_EXPORT_DIR";
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const MODEL_VAR: &str = "BUC_EXTRACTOR_MODEL";
pub const ENDPOINT_VAR: &str = "BUC_EXTRACTOR_URL";
pub const TIMEOUT_VAR: &str = "BUC_EXTRACTOR_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Directory the project lives in, found from the running executable
fn project_root() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }
    path
}

/// Get the reference dataset path from environment or use default
pub fn reference_data_path() -> PathBuf {
    std::env::var(DATA_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = project_root();
            path.push("data");
            path.push("scientific_data.csv");
            path
        })
}

/// Directory history exports are written to when no path is given
pub fn export_dir() -> PathBuf {
    std::env::var(EXPORT_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Settings for the natural-language extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: get(API_KEY_VAR),
            model: get(MODEL_VAR).unwrap_or(defaults.model),
            endpoint: get(ENDPOINT_VAR).unwrap_or(defaults.endpoint),
            timeout: get(TIMEOUT_VAR)
                .map(|raw| parse_timeout(&raw))
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_timeout(raw: &str) -> Duration {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            tracing::warn!(
                "Ignoring {}='{}', using {} seconds",
                TIMEOUT_VAR,
                raw,
                DEFAULT_TIMEOUT_SECS
            );
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        }
    }
}
