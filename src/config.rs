use std::path::Path;

use serde::{Deserialize, Serialize};

/// Hard safety ceiling: files larger than this are always skipped, regardless
/// of config. Protects low-RAM machines from parsing a 10 MB minified bundle.
pub const ABSOLUTE_MAX_FILE_BYTES: u64 = 1_000_000;

/// Environment override for the per-file line limit; sits between the CLI
/// flag and the config file in precedence.
pub const LINE_LIMIT_ENV: &str = "CODESHEAR_LINE_LIMIT";

/// Controls workspace scanning behavior (what to skip).
///
/// `.gitignore` is always respected by the scanner; these are additional hard
/// skips for noisy directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names to skip anywhere in the tree (e.g. "generated").
    pub exclude_dir_names: Vec<String>,
    pub max_file_bytes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dir_names: vec![],
            // 512 KB default: enough for any real source file, blocks
            // log/generated bloat.
            max_file_bytes: 512 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-file line budget. Unset means files pass through untruncated.
    pub line_limit: Option<usize>,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_limit: None,
            scan: ScanConfig::default(),
        }
    }
}

impl Config {
    pub fn effective_max_file_bytes(&self) -> u64 {
        self.scan.max_file_bytes.min(ABSOLUTE_MAX_FILE_BYTES)
    }
}

/// Read `.codeshear.json` from the scan root; defaults on any failure.
pub fn load_config(root: &Path) -> Config {
    let primary = root.join(".codeshear.json");

    let Ok(text) = std::fs::read_to_string(&primary) else {
        return Config::default();
    };
    serde_json::from_str::<Config>(&text).unwrap_or_else(|_| Config::default())
}

/// Resolve the effective line limit: CLI flag > environment > config > unset.
pub fn resolve_line_limit(
    cli: Option<usize>,
    env: Option<&str>,
    config: Option<usize>,
) -> Option<usize> {
    if cli.is_some() {
        return cli;
    }
    if let Some(raw) = env {
        if let Ok(v) = raw.trim().parse::<usize>() {
            return Some(v);
        }
    }
    config
}
