//! Runtime configuration (ambient stack, SPEC_FULL.md §10.3).
//!
//! Grounded on the teacher's `storage::Config`: a plain struct with
//! sensible defaults, loaded from a single file under the platform config
//! directory, where a missing or malformed file falls back to the default
//! with a logged warning rather than aborting startup. The teacher reads
//! `configparser::ini::Ini`; this crate has no other use for an INI parser
//! once the TUI and export layers are gone, so it reads TOML via `toml`
//! instead (a crate the pack already depends on for event serialization
//! elsewhere, and the more idiomatic default for Rust CLI config files).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Config-visible knobs design note 9 calls out: bit-buffer capacities,
/// default slicer tolerance, and which decoder priority levels start
/// disabled.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub bitbuf_rows: usize,
    pub bitbuf_cols: usize,
    pub default_tolerance_us: u32,
    pub disabled_priorities: Vec<i32>,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"info"` or
    /// `"pulsecode=debug"`.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bitbuf_rows: crate::bitbuffer::BITBUF_ROWS,
            bitbuf_cols: crate::bitbuffer::BITBUF_COLS,
            default_tolerance_us: 0,
            disabled_priorities: Vec::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// The conventional config file location: `<config_dir>/pulsecode/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("pulsecode").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`, or fall back to [`RuntimeConfig::default`] with a
    /// warning if the file is missing, unreadable, or malformed — mirrors
    /// the teacher's `load_from_ini` fallback-on-error pattern
    /// (`storage::Config`), generalized from per-key fallback to
    /// whole-file fallback since TOML deserialization either succeeds or
    /// it doesn't.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn disabled_priority_set(&self) -> HashSet<i32> {
        self.disabled_priorities.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_default() {
        let cfg = RuntimeConfig::load_or_default(Path::new("/nonexistent/pulsecode/config.toml"));
        assert_eq!(cfg.bitbuf_rows, crate::bitbuffer::BITBUF_ROWS);
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let dir = std::env::temp_dir().join("pulsecode-test-malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        let cfg = RuntimeConfig::load_or_default(&path);
        assert_eq!(cfg.log_filter, "info");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn valid_file_overrides_defaults() {
        let dir = std::env::temp_dir().join("pulsecode-test-valid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "bitbuf_rows = 10\nlog_filter = \"debug\"\n").unwrap();
        let cfg = RuntimeConfig::load_or_default(&path);
        assert_eq!(cfg.bitbuf_rows, 10);
        assert_eq!(cfg.log_filter, "debug");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
