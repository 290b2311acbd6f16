use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cell::mask::DEFAULT_MASK_CHAR;
use crate::cell::CellOptions;
use crate::errors::{CypherCellError, Result};

/// Default cell policy, loaded from `.cyphercell.toml`.
///
/// Every field has a sensible default so cells work out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Time-to-live in seconds for new cells. Absent means no expiry.
    #[serde(default)]
    pub default_ttl_secs: Option<u64>,

    /// Whether new cells are wiped after their first successful read.
    #[serde(default)]
    pub volatile: bool,

    /// Whether to `mlock` secret buffers (best effort).
    #[serde(default = "default_lock_memory")]
    pub lock_memory: bool,

    /// Character used for masked disclosure.
    #[serde(default = "default_mask_char")]
    pub mask_char: char,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_lock_memory() -> bool {
    true
}

fn default_mask_char() -> char {
    DEFAULT_MASK_CHAR
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_ttl_secs: None,
            volatile: false,
            lock_memory: default_lock_memory(),
            mask_char: default_mask_char(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the given directory.
    pub const FILE_NAME: &'static str = ".cyphercell.toml";

    /// Load settings from `<dir>/.cyphercell.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        Self::from_toml_str(&contents).map_err(|e| match e {
            CypherCellError::ConfigError(msg) => CypherCellError::ConfigError(format!(
                "Failed to parse {}: {msg}",
                config_path.display()
            )),
            other => other,
        })
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CypherCellError::ConfigError(e.to_string()))
    }

    /// The configured TTL as a `Duration`.
    pub fn ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }

    /// Convert into cell construction options.
    pub fn cell_options(&self) -> CellOptions {
        CellOptions::new()
            .maybe_ttl(self.ttl())
            .volatile(self.volatile)
            .lock_memory(self.lock_memory)
            .mask_char(self.mask_char)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.default_ttl_secs, None);
        assert!(!s.volatile);
        assert!(s.lock_memory);
        assert_eq!(s.mask_char, '*');
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r##"
default_ttl_secs = 30
volatile = true
lock_memory = false
mask_char = "#"
"##;
        fs::write(tmp.path().join(".cyphercell.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_ttl_secs, Some(30));
        assert!(settings.volatile);
        assert!(!settings.lock_memory);
        assert_eq!(settings.mask_char, '#');
        assert_eq!(settings.ttl(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".cyphercell.toml"), "volatile = true\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert!(settings.volatile);
        // Rest should be defaults
        assert_eq!(settings.default_ttl_secs, None);
        assert!(settings.lock_memory);
        assert_eq!(settings.mask_char, '*');
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".cyphercell.toml"), "not valid {{toml").unwrap();

        let err = Settings::load(tmp.path()).unwrap_err();
        assert!(matches!(err, CypherCellError::ConfigError(_)));
        assert!(err.to_string().contains(".cyphercell.toml"));
    }

    #[test]
    fn rejects_multi_char_mask() {
        let result = Settings::from_toml_str("mask_char = \"ab\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn cell_options_mirror_settings() {
        let s = Settings {
            default_ttl_secs: Some(5),
            volatile: true,
            lock_memory: false,
            mask_char: '-',
        };
        let o = s.cell_options();
        assert_eq!(o.ttl, Some(Duration::from_secs(5)));
        assert!(o.is_volatile());
        assert!(!o.locks_memory());
        assert_eq!(o.mask_char, '-');
    }
}
