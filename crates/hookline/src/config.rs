use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bus::DEFAULT_BUS_CAPACITY;

/// Engine defaults, loadable from a TOML file.
///
/// Every field has a default so an empty file (or no file at all) yields a
/// working configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HooklineConfig {
    /// Applied to dispatches that do not set their own timeout. `None`
    /// means handlers run unbounded.
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,
    /// Default for `ExecuteOptions::parallel`.
    #[serde(default)]
    pub parallel: bool,
    /// Default for `ExecuteOptions::continue_on_error`.
    #[serde(default = "default_true")]
    pub continue_on_error: bool,
    /// Broadcast channel capacity for the dispatch-notice bus.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

impl Default for HooklineConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: None,
            parallel: false,
            continue_on_error: true,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

impl HooklineConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: HooklineConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_timeout_ms, None);
        assert!(!config.parallel);
        assert!(config.continue_on_error);
        assert_eq!(config.bus_capacity, DEFAULT_BUS_CAPACITY);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_timeout_ms = 2500\nparallel = true\ncontinue_on_error = false\nbus_capacity = 8"
        )
        .unwrap();

        let config = HooklineConfig::load(file.path()).unwrap();
        assert_eq!(config.default_timeout(), Some(Duration::from_millis(2500)));
        assert!(config.parallel);
        assert!(!config.continue_on_error);
        assert_eq!(config.bus_capacity, 8);
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(HooklineConfig::load("/nonexistent/hookline.toml").is_err());
    }
}
