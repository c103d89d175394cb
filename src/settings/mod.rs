//! Rule settings: persisted rule id → `{enabled, thresholds}` map,
//! stored as TOML under the user's preferences directory. Threshold lookup
//! follows the Open Question resolution recorded in `DESIGN.md`: a custom
//! value if set, else the rule's own compiled-in default, else zero — never
//! `null` and never a panic.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "SwiftSweep";
const SETTINGS_FILE_NAME: &str = "rules.toml";

fn default_enabled() -> bool {
    true
}

/// Per-rule settings: whether it runs at all, and any threshold overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub thresholds: BTreeMap<String, i64>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: BTreeMap::new(),
        }
    }
}

/// The full persisted settings map, keyed by rule id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSettings {
    #[serde(default)]
    rules: BTreeMap<String, RuleConfig>,
}

impl RuleSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `rule_id` should run. A rule with no entry is enabled by
    /// default.
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        self.rules.get(rule_id).map_or(true, |config| config.enabled)
    }

    pub fn set_enabled(&mut self, rule_id: &str, enabled: bool) {
        self.rules.entry(rule_id.to_string()).or_default().enabled = enabled;
    }

    /// Look up a threshold: custom value if set, else `default`. Never
    /// `None`/panics — `default` is the rule's own compiled-in constant.
    pub fn threshold(&self, rule_id: &str, key: &str, default: i64) -> i64 {
        self.rules
            .get(rule_id)
            .and_then(|config| config.thresholds.get(key))
            .copied()
            .unwrap_or(default)
    }

    pub fn set_threshold(&mut self, rule_id: &str, key: &str, value: i64) {
        self.rules
            .entry(rule_id.to_string())
            .or_default()
            .thresholds
            .insert(key.to_string(), value);
    }

    /// The conventional settings file location:
    /// `~/Library/Preferences/SwiftSweep/rules.toml` (or platform
    /// equivalent of `dirs::preference_dir()`).
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::preference_dir()
            .ok_or_else(|| Error::Configuration("could not resolve preferences directory".into()))?;
        Ok(base.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Load settings from `path`. Any read or parse error falls back to
    /// defaults with a `warn!`, rather than failing process startup.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|err| {
                warn!(error = %err, path = %path.display(), "failed to parse rule settings, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self).map_err(|err| Error::Serialization(err.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_is_enabled_by_default() {
        let settings = RuleSettings::new();
        assert!(settings.is_enabled("old_downloads"));
    }

    #[test]
    fn disabled_rule_reports_disabled() {
        let mut settings = RuleSettings::new();
        settings.set_enabled("old_downloads", false);
        assert!(!settings.is_enabled("old_downloads"));
    }

    #[test]
    fn threshold_falls_back_through_custom_then_default() {
        let mut settings = RuleSettings::new();
        assert_eq!(settings.threshold("old_downloads", "days", 30), 30);
        settings.set_threshold("old_downloads", "days", 45);
        assert_eq!(settings.threshold("old_downloads", "days", 30), 45);
    }

    #[test]
    fn round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        let mut settings = RuleSettings::new();
        settings.set_enabled("trash_reminder", false);
        settings.set_threshold("trash_reminder", "warning_bytes", 10_000_000_000);
        settings.save(&path).unwrap();

        let loaded = RuleSettings::load(&path);
        assert!(!loaded.is_enabled("trash_reminder"));
        assert_eq!(loaded.threshold("trash_reminder", "warning_bytes", 0), 10_000_000_000);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        let loaded = RuleSettings::load(&path);
        assert_eq!(loaded, RuleSettings::default());
    }
}
