//! Posture thresholds, their validation, and on-disk persistence.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, anyhow};
use thiserror::Error;

/// Fixed key the configuration blob is stored under.
pub const STORAGE_KEY: &str = "postureConfig";

/// Alert interval used whenever the configuration comes from backend defaults.
pub const DEFAULT_ALERT_INTERVAL_MS: u64 = 10_000;

/// Default neck-angle ranges as reported by `GET /api/config`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerDefaults {
    pub right_min_angle: i32,
    pub right_max_angle: i32,
    pub left_min_angle: i32,
    pub left_max_angle: i32,
}

impl Default for ServerDefaults {
    fn default() -> Self {
        Self {
            right_min_angle: -80,
            right_max_angle: -63,
            left_min_angle: 80,
            left_max_angle: 115,
        }
    }
}

/// User-tunable thresholds. Serialized with the same camelCase keys the
/// stored blob has always used.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub right_min_angle: i32,
    pub right_max_angle: i32,
    pub left_min_angle: i32,
    pub left_max_angle: i32,
    /// Milliseconds of continuous bad posture before an alert, and the
    /// minimum spacing between alerts.
    pub alert_interval: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Minimum angles must be less than maximum angles")]
    MinNotBelowMax,
    #[error("Right side angles must be negative")]
    RightNotNegative,
    #[error("Left side angles must be positive")]
    LeftNegative,
    #[error("Alert interval must be at least 1 second")]
    IntervalNotPositive,
    #[error("Alert interval must be a whole number of seconds, got {0} ms")]
    IntervalNotWholeSeconds(u64),
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

impl From<ServerDefaults> for Config {
    fn from(defaults: ServerDefaults) -> Self {
        Self {
            right_min_angle: defaults.right_min_angle,
            right_max_angle: defaults.right_max_angle,
            left_min_angle: defaults.left_min_angle,
            left_max_angle: defaults.left_max_angle,
            alert_interval: DEFAULT_ALERT_INTERVAL_MS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        ServerDefaults::default().into()
    }
}

impl Config {
    /// Check the ordering rules `rightMin < rightMax <= 0 <= leftMin < leftMax`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.right_min_angle >= self.right_max_angle || self.left_min_angle >= self.left_max_angle {
            return Err(ConfigError::MinNotBelowMax);
        }
        if self.right_min_angle > 0 || self.right_max_angle > 0 {
            return Err(ConfigError::RightNotNegative);
        }
        if self.left_min_angle < 0 || self.left_max_angle < 0 {
            return Err(ConfigError::LeftNegative);
        }
        if self.alert_interval == 0 {
            return Err(ConfigError::IntervalNotPositive);
        }
        if self.alert_interval % 1000 != 0 {
            return Err(ConfigError::IntervalNotWholeSeconds(self.alert_interval));
        }
        Ok(())
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_millis(self.alert_interval)
    }

    pub fn right_in_range(&self, angle: f64) -> bool {
        f64::from(self.right_min_angle) <= angle && angle <= f64::from(self.right_max_angle)
    }

    pub fn left_in_range(&self, angle: f64) -> bool {
        f64::from(self.left_min_angle) <= angle && angle <= f64::from(self.left_max_angle)
    }
}

/// Pick the configuration to start with: the stored one wins, then the
/// backend's defaults, then the built-in defaults.
pub fn startup_config(stored: Option<Config>, fetched: Option<ServerDefaults>) -> Config {
    stored
        .or_else(|| fetched.map(Config::from))
        .unwrap_or_default()
}

/// Raw text of the config editor fields. The interval is entered in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    pub right_min_angle: String,
    pub right_max_angle: String,
    pub left_min_angle: String,
    pub left_max_angle: String,
    pub alert_interval_secs: String,
}

impl From<&Config> for ConfigForm {
    fn from(config: &Config) -> Self {
        Self {
            right_min_angle: config.right_min_angle.to_string(),
            right_max_angle: config.right_max_angle.to_string(),
            left_min_angle: config.left_min_angle.to_string(),
            left_max_angle: config.left_max_angle.to_string(),
            alert_interval_secs: (config.alert_interval / 1000).to_string(),
        }
    }
}

impl ConfigForm {
    /// Parse and validate the form into a configuration.
    pub fn parse(&self) -> Result<Config, ConfigError> {
        let secs = parse_field("Alert interval", &self.alert_interval_secs)?;
        let config = Config {
            right_min_angle: parse_field("Right minimum angle", &self.right_min_angle)?,
            right_max_angle: parse_field("Right maximum angle", &self.right_max_angle)?,
            left_min_angle: parse_field("Left minimum angle", &self.left_min_angle)?,
            left_max_angle: parse_field("Left maximum angle", &self.left_max_angle)?,
            alert_interval: u64::try_from(secs)
                .ok()
                .and_then(|s| s.checked_mul(1000))
                .unwrap_or(0),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<i32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Persists the configuration as a single JSON blob under [`STORAGE_KEY`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted in the user's configuration directory.
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(Self::at(config_dir.join("posture-monitor")))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", STORAGE_KEY))
    }

    /// Load the stored configuration. A missing blob is `Ok(None)`; an
    /// unreadable, malformed or invalid one is an error.
    pub fn load(&self) -> Result<Option<Config>> {
        let path = self.path();

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(Some(config))
    }

    /// Like [`ConfigStore::load`], but logs and discards a bad blob.
    pub fn load_or_log(&self) -> Option<Config> {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Error loading stored config from {}: {:#}", self.path().display(), e);
                None
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let content = serde_json::to_string(config)?;
        fs::write(self.path(), content)?;
        tracing::info!("Configuration saved to {}", self.path().display());
        Ok(())
    }

    /// Remove the stored blob. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rmin: i32, rmax: i32, lmin: i32, lmax: i32) -> Config {
        Config {
            right_min_angle: rmin,
            right_max_angle: rmax,
            left_min_angle: lmin,
            left_max_angle: lmax,
            alert_interval: 10_000,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
        assert_eq!(Config::default().alert_interval, DEFAULT_ALERT_INTERVAL_MS);
    }

    #[test]
    fn test_rejects_min_not_below_max() {
        assert_eq!(config(-10, -20, 80, 115).validate(), Err(ConfigError::MinNotBelowMax));
        assert_eq!(config(-80, -63, 90, 90).validate(), Err(ConfigError::MinNotBelowMax));
    }

    #[test]
    fn test_rejects_non_negative_right() {
        assert_eq!(config(5, 10, 80, 115).validate(), Err(ConfigError::RightNotNegative));
    }

    #[test]
    fn test_rejects_negative_left() {
        assert_eq!(config(-80, -63, -5, 115).validate(), Err(ConfigError::LeftNegative));
    }

    #[test]
    fn test_zero_is_allowed_on_both_sides() {
        assert_eq!(config(-10, 0, 0, 10).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut c = Config::default();
        c.alert_interval = 0;
        assert_eq!(c.validate(), Err(ConfigError::IntervalNotPositive));
    }

    #[test]
    fn test_serializes_with_stored_key_names() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["rightMinAngle"], -80);
        assert_eq!(json["rightMaxAngle"], -63);
        assert_eq!(json["leftMinAngle"], 80);
        assert_eq!(json["leftMaxAngle"], 115);
        assert_eq!(json["alertInterval"], 10_000);
    }

    #[test]
    fn test_form_parses_seconds_into_millis() {
        let form = ConfigForm {
            right_min_angle: "-85".to_string(),
            right_max_angle: " -60 ".to_string(),
            left_min_angle: "75".to_string(),
            left_max_angle: "120".to_string(),
            alert_interval_secs: "30".to_string(),
        };
        let mut expected = config(-85, -60, 75, 120);
        expected.alert_interval = 30_000;
        assert_eq!(form.parse(), Ok(expected));
    }

    #[test]
    fn test_form_rejects_garbage() {
        let mut form = ConfigForm::from(&Config::default());
        form.left_max_angle = "abc".to_string();
        assert!(matches!(
            form.parse(),
            Err(ConfigError::InvalidNumber { field: "Left maximum angle", .. })
        ));
    }

    #[test]
    fn test_form_rejects_negative_interval() {
        let mut form = ConfigForm::from(&Config::default());
        form.alert_interval_secs = "-3".to_string();
        assert_eq!(form.parse(), Err(ConfigError::IntervalNotPositive));
    }

    #[test]
    fn test_form_round_trips_active_config() {
        let form = ConfigForm::from(&Config::default());
        assert_eq!(form.alert_interval_secs, "10");
        assert_eq!(form.parse(), Ok(Config::default()));
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("nested"));
        let saved = config(-70, -50, 60, 100);

        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn test_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_store_malformed_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        fs::write(store.path(), "{not json").unwrap();

        assert!(store.load().is_err());
        assert_eq!(store.load_or_log(), None);
    }

    #[test]
    fn test_store_invalid_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        fs::write(
            store.path(),
            r#"{"rightMinAngle":10,"rightMaxAngle":-20,"leftMinAngle":-5,"leftMaxAngle":-9,"alertInterval":0}"#,
        )
        .unwrap();

        assert!(store.load().is_err());
        assert_eq!(store.load_or_log(), None);
        assert_eq!(startup_config(store.load_or_log(), None), Config::default());
    }

    #[test]
    fn test_store_zero_interval_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        let mut stored = Config::default();
        stored.alert_interval = 0;
        fs::write(store.path(), serde_json::to_string(&stored).unwrap()).unwrap();

        assert_eq!(store.load_or_log(), None);
    }

    #[test]
    fn test_rejects_sub_second_interval() {
        let mut c = Config::default();
        c.alert_interval = 500;
        assert_eq!(c.validate(), Err(ConfigError::IntervalNotWholeSeconds(500)));

        c.alert_interval = 2_500;
        assert_eq!(c.validate(), Err(ConfigError::IntervalNotWholeSeconds(2_500)));
    }

    #[test]
    fn test_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path());
        store.save(&Config::default()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn test_startup_prefers_stored_then_fetched() {
        let stored = config(-70, -50, 60, 100);
        let fetched = ServerDefaults {
            right_min_angle: -90,
            right_max_angle: -60,
            left_min_angle: 70,
            left_max_angle: 120,
        };

        assert_eq!(startup_config(Some(stored), Some(fetched)), stored);

        let from_server = startup_config(None, Some(fetched));
        assert_eq!(from_server.right_min_angle, -90);
        assert_eq!(from_server.alert_interval, DEFAULT_ALERT_INTERVAL_MS);

        assert_eq!(startup_config(None, None), Config::default());
    }

    #[test]
    fn test_range_hints() {
        let c = Config::default();
        assert!(c.right_in_range(-70.0));
        assert!(!c.right_in_range(-50.5));
        assert!(c.left_in_range(115.0));
        assert!(!c.left_in_range(79.99));
    }
}
