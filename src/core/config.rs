use crate::core::rate::{DAY_HOURS, PairingMode, RatePolicy};
use crate::core::volume::DEFAULT_CAPACITY;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_SUPPRESS_HOURS: f64 = 12.0;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RateMode {
    Adjacent,
    AdjacentLag2,
    SlidingWindow,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RateConfig {
    #[serde(default = "default_rate_mode")]
    pub mode: RateMode,
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    /// Hours after the first entry during which rates are hidden. Zero
    /// disables suppression.
    #[serde(default = "default_suppress_hours")]
    pub suppress_hours: f64,
}

fn default_rate_mode() -> RateMode {
    RateMode::SlidingWindow
}

fn default_window_hours() -> f64 {
    DAY_HOURS
}

fn default_suppress_hours() -> f64 {
    DEFAULT_SUPPRESS_HOURS
}

fn default_capacity() -> f64 {
    DEFAULT_CAPACITY
}

impl Default for RateConfig {
    fn default() -> Self {
        RateConfig {
            mode: default_rate_mode(),
            window_hours: default_window_hours(),
            suppress_hours: default_suppress_hours(),
        }
    }
}

impl RateConfig {
    /// Validates the configured values and builds the engine policy.
    pub fn policy(&self) -> Result<RatePolicy> {
        if !self.suppress_hours.is_finite() || self.suppress_hours < 0.0 {
            bail!(
                "suppress_hours must be a non-negative number, got {}",
                self.suppress_hours
            );
        }

        let mode = match self.mode {
            RateMode::Adjacent => PairingMode::Adjacent,
            RateMode::AdjacentLag2 => PairingMode::AdjacentLag2,
            RateMode::SlidingWindow => {
                if !self.window_hours.is_finite() || self.window_hours <= 0.0 {
                    bail!(
                        "window_hours must be a positive number, got {}",
                        self.window_hours
                    );
                }
                PairingMode::SlidingWindow {
                    window_hours: self.window_hours,
                }
            }
        };

        let suppress_hours = (self.suppress_hours > 0.0).then_some(self.suppress_hours);
        Ok(RatePolicy {
            mode,
            suppress_hours,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Container size in ml used for the bag view.
    #[serde(default = "default_capacity")]
    pub capacity: f64,
    /// Standing offset used until one is stored with `fluidlog carryover`.
    #[serde(default)]
    pub carryover: f64,
    #[serde(default)]
    pub rate: RateConfig,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            capacity: default_capacity(),
            carryover: 0.0,
            rate: RateConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when it
    /// does not exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fluidlog", "fluidlog")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "fluidlog", "fluidlog")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Checks values that have no safe interpretation. Rate settings are
    /// checked separately by [`RateConfig::policy`] so command-line
    /// overrides go through the same rules.
    pub fn validate(&self) -> Result<()> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            bail!("capacity must be a positive number, got {}", self.capacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observation::Observation;
    use crate::core::rate::compute_rate_series;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
capacity: 1500
carryover: 250
rate:
  mode: adjacent-lag2
  suppress_hours: 0
data_path: "/tmp/fluidlog"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.capacity, 1500.0);
        assert_eq!(config.carryover, 250.0);
        assert_eq!(config.rate.mode, RateMode::AdjacentLag2);
        assert_eq!(config.rate.window_hours, 24.0);
        assert_eq!(config.data_path.as_deref(), Some("/tmp/fluidlog"));

        let policy = config.rate.policy().unwrap();
        assert_eq!(policy, RatePolicy::adjacent_lag2());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.capacity, 2000.0);
        assert_eq!(config.carryover, 0.0);
        assert!(config.data_path.is_none());

        let policy = config.rate.policy().unwrap();
        assert_eq!(policy, RatePolicy::sliding_window(24.0).with_suppression(12.0));
    }

    #[test]
    fn test_invalid_window_is_rejected() {
        let rate = RateConfig {
            mode: RateMode::SlidingWindow,
            window_hours: 0.0,
            suppress_hours: 12.0,
        };
        let err = rate.policy().unwrap_err();
        assert!(err.to_string().contains("window_hours"));

        // The window is irrelevant outside sliding-window mode
        let rate = RateConfig {
            mode: RateMode::Adjacent,
            window_hours: -1.0,
            suppress_hours: 0.0,
        };
        assert_eq!(rate.policy().unwrap(), RatePolicy::adjacent());
    }

    #[test]
    fn test_invalid_capacity_is_rejected() {
        for capacity in ["0", "-5", ".inf", ".nan"] {
            let yaml_str = format!("capacity: {capacity}");
            let config: AppConfig = serde_yaml::from_str(&yaml_str).unwrap();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("capacity"), "capacity {capacity}: {err}");
        }
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_from_path_validates_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "capacity: -2000\n").unwrap();

        let err = AppConfig::load_from_path(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("capacity must be a positive number"));
    }

    #[test]
    fn test_huge_suppression_yields_empty_series() {
        let rate = RateConfig {
            mode: RateMode::Adjacent,
            suppress_hours: 1e10,
            ..RateConfig::default()
        };
        let policy = rate.policy().unwrap();

        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let entries = vec![
            Observation::new(start, 0.0),
            Observation::new(start + chrono::Duration::hours(6), 100.0),
        ];
        assert!(compute_rate_series(&entries, &policy).is_empty());
    }

    #[test]
    fn test_negative_suppression_is_rejected() {
        let rate = RateConfig {
            suppress_hours: -3.0,
            ..RateConfig::default()
        };
        assert!(rate.policy().is_err());
    }
}
