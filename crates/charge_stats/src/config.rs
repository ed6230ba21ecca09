use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Locations of the diagnostic logs exposed by the charging subsystem.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    /// Head line is the session summary; following lines are tier samples.
    pub charge_stats: PathBuf,
    pub wireless: PathBuf,
    pub pca: PathBuf,
    pub thermal: PathBuf,
    /// Broader charger metrics: tier lines plus `D:` PDO lines.
    pub charger_metrics: PathBuf,
    pub dual_battery: PathBuf,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            charge_stats: PathBuf::from("/sys/class/power_supply/battery/charge_stats"),
            wireless: PathBuf::from("/sys/class/power_supply/wireless/device/charge_stats"),
            pca: PathBuf::from("/sys/class/power_supply/pca94xx-mains/device/charge_stats"),
            thermal: PathBuf::from("/sys/devices/platform/google,charger/thermal_stats"),
            charger_metrics: PathBuf::from("/sys/devices/platform/google,charger/charge_stats"),
            dual_battery: PathBuf::from("/sys/devices/platform/google,dual_batt_gauge/dbatt_stats"),
        }
    }
}

impl SourcePaths {
    /// All six logs under one directory, named after their role.
    pub fn under(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            charge_stats: dir.join("charge_stats"),
            wireless: dir.join("wireless_stats"),
            pca: dir.join("pca_stats"),
            thermal: dir.join("thermal_stats"),
            charger_metrics: dir.join("charger_metrics"),
            dual_battery: dir.join("dual_batt_stats"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLimits {
    /// Larger sources are treated as unreadable rather than buffered.
    pub max_source_bytes: u64,
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    pub sources: SourcePaths,
    pub limits: SourceLimits,
    pub throttle_window_secs: u64,
}

impl ReporterConfig {
    pub const DEFAULT_THROTTLE_WINDOW_SECS: u64 = 15;

    pub fn throttle_window(&self) -> Duration {
        Duration::from_secs(self.throttle_window_secs)
    }

    /// Decodes a TOML document; omitted keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(input).map_err(|source| ConfigError::TomlDecode { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.throttle_window_secs == 0 {
            return Err(ConfigError::ZeroThrottleWindow);
        }
        Ok(())
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            sources: SourcePaths::default(),
            limits: SourceLimits::default(),
            throttle_window_secs: Self::DEFAULT_THROTTLE_WINDOW_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: ReporterConfig =
            serde_json::from_str(r#"{"sources":{"pca":"/tmp/pca"}}"#).unwrap();
        assert_eq!(config.sources.pca, PathBuf::from("/tmp/pca"));
        assert_eq!(config.sources.wireless, SourcePaths::default().wireless);
        assert_eq!(config.throttle_window(), Duration::from_secs(15));
        assert_eq!(config.limits.max_source_bytes, 64 * 1024);
    }

    #[test]
    fn toml_config_overrides_selected_keys() {
        let config = ReporterConfig::from_toml_str(
            r#"
            throttle_window_secs = 30

            [sources]
            charge_stats = "/tmp/charge_stats"

            [limits]
            max_source_bytes = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.throttle_window(), Duration::from_secs(30));
        assert_eq!(config.sources.charge_stats, PathBuf::from("/tmp/charge_stats"));
        assert_eq!(config.sources.thermal, SourcePaths::default().thermal);
        assert_eq!(config.limits.max_source_bytes, 4096);

        assert_eq!(ReporterConfig::from_toml_str("").unwrap(), ReporterConfig::default());
    }

    #[test]
    fn invalid_toml_config_is_rejected() {
        assert!(matches!(
            ReporterConfig::from_toml_str("throttle_window_secs = \"soon\""),
            Err(ConfigError::TomlDecode { .. })
        ));
        assert!(matches!(
            ReporterConfig::from_toml_str("throttle_window_secs = 0"),
            Err(ConfigError::ZeroThrottleWindow)
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reporter.toml");
        fs::write(&path, "[limits]\nmax_source_bytes = 512\n").unwrap();
        assert_eq!(ReporterConfig::load(&path).unwrap().limits.max_source_bytes, 512);

        let missing = ReporterConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[test]
    fn under_keeps_roles_distinct() {
        let paths = SourcePaths::under("/data/stats");
        let all = [
            &paths.charge_stats,
            &paths.wireless,
            &paths.pca,
            &paths.thermal,
            &paths.charger_metrics,
            &paths.dual_battery,
        ];
        for (i, a) in all.iter().enumerate() {
            assert!(a.starts_with("/data/stats"));
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
