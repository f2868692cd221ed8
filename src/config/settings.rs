use anyhow::{Context, Result};
use chrono::{FixedOffset, Local, Offset};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::location::PresetCity;
use crate::prayer_times::tracker::MidnightPolicy;
use crate::shake::ShakeConfig;

fn default_calc_method() -> String {
    "MuslimWorldLeague".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_hijri_offset() -> i32 {
    0
}
fn default_refresh_secs() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Whether shakr may use the configured coordinates. When false the
    /// default city is used, as if location permission had been denied.
    #[serde(default = "default_true")]
    pub allow_location: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            allow_location: true,
            name: None,
            latitude: None,
            longitude: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalahConfig {
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
    /// Minutes from UTC. Unset means the system's local offset.
    #[serde(default)]
    pub timezone_offset: Option<i32>,
    /// Days to add/subtract from the Hijri date for local moon sighting.
    #[serde(default = "default_hijri_offset")]
    pub hijri_offset: i32,
    /// What counts as the current prayer between midnight and Fajr.
    #[serde(default)]
    pub midnight_policy: MidnightPolicy,
    /// How often the schedule is re-derived, to catch the day rollover.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for SalahConfig {
    fn default() -> Self {
        Self {
            calc_method: default_calc_method(),
            madhab: default_madhab(),
            timezone_offset: None,
            hijri_offset: default_hijri_offset(),
            midnight_policy: MidnightPolicy::default(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl SalahConfig {
    pub fn offset(&self) -> FixedOffset {
        self.timezone_offset
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(|| Local::now().offset().fix())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub salah: SalahConfig,
    #[serde(default)]
    pub shake: ShakeConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "shakr").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("shakr.db"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    /// Point the location at a preset city, including its UTC offset.
    pub fn set_city(&mut self, city: &PresetCity) {
        self.location.allow_location = true;
        self.location.name = Some(city.name.to_string());
        self.location.latitude = Some(city.coordinate.latitude);
        self.location.longitude = Some(city.coordinate.longitude);
        self.salah.timezone_offset = Some(city.utc_offset);
    }

    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64, name: Option<String>) {
        self.location.allow_location = true;
        self.location.name = name;
        self.location.latitude = Some(latitude);
        self.location.longitude = Some(longitude);
        // Raw coordinates carry no zone; fall back to the system offset.
        self.salah.timezone_offset = None;
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.location.allow_location);
        assert_eq!(config.salah.calc_method, "MuslimWorldLeague");
        assert_eq!(config.shake.required_shakes, 3);
        assert_eq!(config.salah.midnight_policy, MidnightPolicy::PreviousIsha);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[shake]\nthreshold = 2.0\nrequired_shakes = 1\n\n[salah]\nmidnight_policy = \"first_prayer\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.shake.threshold, 2.0);
        assert_eq!(config.shake.required_shakes, 1);
        assert_eq!(config.shake.timeout_ms, 2000);
        assert_eq!(config.salah.midnight_policy, MidnightPolicy::FirstPrayer);
        assert_eq!(config.salah.refresh_secs, 60);
    }

    #[test]
    fn save_then_load_keeps_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.location.allow_location = false;
        config.set_city(crate::location::find_city("Cairo").unwrap());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!(loaded.location.allow_location);
        assert_eq!(loaded.location.name.as_deref(), Some("Cairo"));
        assert_eq!(loaded.location.latitude, Some(30.0444));
        assert_eq!(loaded.salah.offset(), FixedOffset::east_opt(7200).unwrap());
    }

    #[test]
    fn coordinates_drop_the_previous_city_offset() {
        let mut config = AppConfig::default();
        config.set_city(crate::location::find_city("Tokyo").unwrap());
        assert_eq!(config.salah.timezone_offset, Some(540));

        config.set_coordinates(40.7128, -74.0060, Some("New York".to_string()));
        assert_eq!(config.salah.timezone_offset, None);
        assert_eq!(config.location.name.as_deref(), Some("New York"));
        assert_eq!(config.location.longitude, Some(-74.0060));
    }
}
