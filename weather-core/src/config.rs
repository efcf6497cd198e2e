use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, fs, path::PathBuf};
use tracing::warn;

use crate::{
    error::{FormError, HereError},
    model::{DEFAULT_MODE, Language, WeatherRequest},
    provider::WeatherProvider,
    units::UnitSystem,
};

/// Seconds between two refreshes of one product.
pub const DEFAULT_SCAN_INTERVAL: u64 = 300;

/// Shortest accepted refresh interval, in seconds.
pub const MIN_SCAN_INTERVAL: u64 = 1;

/// Values entered when a location is set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub api_key: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl EntryData {
    /// Coordinates identify a location; two entries may not share them.
    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.latitude, self.longitude)
    }

    pub fn validate_coordinates(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(anyhow!("Latitude {} is outside -90..=90", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(anyhow!("Longitude {} is outside -180..=180", self.longitude));
        }
        Ok(())
    }
}

/// Settings that can be changed after setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default, deserialize_with = "deserialize_language")]
    pub language: Language,

    #[serde(default = "default_scan_interval", deserialize_with = "deserialize_scan_interval")]
    pub scan_interval: u64,
}

impl Default for EntryOptions {
    fn default() -> Self {
        Self { language: Language::default(), scan_interval: DEFAULT_SCAN_INTERVAL }
    }
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL
}

fn deserialize_scan_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = u64::deserialize(deserializer)?;
    if raw < MIN_SCAN_INTERVAL {
        warn!(scan_interval = raw, "Refresh interval too short, using {MIN_SCAN_INTERVAL}s");
        return Ok(MIN_SCAN_INTERVAL);
    }
    Ok(raw)
}

/// Older versions stored display names such as `"German"`; those are reset.
fn deserialize_language<'de, D>(deserializer: D) -> Result<Language, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(Language::from_code(&raw).unwrap_or_else(|| {
        warn!(language = %raw, "The configured language was reset. Please configure it again.");
        Language::default()
    }))
}

/// One configured location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub data: EntryData,
    #[serde(default)]
    pub options: EntryOptions,
}

impl ConfigEntry {
    pub fn new(data: EntryData) -> Self {
        Self { data, options: EntryOptions::default() }
    }

    pub fn unique_id(&self) -> String {
        self.data.unique_id()
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Units values are requested and displayed in.
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Unique id of the entry used when none is named.
    pub default_entry: Option<String>,

    /// Example TOML:
    /// [entries."40.79962_-73.970314".data]
    /// api_key = "..."
    /// name = "home"
    /// latitude = 40.79962
    /// longitude = -73.970314
    #[serde(default)]
    pub entries: BTreeMap<String, ConfigEntry>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "here-weather", "here-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Add a new location. The first one added becomes the default.
    pub fn add_entry(&mut self, data: EntryData) -> Result<String, FormError> {
        let id = data.unique_id();
        if self.entries.contains_key(&id) {
            return Err(FormError::AlreadyConfigured);
        }

        self.entries.insert(id.clone(), ConfigEntry::new(data));
        if self.default_entry.is_none() {
            self.default_entry = Some(id.clone());
        }

        Ok(id)
    }

    pub fn remove_entry(&mut self, id: &str) -> Option<ConfigEntry> {
        let removed = self.entries.remove(id);
        if self.default_entry.as_deref() == Some(id) {
            self.default_entry = self.entries.keys().next().cloned();
        }
        removed
    }

    pub fn entry(&self, id: &str) -> Result<&ConfigEntry> {
        self.entries.get(id).ok_or_else(|| {
            anyhow!("No location configured with id '{id}'.\nHint: run `here-weather list`.")
        })
    }

    /// The entry named by `default_entry`.
    pub fn default_entry(&self) -> Result<&ConfigEntry> {
        let id = self.default_entry.as_ref().ok_or_else(|| {
            anyhow!(
                "No default location configured.\n\
                 Hint: run `here-weather configure` first."
            )
        })?;

        self.entry(id)
    }

    pub fn set_default_entry(&mut self, id: &str) -> Result<()> {
        self.entry(id)?;
        self.default_entry = Some(id.to_string());
        Ok(())
    }

    pub fn update_options(&mut self, id: &str, options: EntryOptions) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| anyhow!("No location configured with id '{id}'"))?;
        entry.options = options;
        Ok(())
    }
}

/// Check a new location against HERE before it is stored.
///
/// One report for the default product is requested; provider errors are
/// mapped to the errors shown next to the form.
pub async fn validate_user_input(
    provider: &dyn WeatherProvider,
    data: &EntryData,
    units: UnitSystem,
) -> Result<(), FormError> {
    let request = WeatherRequest {
        latitude: data.latitude,
        longitude: data.longitude,
        product: DEFAULT_MODE,
        language: Language::default(),
        units,
    };

    match provider.weather_for_coordinates(&request).await {
        Ok(_) => Ok(()),
        Err(HereError::Unauthorized(_)) => Err(FormError::Unauthorized),
        Err(HereError::InvalidRequest(_)) => Err(FormError::InvalidRequest),
        Err(err) => {
            warn!(error = %err, "Validation request to HERE failed");
            Err(FormError::CannotConnect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> EntryData {
        EntryData {
            api_key: "test".into(),
            name: "here_weather".into(),
            latitude: 40.79962,
            longitude: -73.970314,
        }
    }

    #[test]
    fn unique_id_is_built_from_coordinates() {
        assert_eq!(home().unique_id(), "40.79962_-73.970314");
    }

    #[test]
    fn default_entry_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_entry().unwrap_err();

        assert!(err.to_string().contains("No default location configured"));
    }

    #[test]
    fn first_entry_becomes_default() {
        let mut cfg = Config::default();
        let id = cfg.add_entry(home()).expect("first add succeeds");

        assert_eq!(cfg.default_entry.as_deref(), Some(id.as_str()));
        assert_eq!(cfg.default_entry().unwrap().data, home());
        assert_eq!(cfg.default_entry().unwrap().options, EntryOptions::default());
    }

    #[test]
    fn same_coordinates_cannot_be_added_twice() {
        let mut cfg = Config::default();
        cfg.add_entry(home()).unwrap();

        let mut renamed = home();
        renamed.name = "other".into();
        assert_eq!(cfg.add_entry(renamed), Err(FormError::AlreadyConfigured));
    }

    #[test]
    fn add_does_not_override_existing_default() {
        let mut cfg = Config::default();
        let first = cfg.add_entry(home()).unwrap();

        let mut berlin = home();
        berlin.latitude = 52.52;
        berlin.longitude = 13.405;
        let second = cfg.add_entry(berlin).unwrap();

        assert_eq!(cfg.default_entry.as_deref(), Some(first.as_str()));
        cfg.set_default_entry(&second).unwrap();
        assert_eq!(cfg.default_entry.as_deref(), Some(second.as_str()));
    }

    #[test]
    fn removing_the_default_picks_another() {
        let mut cfg = Config::default();
        let first = cfg.add_entry(home()).unwrap();
        let mut berlin = home();
        berlin.latitude = 52.52;
        let second = cfg.add_entry(berlin).unwrap();

        assert!(cfg.remove_entry(&first).is_some());
        assert_eq!(cfg.default_entry.as_deref(), Some(second.as_str()));
    }

    #[test]
    fn options_update() {
        let mut cfg = Config::default();
        let id = cfg.add_entry(home()).unwrap();

        cfg.update_options(&id, EntryOptions { language: Language::German, scan_interval: 60 })
            .unwrap();

        let options = &cfg.entry(&id).unwrap().options;
        assert_eq!(options.language, Language::German);
        assert_eq!(options.scan_interval, 60);
        assert!(cfg.update_options("0_0", EntryOptions::default()).is_err());
    }

    #[test]
    fn coordinates_are_range_checked() {
        assert!(home().validate_coordinates().is_ok());
        let mut bad = home();
        bad.latitude = 91.0;
        assert!(bad.validate_coordinates().is_err());
    }

    #[test]
    fn toml_roundtrip_keeps_language_code() {
        let mut cfg = Config::default();
        let id = cfg.add_entry(home()).unwrap();
        cfg.update_options(&id, EntryOptions { language: Language::French, scan_interval: 120 })
            .unwrap();

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("fr-FR"));

        let parsed = Config::parse(&text).unwrap();
        assert_eq!(parsed.entry(&id).unwrap().options.language, Language::French);
    }

    #[test]
    fn unknown_stored_language_is_reset() {
        let text = r#"
            default_entry = "40.79962_-73.970314"

            [entries."40.79962_-73.970314".data]
            api_key = "test"
            name = "here_weather"
            latitude = 40.79962
            longitude = -73.970314

            [entries."40.79962_-73.970314".options]
            language = "German"
        "#;

        let cfg = Config::parse(text).unwrap();
        let options = &cfg.default_entry().unwrap().options;
        assert_eq!(options.language, Language::English);
        assert_eq!(options.scan_interval, DEFAULT_SCAN_INTERVAL);
        assert_eq!(cfg.unit_system, UnitSystem::Metric);
    }

    #[test]
    fn zero_scan_interval_is_raised_to_minimum() {
        let text = r#"
            [entries."40.79962_-73.970314".data]
            api_key = "test"
            name = "here_weather"
            latitude = 40.79962
            longitude = -73.970314

            [entries."40.79962_-73.970314".options]
            language = "de-DE"
            scan_interval = 0
        "#;

        let cfg = Config::parse(text).unwrap();
        let options = &cfg.entry("40.79962_-73.970314").unwrap().options;
        assert_eq!(options.scan_interval, MIN_SCAN_INTERVAL);
        assert_eq!(options.language, Language::German);
    }
}
