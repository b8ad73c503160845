use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Environment variable that switches the app into development mode.
pub const ENVIRONMENT_VAR: &str = "WEATHER_ENVIRONMENT";
/// Environment variable pointing at the development configuration file.
pub const DEV_CONFIG_VAR: &str = "WEATHER_DEV_CONFIG";
pub const DEV_CONFIG_FILE: &str = "weather.dev.toml";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Persisted user settings.
///
/// Example TOML:
/// api_key = "..."
/// language = "fr"
/// city = "Quebec"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub language: String,
    pub city: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            city: String::new(),
        }
    }
}

impl Config {
    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-app")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Persisted key/value settings the orchestrator reads and commits.
///
/// Setters only change the in-memory view; nothing is durable until `save`.
pub trait SettingsStore {
    fn api_key(&self) -> String;
    fn set_api_key(&mut self, key: &str);
    fn language(&self) -> String;
    fn set_language(&mut self, language: &str);
    fn city(&self) -> String;
    fn set_city(&mut self, city: &str);
    fn save(&mut self) -> Result<()>;
}

/// `SettingsStore` backed by a TOML file.
#[derive(Debug, Clone)]
pub struct TomlSettings {
    path: PathBuf,
    config: Config,
}

impl TomlSettings {
    /// Open the settings at the platform config location.
    pub fn open_default() -> Result<Self> {
        Self::open(Config::config_file_path()?)
    }

    pub fn open(path: PathBuf) -> Result<Self> {
        let config = Config::load_from(&path)?;
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl SettingsStore for TomlSettings {
    fn api_key(&self) -> String {
        self.config.api_key.clone()
    }

    fn set_api_key(&mut self, key: &str) {
        self.config.api_key = key.to_string();
    }

    fn language(&self) -> String {
        self.config.language.clone()
    }

    fn set_language(&mut self, language: &str) {
        self.config.language = language.to_string();
    }

    fn city(&self) -> String {
        self.config.city.clone()
    }

    fn set_city(&mut self, city: &str) {
        self.config.city = city.to_string();
    }

    fn save(&mut self) -> Result<()> {
        self.config.save_to(&self.path)
    }
}

/// Development-only values, read from a TOML file next to the binary's working directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevConfig {
    pub ow_api_key: Option<String>,
}

impl DevConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read development config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse development config: {}", path.display()))
    }
}

/// How the process was launched: development mode and its override key.
#[derive(Debug, Clone, Default)]
pub struct LaunchProfile {
    pub development: bool,
    pub dev_api_key: Option<String>,
}

impl LaunchProfile {
    pub fn production() -> Self {
        Self::default()
    }

    pub fn development(dev_api_key: impl Into<String>) -> Self {
        Self { development: true, dev_api_key: Some(dev_api_key.into()) }
    }

    /// Read the development flag from the environment and, when set, the override file.
    pub fn from_env() -> Result<Self> {
        let development = env::var(ENVIRONMENT_VAR)
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        if !development {
            return Ok(Self::production());
        }

        let path = env::var_os(DEV_CONFIG_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEV_CONFIG_FILE));
        let dev = DevConfig::load_from(&path)?;

        Ok(Self { development, dev_api_key: dev.ow_api_key })
    }

    /// Pick the API key to build the weather service with.
    ///
    /// The development override wins when the flag is set; otherwise the
    /// persisted key is used. Empty keys count as missing.
    pub fn resolve_api_key(&self, settings: &dyn SettingsStore) -> Option<String> {
        let dev_key = self
            .dev_api_key
            .as_deref()
            .filter(|key| self.development && !key.is_empty());

        match dev_key {
            Some(key) => Some(key.to_string()),
            None => Some(settings.api_key()).filter(|key| !key.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySettings;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn toml_settings_survive_a_fresh_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = TomlSettings::open(path.clone()).unwrap();
        settings.set_api_key("KEY");
        settings.set_language("fr");
        settings.save().unwrap();

        let reopened = TomlSettings::open(path).unwrap();
        assert_eq!(reopened.api_key(), "KEY");
        assert_eq!(reopened.language(), "fr");
        assert_eq!(reopened.city(), "");
    }

    #[test]
    fn unsaved_changes_are_not_durable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = TomlSettings::open(path.clone()).unwrap();
        settings.set_api_key("KEY");

        assert_eq!(TomlSettings::open(path).unwrap().api_key(), "");
    }

    #[test]
    fn dev_override_wins_when_flag_is_set() {
        let settings = MemorySettings::with_api_key("USER_KEY");
        let profile = LaunchProfile::development("DEV_KEY");

        assert_eq!(profile.resolve_api_key(&settings).as_deref(), Some("DEV_KEY"));
    }

    #[test]
    fn persisted_key_is_used_without_flag() {
        let settings = MemorySettings::with_api_key("USER_KEY");
        let profile = LaunchProfile { development: false, dev_api_key: Some("DEV_KEY".into()) };

        assert_eq!(profile.resolve_api_key(&settings).as_deref(), Some("USER_KEY"));
    }

    #[test]
    fn empty_dev_key_falls_back_to_persisted_key() {
        let settings = MemorySettings::with_api_key("USER_KEY");
        let profile = LaunchProfile::development("");

        assert_eq!(profile.resolve_api_key(&settings).as_deref(), Some("USER_KEY"));
    }

    #[test]
    fn no_key_anywhere_resolves_to_none() {
        let settings = MemorySettings::default();
        assert_eq!(LaunchProfile::production().resolve_api_key(&settings), None);
    }

    #[test]
    fn dev_config_reads_override_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEV_CONFIG_FILE);
        fs::write(&path, "ow_api_key = \"FROM_FILE\"\n").unwrap();

        let dev = DevConfig::load_from(&path).unwrap();
        assert_eq!(dev.ow_api_key.as_deref(), Some("FROM_FILE"));
    }
}
