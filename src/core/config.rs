use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_EVDS_URL: &str = "https://evds2.tcmb.gov.tr/service/evds";
pub const DEFAULT_SERIES: &str = "TP.FG.J0";
pub const API_KEY_ENV: &str = "EVDS_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvdsProviderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_series")]
    pub series: String,
}

fn default_series() -> String {
    DEFAULT_SERIES.to_string()
}

impl Default for EvdsProviderConfig {
    fn default() -> Self {
        EvdsProviderConfig {
            base_url: DEFAULT_EVDS_URL.to_string(),
            api_key: None,
            series: default_series(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub evds: EvdsProviderConfig,
}

/// Dates requested from the API whenever the cache is cold.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for FetchWindow {
    fn default() -> Self {
        FetchWindow {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default)]
    pub persist: bool,
}

fn default_ttl_seconds() -> u64 {
    1
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_seconds: default_ttl_seconds(),
            persist: false,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_reference_price() -> f64 {
    100.0
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub fetch_window: FetchWindow,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_reference_price")]
    pub reference_price: f64,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            fetch_window: FetchWindow::default(),
            cache: CacheConfig::default(),
            reference_price: default_reference_price(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location. A missing file means
    /// defaults, so the API key can come from the environment alone.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_or_default(&config_path)
    }

    fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("tr", "tufe", "tufe")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("tr", "tufe", "tufe")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The API key, preferring the `EVDS_API_KEY` environment variable.
    pub fn api_key(&self) -> Option<String> {
        Self::pick_api_key(
            std::env::var(API_KEY_ENV).ok(),
            self.providers.evds.api_key.clone(),
        )
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| from_file.filter(|key| !key.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  evds:
    base_url: "http://example.com/evds"
    api_key: "secret"
fetch_window:
  start: 2023-06-01
  end: 2025-12-31
cache:
  ttl_seconds: 3600
  persist: true
reference_price: 250.0
data_path: "/tmp/tufe"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.evds.base_url, "http://example.com/evds");
        assert_eq!(config.providers.evds.api_key.as_deref(), Some("secret"));
        assert_eq!(config.providers.evds.series, "TP.FG.J0");
        assert_eq!(
            config.fetch_window.start,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
        );
        assert_eq!(
            config.fetch_window.end,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert_eq!(config.cache.ttl(), Duration::from_secs(3600));
        assert!(config.cache.persist);
        assert_eq!(config.reference_price, 250.0);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/tufe")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.providers.evds.base_url, DEFAULT_EVDS_URL);
        assert!(config.providers.evds.api_key.is_none());
        assert_eq!(config.fetch_window, FetchWindow::default());
        assert_eq!(config.cache.ttl_seconds, 1);
        assert!(!config.cache.persist);
        assert_eq!(config.reference_price, 100.0);
    }

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let config = AppConfig::load_or_default(&temp_dir.path().join("config.yaml")).unwrap();
        assert_eq!(config.providers.evds.base_url, DEFAULT_EVDS_URL);
        assert_eq!(config.fetch_window, FetchWindow::default());

        let path = temp_dir.path().join("present.yaml");
        fs::write(&path, "reference_price: 50.0\n").unwrap();
        assert_eq!(AppConfig::load_or_default(&path).unwrap().reference_price, 50.0);

        fs::write(&path, "reference_price: [").unwrap();
        assert!(AppConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn test_api_key_precedence() {
        assert_eq!(
            AppConfig::pick_api_key(Some("env".into()), Some("file".into())),
            Some("env".to_string())
        );
        assert_eq!(
            AppConfig::pick_api_key(Some("  ".into()), Some("file".into())),
            Some("file".to_string())
        );
        assert_eq!(AppConfig::pick_api_key(None, Some("".into())), None);
        assert_eq!(AppConfig::pick_api_key(None, None), None);
    }
}
