use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// One problem found in the config, tied to its dotted field path
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Everything `Config::validate` found
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Warnings do not make a config invalid
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Errors joined with "; "
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (preferences live here too).
    /// When the file leaves it out, the file's own directory is used.
    #[serde(default)]
    pub config_dir: PathBuf,

    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Device location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Forecast aggregation settings
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// Display preferences
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Unit temperatures are shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// The other unit
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }

    /// Single-letter symbol shown after the degree sign
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "celsius" | "c" => Ok(Self::Celsius),
            "fahrenheit" | "f" => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

/// Which time zone cuts the 3-hour forecast feed into calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    /// The viewer's local time zone
    #[default]
    Local,
    /// The UTC offset reported for the forecast location
    Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key (overridden by `OPENWEATHER_API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenWeatherMap 2.5 API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for transient failures (timeouts, 5xx, 429)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            request_timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl WeatherConfig {
    /// API key from the environment, falling back to the config file.
    /// Blank values count as missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Look the device up by IP address when no fixed position is set
    #[serde(default = "default_geolocation")]
    pub geolocation: bool,

    /// IP geolocation endpoint returning `latitude` / `longitude` JSON
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,

    /// Geolocation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed latitude; must be set together with `longitude`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Fixed longitude; must be set together with `latitude`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

fn default_geolocation() -> bool {
    true
}

fn default_lookup_url() -> String {
    "https://ipapi.co/json/".to_string()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            geolocation: default_geolocation(),
            lookup_url: default_lookup_url(),
            timeout_secs: default_timeout_secs(),
            latitude: None,
            longitude: None,
        }
    }
}

impl LocationConfig {
    /// Fixed coordinates, if both halves are configured
    pub fn fixed_position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of calendar days to show
    #[serde(default = "default_forecast_days")]
    pub days: usize,

    /// Time zone used to group forecast samples into days
    #[serde(default)]
    pub day_boundary: DayBoundary,
}

fn default_forecast_days() -> usize {
    5
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            days: default_forecast_days(),
            day_boundary: DayBoundary::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Unit used until the user saves a preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            location: LocationConfig::default(),
            forecast: ForecastConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file if missing.
    ///
    /// Preferences live next to the file unless it sets `config_dir`.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

        if config.config_dir.as_os_str().is_empty() {
            config.config_dir = match config_path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => default_config_dir(),
            };
        }

        Ok(config)
    }

    /// Load and validate, failing on errors and logging warnings.
    pub fn load_validated(config_path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Check ranges, URLs and cross-field rules.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.weather.max_retries > 10 {
            result.add_warning("weather.max_retries", "More than 10 retries configured");
        }

        if self.weather.resolved_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "No API key configured - set {} or weather.api_key",
                    API_KEY_ENV
                ),
            );
        }

        if self.location.geolocation {
            self.validate_url(&self.location.lookup_url, "location.lookup_url", &mut result);
        }

        if self.location.timeout_secs == 0 {
            result.add_error("location.timeout_secs", "Timeout must be greater than 0");
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within -90..=90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("location.longitude", "Longitude must be within -180..=180");
                }
            }
            (Some(_), None) => {
                result.add_error("location.longitude", "Latitude is set without longitude");
            }
            (None, Some(_)) => {
                result.add_error("location.latitude", "Longitude is set without latitude");
            }
            (None, None) => {}
        }

        if self.forecast.days == 0 {
            result.add_error("forecast.days", "Forecast must show at least one day");
        } else if self.forecast.days > 6 {
            result.add_error("forecast.days", "The forecast feed covers at most 6 calendar days");
        } else if self.forecast.days > 5 {
            result.add_warning(
                "forecast.days",
                "The forecast feed only covers five days; the last day may be partial",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// `<platform config dir>/skycast/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }

    /// Path of the JSON preference file
    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join("preferences.json")
    }
}
