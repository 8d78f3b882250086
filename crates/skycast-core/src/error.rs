//! Error types shared by the Skycast crates.
//!
//! Every error can produce a short `user_message()` for the dashboard while
//! its `Display` form keeps the underlying cause for logs.

use thiserror::Error;

/// Anything that can end a CLI run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
        }
    }
}

/// Transport-level failures, before a response is classified per endpoint.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Unreadable response: {0}")]
    InvalidResponse(String),
}

/// The config file could not be loaded or failed validation.
#[derive(Debug, Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        "The config file has problems. Run `skycast config` to see them."
    }
}

/// Weather service errors.
///
/// Each variant records which request failed; the underlying cause is kept
/// for logs while `user_message` stays fixed per variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Current weather request failed: {0}")]
    CurrentUnavailable(String),

    #[error("Forecast request failed: {0}")]
    ForecastUnavailable(String),

    #[error("Weather by coordinates failed: {0}")]
    CoordinatesUnavailable(String),

    #[error("No location available")]
    NoLocation,

    #[error("Empty search query")]
    EmptyQuery,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found. Please check the spelling.",
            WeatherError::InvalidApiKey => "Invalid API key. Please check your configuration.",
            WeatherError::MissingApiKey => {
                "No weather API key configured. Set OPENWEATHER_API_KEY or weather.api_key."
            }
            WeatherError::CurrentUnavailable(_) => {
                "Failed to fetch weather data. Please try again."
            }
            WeatherError::ForecastUnavailable(_) => "Failed to fetch forecast data.",
            WeatherError::CoordinatesUnavailable(_) => {
                "Failed to fetch weather data for your location."
            }
            WeatherError::NoLocation => {
                "Please allow location access or search for a city to see weather data."
            }
            WeatherError::EmptyQuery => "Please enter a city name to search.",
        }
    }
}

/// Device location errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Geolocation is not available")]
    Unsupported,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location lookup failed: {0}")]
    Lookup(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "Geolocation is not supported on this device.",
            LocationError::Timeout => "Finding your location took too long. Please try again.",
            LocationError::Lookup(_) => "Could not determine your location.",
        }
    }
}

/// Local preference storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Write { .. } => "Failed to save your preferences. Please try again.",
            StorageError::Serialize(_) => "Failed to save your preferences. Please try again.",
        }
    }
}

/// Classify a `reqwest` failure.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let messages = [
            ConfigError("forecast.days: must be at least 1".into()).user_message(),
            WeatherError::NoLocation.user_message(),
            WeatherError::ForecastUnavailable("x".into()).user_message(),
            LocationError::Unsupported.user_message(),
            StorageError::Write {
                path: "prefs.json".into(),
                source: std::io::Error::other("disk full"),
            }
            .user_message(),
        ];

        for message in messages {
            assert!(!message.trim().is_empty());
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let weather_err = WeatherError::InvalidApiKey;
        let app_err: AppError = weather_err.into();
        assert!(matches!(app_err, AppError::Weather(WeatherError::InvalidApiKey)));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Weather(WeatherError::CityNotFound("Atlantis".into()));
        assert_eq!(
            app_err.user_message(),
            "City not found. Please check the spelling."
        );
    }

    #[test]
    fn test_location_error_conversion() {
        let app_err: AppError = LocationError::Timeout.into();
        assert_eq!(
            app_err.user_message(),
            "Finding your location took too long. Please try again."
        );
    }

    #[test]
    fn test_config_error_keeps_cause_for_logs() {
        let app_err: AppError = ConfigError("forecast.days: must be at least 1".into()).into();
        assert!(app_err.to_string().contains("forecast.days"));
        assert!(app_err.user_message().contains("skycast config"));
    }

    #[test]
    fn test_display_keeps_cause() {
        let err = WeatherError::ForecastUnavailable("HTTP 500".into());
        assert!(err.to_string().contains("HTTP 500"));
        assert_eq!(err.user_message(), "Failed to fetch forecast data.");
    }
}
