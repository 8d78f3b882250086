//! Device location sources.
//!
//! A terminal has no browser geolocation prompt, so "where am I" comes from
//! fixed coordinates in the config or an IP geolocation lookup.

use reqwest::Client;
use serde::Deserialize;
use skycast_core::{LocationConfig, LocationError};
use std::future::Future;
use std::time::Duration;

use crate::types::Coordinates;

const USER_AGENT: &str = concat!("skycast/", env!("CARGO_PKG_VERSION"));

/// Something that can tell where the device is
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Always answers with the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl LocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Locates the device by its public IP address (ipapi.co-style JSON)
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: Client,
    lookup_url: String,
}

impl IpGeolocator {
    pub fn new(lookup_url: &str, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        Ok(Self {
            client,
            lookup_url: lookup_url.to_string(),
        })
    }
}

impl LocationProvider for IpGeolocator {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        let response = self
            .client
            .get(&self.lookup_url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LocationError::Timeout
                } else {
                    LocationError::Lookup(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LocationError::Lookup(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Lookup(e.to_string()))?;

        if body.error {
            return Err(LocationError::Lookup(
                body.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => {
                tracing::info!(
                    "IP geolocation: {:.4}, {:.4} ({})",
                    latitude,
                    longitude,
                    body.city.as_deref().unwrap_or("unknown place")
                );
                Ok(Coordinates::new(latitude, longitude))
            }
            _ => Err(LocationError::Lookup(
                "lookup response had no coordinates".to_string(),
            )),
        }
    }
}

/// Location source chosen from configuration
#[derive(Debug, Clone)]
pub enum GeolocationSource {
    Fixed(FixedLocation),
    Ip(IpGeolocator),
    /// Geolocation turned off; every request is refused
    Disabled,
}

impl GeolocationSource {
    /// Fixed coordinates win, then IP lookup if enabled.
    pub fn from_config(config: &LocationConfig) -> Result<Self, LocationError> {
        if let Some((lat, lon)) = config.fixed_position() {
            return Ok(Self::Fixed(FixedLocation(Coordinates::new(lat, lon))));
        }
        if config.geolocation {
            let timeout = Duration::from_secs(config.timeout_secs);
            return Ok(Self::Ip(IpGeolocator::new(&config.lookup_url, timeout)?));
        }
        Ok(Self::Disabled)
    }
}

impl LocationProvider for GeolocationSource {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        match self {
            Self::Fixed(fixed) => fixed.current_location().await,
            Self::Ip(ip) => ip.current_location().await,
            Self::Disabled => Err(LocationError::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_location() {
        let fixed = FixedLocation(Coordinates::new(47.6062, -122.3321));
        let coords = fixed.current_location().await.unwrap();
        assert_eq!(coords, Coordinates::new(47.6062, -122.3321));
    }

    #[tokio::test]
    async fn test_fixed_position_wins_over_geolocation() {
        let config = LocationConfig {
            latitude: Some(1.0),
            longitude: Some(2.0),
            ..LocationConfig::default()
        };
        let source = GeolocationSource::from_config(&config).unwrap();
        assert!(matches!(source, GeolocationSource::Fixed(_)));
        assert_eq!(
            source.current_location().await.unwrap(),
            Coordinates::new(1.0, 2.0)
        );
    }

    #[tokio::test]
    async fn test_disabled_geolocation_is_unsupported() {
        let config = LocationConfig {
            geolocation: false,
            ..LocationConfig::default()
        };
        let source = GeolocationSource::from_config(&config).unwrap();
        let err = source.current_location().await.unwrap_err();
        assert!(matches!(err, LocationError::Unsupported));
    }

    #[test]
    fn test_enabled_geolocation_uses_ip_lookup() {
        let source = GeolocationSource::from_config(&LocationConfig::default()).unwrap();
        assert!(matches!(source, GeolocationSource::Ip(_)));
    }
}
