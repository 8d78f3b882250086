//! OpenWeatherMap client for current conditions and the 5-day/3-hour forecast.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use skycast_core::{ReqwestErrorExt, WeatherConfig, WeatherError};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::retry::{send_with_retry, RetryPolicy};
use crate::types::{Coordinates, CurrentWeather, Forecast, WeatherReport};

/// Values come back in Celsius and metres per second.
const API_UNITS: &str = "metric";

/// Which request failed, for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    CurrentByCity,
    ForecastByCity,
    CurrentByCoords,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Endpoint::CurrentByCity => "current weather by city",
            Endpoint::ForecastByCity => "forecast by city",
            Endpoint::CurrentByCoords => "current weather by coordinates",
        }
    }

    fn failure(self, status: Option<StatusCode>, query: &str, cause: String) -> WeatherError {
        match (self, status) {
            (Endpoint::CurrentByCity, Some(StatusCode::NOT_FOUND)) => {
                WeatherError::CityNotFound(query.to_string())
            }
            (Endpoint::CurrentByCity, Some(StatusCode::UNAUTHORIZED)) => {
                WeatherError::InvalidApiKey
            }
            (Endpoint::CurrentByCity, _) => WeatherError::CurrentUnavailable(cause),
            (Endpoint::ForecastByCity, _) => WeatherError::ForecastUnavailable(cause),
            (Endpoint::CurrentByCoords, _) => WeatherError::CoordinatesUnavailable(cause),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| WeatherError::CurrentUnavailable(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            retry: RetryPolicy::with_retries(config.max_retries),
        })
    }

    /// Point at another server with an explicit key (mock servers, proxies).
    /// A blank key counts as missing.
    pub fn with_base_url(base_url: &str, api_key: &str) -> Self {
        let api_key = api_key.trim();
        Self {
            client: Arc::new(Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: (!api_key.is_empty()).then(|| api_key.to_string()),
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current weather for a city name
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_city(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.get(Endpoint::CurrentByCity, "weather", &[("q", city.to_string())], city)
            .await
    }

    /// 5-day forecast in 3-hour steps for a city name
    #[instrument(skip(self), level = "info")]
    pub async fn forecast_by_city(&self, city: &str) -> Result<Forecast, WeatherError> {
        self.get(Endpoint::ForecastByCity, "forecast", &[("q", city.to_string())], city)
            .await
    }

    /// Current weather at a position; the response names the nearest place
    #[instrument(skip(self), level = "info")]
    pub async fn current_by_coords(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentWeather, WeatherError> {
        let params = [
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
        ];
        self.get(Endpoint::CurrentByCoords, "weather", &params, &coords.to_string())
            .await
    }

    /// Current weather and forecast for a city, requested concurrently.
    ///
    /// Fails if either request fails.
    pub async fn fetch_by_city(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let (current, forecast) =
            tokio::try_join!(self.current_by_city(city), self.forecast_by_city(city))?;
        Ok(WeatherReport::new(current, forecast))
    }

    /// Current weather at a position, then the forecast for the place it names.
    pub async fn fetch_by_coords(&self, coords: Coordinates) -> Result<WeatherReport, WeatherError> {
        let current = self.current_by_coords(coords).await?;
        let forecast = self.forecast_by_city(&current.name).await?;
        Ok(WeatherReport::new(current, forecast))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: &[(&str, String)],
        query: &str,
    ) -> Result<T, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, path);

        let build = || -> RequestBuilder {
            self.client
                .get(&url)
                .query(params)
                .query(&[("appid", api_key), ("units", API_UNITS)])
        };

        let response = send_with_retry(&self.retry, endpoint.label(), build)
            .await
            .map_err(|e| {
                let network = e.into_network_error();
                tracing::warn!("{} failed: {}", endpoint.label(), network);
                endpoint.failure(None, query, network.to_string())
            })?;

        self.handle_response(endpoint, response, query).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        response: Response,
        query: &str,
    ) -> Result<T, WeatherError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}: {}", endpoint.label(), status, body);
            return Err(endpoint.failure(Some(status), query, format!("HTTP {}", status)));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::warn!("{} returned an unreadable body: {}", endpoint.label(), e);
            endpoint.failure(None, query, e.into_network_error().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_lookup_classification() {
        let e = Endpoint::CurrentByCity.failure(Some(StatusCode::NOT_FOUND), "Atlantis", "x".into());
        assert!(matches!(e, WeatherError::CityNotFound(ref c) if c == "Atlantis"));

        let e = Endpoint::CurrentByCity.failure(Some(StatusCode::UNAUTHORIZED), "Paris", "x".into());
        assert!(matches!(e, WeatherError::InvalidApiKey));

        let e = Endpoint::CurrentByCity.failure(Some(StatusCode::BAD_GATEWAY), "Paris", "x".into());
        assert!(matches!(e, WeatherError::CurrentUnavailable(_)));
    }

    #[test]
    fn test_forecast_and_coords_ignore_status() {
        let e = Endpoint::ForecastByCity.failure(Some(StatusCode::NOT_FOUND), "Atlantis", "x".into());
        assert!(matches!(e, WeatherError::ForecastUnavailable(_)));

        let e = Endpoint::CurrentByCoords.failure(Some(StatusCode::UNAUTHORIZED), "0, 0", "x".into());
        assert!(matches!(e, WeatherError::CoordinatesUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let config = WeatherConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            ..WeatherConfig::default()
        };
        let mut provider = WeatherProvider::new(&config).unwrap();
        // The environment may carry a real key; force the missing case.
        provider.api_key = None;

        let err = provider.current_by_city("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::MissingApiKey));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = WeatherProvider::with_base_url("http://localhost:1234/", "key");
        assert_eq!(provider.base_url, "http://localhost:1234");
        assert!(provider.has_api_key());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert!(!WeatherProvider::with_base_url("http://localhost:1234", "  ").has_api_key());
    }
}
