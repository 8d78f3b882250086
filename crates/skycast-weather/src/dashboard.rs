//! Dashboard controller: resolves a location, fetches weather and keeps the
//! state a view is rendered from.

use chrono::{DateTime, Local, Utc};
use skycast_core::{DayBoundary, ForecastConfig, StorageError, TemperatureUnit, WeatherError};

use crate::location::LocationProvider;
use crate::preferences::PreferenceStore;
use crate::provider::WeatherProvider;
use crate::types::{Coordinates, WeatherReport};
use crate::view::{DashboardView, ViewContext};

/// What the dashboard is currently showing
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub report: Option<WeatherReport>,
    pub error: Option<WeatherError>,
    pub unit: TemperatureUnit,
    pub city: Option<String>,
    pub is_current_location: bool,
}

pub struct Dashboard<L> {
    provider: WeatherProvider,
    locator: L,
    preferences: PreferenceStore,
    forecast: ForecastConfig,
    state: DashboardState,
}

impl<L: LocationProvider> Dashboard<L> {
    /// The saved unit preference wins over `default_unit`.
    pub fn new(
        provider: WeatherProvider,
        locator: L,
        preferences: PreferenceStore,
        forecast: ForecastConfig,
        default_unit: TemperatureUnit,
    ) -> Self {
        let unit = preferences.temperature_unit().unwrap_or(default_unit);
        Self {
            provider,
            locator,
            preferences,
            forecast,
            state: DashboardState {
                unit,
                ..DashboardState::default()
            },
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Weather for wherever the device is.
    ///
    /// Falls back to the last searched city when geolocation or the
    /// coordinate fetch fails, and to [`WeatherError::NoLocation`] when
    /// there is no saved city either. Without an API key nothing is tried.
    pub async fn load_current_location(&mut self) -> Result<(), WeatherError> {
        if !self.provider.has_api_key() {
            return self.fail(WeatherError::MissingApiKey);
        }

        match self.locator.current_location().await {
            Ok(coords) => match self.provider.fetch_by_coords(coords).await {
                Ok(report) => {
                    let city = report.current.name.clone();
                    self.show(report, city, true);
                    return Ok(());
                }
                Err(e) => tracing::warn!("Current location weather failed: {}", e),
            },
            Err(e) => tracing::warn!("Location unavailable: {}", e),
        }

        self.fall_back_to_saved_city().await
    }

    async fn fall_back_to_saved_city(&mut self) -> Result<(), WeatherError> {
        match self.preferences.last_searched_city().map(str::to_string) {
            Some(city) => {
                tracing::info!("Loading saved city: {}", city);
                self.search(&city).await
            }
            None => {
                self.state.is_current_location = false;
                self.fail(WeatherError::NoLocation)
            }
        }
    }

    /// Weather for a city name typed by the user.
    ///
    /// Blank queries are rejected without touching state. On success the
    /// city is remembered as the last search and pushed onto the recent list.
    pub async fn search(&mut self, query: &str) -> Result<(), WeatherError> {
        let city = query.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        self.state.error = None;
        self.state.is_current_location = false;

        match self.provider.fetch_by_city(city).await {
            Ok(report) => {
                self.show(report, city.to_string(), false);
                if let Err(e) = self.remember_search(city) {
                    tracing::warn!("Failed to save search history: {}", e);
                }
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Weather for explicit coordinates; nothing is persisted.
    pub async fn use_coordinates(&mut self, coords: Coordinates) -> Result<(), WeatherError> {
        self.state.error = None;
        match self.provider.fetch_by_coords(coords).await {
            Ok(report) => {
                let city = report.current.name.clone();
                self.show(report, city, true);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Switch between Celsius and Fahrenheit and persist the choice.
    pub fn toggle_unit(&mut self) -> Result<TemperatureUnit, StorageError> {
        let unit = self.state.unit.toggled();
        self.set_unit(unit)?;
        Ok(unit)
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) -> Result<(), StorageError> {
        self.state.unit = unit;
        self.preferences.set_temperature_unit(unit)
    }

    /// Show `unit` for this session only.
    pub fn override_unit(&mut self, unit: TemperatureUnit) {
        self.state.unit = unit;
    }

    /// Forget the last searched city, then show the current location again.
    pub async fn clear_history(&mut self) -> Result<(), WeatherError> {
        if let Err(e) = self.preferences.clear_last_searched_city() {
            tracing::warn!("Failed to clear saved city: {}", e);
        }
        self.load_current_location().await
    }

    /// Forget the last searched city and the recent list.
    pub fn clear_all_history(&mut self) -> Result<(), StorageError> {
        self.preferences.clear_all_weather_data()
    }

    /// Repeat whatever produced the current state.
    pub async fn retry(&mut self) -> Result<(), WeatherError> {
        match self.state.city.clone() {
            Some(city) if !self.state.is_current_location => self.search(&city).await,
            _ => self.load_current_location().await,
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> DashboardView {
        let ctx = ViewContext {
            report: self.state.report.as_ref(),
            city: self.state.city.as_deref(),
            is_current_location: self.state.is_current_location,
            unit: self.state.unit,
            error: self.state.error.as_ref().map(WeatherError::user_message),
            forecast_days: self.forecast.days,
            now,
        };

        match (self.forecast.day_boundary, &self.state.report) {
            (DayBoundary::Location, Some(report)) => {
                DashboardView::build(ctx, &report.forecast.utc_offset())
            }
            _ => DashboardView::build(ctx, &Local),
        }
    }

    fn show(&mut self, report: WeatherReport, city: String, is_current_location: bool) {
        tracing::info!(
            "Showing weather for {} ({})",
            city,
            if is_current_location { "current location" } else { "search" }
        );
        self.state.report = Some(report);
        self.state.city = Some(city);
        self.state.is_current_location = is_current_location;
        self.state.error = None;
    }

    fn fail(&mut self, error: WeatherError) -> Result<(), WeatherError> {
        tracing::warn!("Dashboard error: {}", error);
        self.state.error = Some(error.clone());
        Err(error)
    }

    fn remember_search(&mut self, city: &str) -> Result<(), StorageError> {
        self.preferences.set_last_searched_city(city)?;
        self.preferences.add_recent_city(city)?;
        Ok(())
    }
}
