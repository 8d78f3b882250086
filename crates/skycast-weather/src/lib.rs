//! Weather service for Skycast
//!
//! Fetches current conditions and the 5-day forecast from OpenWeatherMap,
//! resolves the device location with a saved-city fallback, aggregates the
//! 3-hourly feed into days and persists user preferences.

pub mod dashboard;
pub mod forecast;
pub mod location;
pub mod preferences;
pub mod provider;
pub mod retry;
pub mod types;
pub mod units;
pub mod view;

pub use dashboard::{Dashboard, DashboardState};
pub use forecast::{aggregate_daily, DailyForecast, DayLabel};
pub use location::{FixedLocation, GeolocationSource, IpGeolocator, LocationProvider};
pub use preferences::{PreferenceStore, Preferences};
pub use provider::WeatherProvider;
pub use types::*;
pub use units::{convert_temperature, display_temperature, TemperatureUnit};
pub use view::{CurrentConditionsView, DailyForecastView, DashboardView};
