//! Display-ready view models built from a weather report.
//!
//! Everything here is already converted to the selected unit and formatted
//! for the chosen time zone, so renderers only lay text out.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use skycast_core::TemperatureUnit;

use crate::forecast::{aggregate_daily, DailyForecast, DayLabel};
use crate::types::{ConditionTheme, CurrentWeather, WeatherReport};
use crate::units::{display_temperature, visibility_km};

pub const CURRENT_LOCATION_BADGE: &str = "Your Current Location";
pub const SEARCHED_LOCATION_BADGE: &str = "Searched Location";
pub const WELCOME_MESSAGE: &str =
    "Allow location access to see your local weather, or search for any city.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditionsView {
    /// "London, GB"
    pub title: String,
    pub description: String,
    pub temperature: i64,
    pub feels_like: i64,
    pub unit_symbol: &'static str,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
    pub visibility_km: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub icon_url: Option<String>,
    pub theme: ConditionTheme,
    pub is_current_location: bool,
}

impl CurrentConditionsView {
    pub fn build<Tz>(
        current: &CurrentWeather,
        unit: TemperatureUnit,
        tz: &Tz,
        is_current_location: bool,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let title = match current.sys.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", current.name, country),
            _ => current.name.clone(),
        };
        let condition = current.condition();

        Self {
            title,
            description: condition
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            temperature: display_temperature(current.main.temp, unit),
            feels_like: display_temperature(current.main.feels_like, unit),
            unit_symbol: unit.symbol(),
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
            pressure: current.main.pressure,
            visibility_km: current.visibility.map(visibility_km),
            sunrise: current.sys.sunrise.and_then(|t| clock_time(t, tz)),
            sunset: current.sys.sunset.and_then(|t| clock_time(t, tz)),
            icon_url: condition.map(|c| c.icon_url()),
            theme: current.theme(),
            is_current_location,
        }
    }
}

/// 12-hour clock time such as "06:42 AM"
fn clock_time<Tz>(unix_seconds: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|t| t.with_timezone(tz).format("%I:%M %p").to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecastView {
    pub label: String,
    /// "Oct 16"
    pub date: String,
    pub high: i64,
    pub low: i64,
    pub description: String,
    pub icon_url: Option<String>,
    pub humidity: u8,
    /// One decimal, m/s
    pub wind_speed: String,
    pub is_today: bool,
    pub is_tomorrow: bool,
}

impl DailyForecastView {
    pub fn build(day: &DailyForecast, unit: TemperatureUnit) -> Self {
        Self {
            label: day.label.to_string(),
            date: day.short_date(),
            high: display_temperature(day.high, unit),
            low: display_temperature(day.low, unit),
            description: day
                .condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            icon_url: day.condition.as_ref().map(|c| c.icon_url()),
            humidity: day.humidity,
            wind_speed: format!("{:.1}", day.wind_speed),
            is_today: day.label == DayLabel::Today,
            is_tomorrow: day.label == DayLabel::Tomorrow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub unit: TemperatureUnit,
    /// Where the data came from, once a city is known
    pub badge: Option<&'static str>,
    /// "Showing: <city>"
    pub showing: Option<String>,
    pub theme: ConditionTheme,
    pub current: Option<CurrentConditionsView>,
    pub forecast: Vec<DailyForecastView>,
    pub error: Option<String>,
    /// Shown when there is neither data nor an error
    pub welcome: Option<&'static str>,
}

/// Inputs for [`DashboardView::build`]
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub report: Option<&'a WeatherReport>,
    pub city: Option<&'a str>,
    pub is_current_location: bool,
    pub unit: TemperatureUnit,
    pub error: Option<&'static str>,
    pub forecast_days: usize,
    pub now: DateTime<Utc>,
}

impl DashboardView {
    pub fn build<Tz>(ctx: ViewContext<'_>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let current = ctx.report.map(|r| {
            CurrentConditionsView::build(&r.current, ctx.unit, tz, ctx.is_current_location)
        });
        let forecast = ctx
            .report
            .map(|r| {
                aggregate_daily(&r.forecast.list, tz, ctx.now, ctx.forecast_days)
                    .iter()
                    .map(|day| DailyForecastView::build(day, ctx.unit))
                    .collect()
            })
            .unwrap_or_default();

        let badge = ctx.city.map(|_| {
            if ctx.is_current_location {
                CURRENT_LOCATION_BADGE
            } else {
                SEARCHED_LOCATION_BADGE
            }
        });

        let welcome = (ctx.report.is_none() && ctx.error.is_none()).then_some(WELCOME_MESSAGE);

        Self {
            unit: ctx.unit,
            badge,
            showing: ctx.city.map(|c| format!("Showing: {}", c)),
            theme: ctx
                .report
                .map(|r| r.current.theme())
                .unwrap_or_default(),
            current,
            forecast,
            error: ctx.error.map(str::to_string),
            welcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, Forecast, ForecastCity, ForecastEntry, MainReadings, SunTimes, Wind};
    use chrono::FixedOffset;

    fn condition(main: &str, description: &str) -> Condition {
        Condition {
            id: 0,
            main: main.into(),
            description: description.into(),
            icon: "04d".into(),
        }
    }

    fn london() -> CurrentWeather {
        CurrentWeather {
            name: "London".into(),
            coord: None,
            sys: SunTimes {
                country: Some("GB".into()),
                // 2025-10-16 06:30:00 UTC and 17:05:00 UTC
                sunrise: Some(1_760_596_200),
                sunset: Some(1_760_634_300),
            },
            main: MainReadings {
                temp: 21.6,
                feels_like: 20.2,
                humidity: 64,
                pressure: 1015,
            },
            weather: vec![condition("Clouds", "broken clouds")],
            wind: Wind { speed: 3.6 },
            visibility: Some(10000),
            dt: 1_760_600_000,
            timezone: 3600,
        }
    }

    fn report() -> WeatherReport {
        let entry = |dt: i64, temp: f64| ForecastEntry {
            dt,
            main: MainReadings {
                temp,
                feels_like: temp,
                humidity: 50,
                pressure: 1000,
            },
            weather: vec![condition("Rain", "light rain")],
            wind: Wind { speed: 2.0 },
        };
        WeatherReport {
            current: london(),
            forecast: Forecast {
                list: vec![entry(1_760_600_000, 14.0), entry(1_760_610_800, 18.0)],
                city: ForecastCity {
                    name: "London".into(),
                    country: Some("GB".into()),
                    timezone: 3600,
                },
            },
            fetched_at: Utc::now(),
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_590_000, 0).unwrap()
    }

    #[test]
    fn test_current_view_celsius() {
        let view = CurrentConditionsView::build(&london(), TemperatureUnit::Celsius, &Utc, true);
        assert_eq!(view.title, "London, GB");
        assert_eq!(view.description, "broken clouds");
        assert_eq!(view.temperature, 22);
        assert_eq!(view.feels_like, 20);
        assert_eq!(view.unit_symbol, "C");
        assert_eq!(view.visibility_km.as_deref(), Some("10.0"));
        assert_eq!(view.sunrise.as_deref(), Some("06:30 AM"));
        assert_eq!(view.sunset.as_deref(), Some("05:05 PM"));
        assert_eq!(view.theme, ConditionTheme::Cloudy);
        assert!(view.is_current_location);
    }

    #[test]
    fn test_current_view_fahrenheit_and_offset() {
        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let view =
            CurrentConditionsView::build(&london(), TemperatureUnit::Fahrenheit, &plus_one, false);
        assert_eq!(view.temperature, 71);
        assert_eq!(view.unit_symbol, "F");
        assert_eq!(view.sunrise.as_deref(), Some("07:30 AM"));
    }

    #[test]
    fn test_title_without_country() {
        let mut current = london();
        current.sys.country = None;
        let view = CurrentConditionsView::build(&current, TemperatureUnit::Celsius, &Utc, false);
        assert_eq!(view.title, "London");
    }

    #[test]
    fn test_dashboard_view_with_report() {
        let report = report();
        let view = DashboardView::build(
            ViewContext {
                report: Some(&report),
                city: Some("London"),
                is_current_location: false,
                unit: TemperatureUnit::Celsius,
                error: None,
                forecast_days: 5,
                now: now(),
            },
            &Utc,
        );

        assert_eq!(view.badge, Some(SEARCHED_LOCATION_BADGE));
        assert_eq!(view.showing.as_deref(), Some("Showing: London"));
        assert_eq!(view.theme, ConditionTheme::Cloudy);
        assert_eq!(view.forecast.len(), 1);
        let today = &view.forecast[0];
        assert_eq!(today.label, "Today");
        assert!(today.is_today);
        assert_eq!(today.high, 18);
        assert_eq!(today.low, 14);
        assert_eq!(today.wind_speed, "2.0");
        assert_eq!(today.description, "light rain");
        assert!(view.welcome.is_none());
    }

    #[test]
    fn test_dashboard_view_empty_shows_welcome() {
        let view = DashboardView::build(
            ViewContext {
                report: None,
                city: None,
                is_current_location: false,
                unit: TemperatureUnit::Celsius,
                error: None,
                forecast_days: 5,
                now: now(),
            },
            &Utc,
        );
        assert_eq!(view.welcome, Some(WELCOME_MESSAGE));
        assert!(view.badge.is_none());
        assert!(view.current.is_none());
        assert_eq!(view.theme, ConditionTheme::Default);
    }

    #[test]
    fn test_dashboard_view_error_hides_welcome() {
        let view = DashboardView::build(
            ViewContext {
                report: None,
                city: None,
                is_current_location: false,
                unit: TemperatureUnit::Celsius,
                error: Some("Failed to fetch forecast data."),
                forecast_days: 5,
                now: now(),
            },
            &Utc,
        );
        assert!(view.welcome.is_none());
        assert_eq!(view.error.as_deref(), Some("Failed to fetch forecast data."));
    }
}
