//! Plain-text rendering of dashboard views.

use std::io::{self, Write};

use serde::Serialize;
use skycast_core::config::ValidationResult;
use skycast_weather::view::{CurrentConditionsView, DailyForecastView, DashboardView};

/// Saved search state as printed by `skycast history`
#[derive(Debug, Serialize)]
pub struct HistoryView<'a> {
    pub last_searched_city: Option<&'a str>,
    pub recent_cities: &'a [String],
}

pub fn dashboard(view: &DashboardView, out: &mut impl Write) -> io::Result<()> {
    if let Some(showing) = &view.showing {
        match view.badge {
            Some(badge) => writeln!(out, "{}  [{}]", showing, badge)?,
            None => writeln!(out, "{}", showing)?,
        }
        writeln!(out)?;
    }

    if let Some(current) = &view.current {
        current_conditions(current, out)?;
    }

    if !view.forecast.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}-Day Forecast", view.forecast.len())?;
        let symbol = view.unit.symbol();
        for day in &view.forecast {
            forecast_row(day, symbol, out)?;
        }
    }

    if let Some(welcome) = view.welcome {
        writeln!(out, "{}", welcome)?;
    }

    Ok(())
}

fn current_conditions(current: &CurrentConditionsView, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{}  {} {}",
        current.title,
        current.theme.glyph(),
        current.description
    )?;
    writeln!(
        out,
        "  {}°{}  (feels like {}°{})",
        current.temperature, current.unit_symbol, current.feels_like, current.unit_symbol
    )?;

    let mut details = vec![
        format!("Humidity {}%", current.humidity),
        format!("Wind {} m/s", current.wind_speed),
        format!("Pressure {} hPa", current.pressure),
    ];
    if let Some(km) = &current.visibility_km {
        details.push(format!("Visibility {} km", km));
    }
    writeln!(out, "  {}", details.join("   "))?;

    match (&current.sunrise, &current.sunset) {
        (Some(rise), Some(set)) => writeln!(out, "  Sunrise {}   Sunset {}", rise, set)?,
        (Some(rise), None) => writeln!(out, "  Sunrise {}", rise)?,
        (None, Some(set)) => writeln!(out, "  Sunset {}", set)?,
        (None, None) => {}
    }
    Ok(())
}

fn forecast_row(day: &DailyForecastView, symbol: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "  {:<9} {:<7} {:>4}° / {:>4}°{}  {:<20} {:>3}%  {} m/s",
        day.label,
        day.date,
        day.high,
        day.low,
        symbol,
        day.description,
        day.humidity,
        day.wind_speed
    )
}

pub fn history(history: &HistoryView<'_>, out: &mut impl Write) -> io::Result<()> {
    match history.last_searched_city {
        Some(city) => writeln!(out, "Last searched: {}", city)?,
        None => writeln!(out, "Last searched: (none)")?,
    }

    if history.recent_cities.is_empty() {
        writeln!(out, "No recent searches")?;
    } else {
        writeln!(out, "Recent searches:")?;
        for (i, city) in history.recent_cities.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, city)?;
        }
    }
    Ok(())
}

pub fn validation(
    path: &std::path::Path,
    result: &ValidationResult,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Config file: {}", path.display())?;
    if result.errors.is_empty() && result.warnings.is_empty() {
        writeln!(out, "Configuration is valid")?;
        return Ok(());
    }
    for error in &result.errors {
        writeln!(out, "  error: {}", error)?;
    }
    for warning in &result.warnings {
        writeln!(out, "  warning: {}", warning)?;
    }
    Ok(())
}
