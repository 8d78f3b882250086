mod render;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use skycast_core::{AppError, Config, ConfigError, TemperatureUnit};
use skycast_weather::{Coordinates, Dashboard, GeolocationSource, PreferenceStore, WeatherProvider};

/// Current weather and a five-day forecast for where you are or any city.
#[derive(Parser, Debug)]
#[command(name = "skycast", version, about)]
struct Args {
    /// Config file (default: the platform config dir, skycast/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Show temperatures in this unit without saving it
    #[arg(long, global = true)]
    unit: Option<TemperatureUnit>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Weather for the current location, falling back to the last search
    Show,
    /// Weather for a city
    Search {
        #[arg(required = true)]
        city: Vec<String>,
    },
    /// Weather at explicit coordinates
    Coords {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    /// Show or change the saved temperature unit
    Unit {
        #[arg(value_enum)]
        action: Option<UnitAction>,
    },
    /// List the last searched city and recent searches
    History,
    /// Forget the last searched city, then show the current location
    Clear {
        /// Also forget the recent searches
        #[arg(long)]
        all: bool,
    },
    /// Print the config file path and check it
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum UnitAction {
    Celsius,
    Fahrenheit,
    Toggle,
}

#[derive(Serialize)]
struct UnitReport {
    temperature_unit: TemperatureUnit,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let mut args = Args::parse();

    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    skycast_core::init(filter)?;

    let command = args.command.take().unwrap_or(Command::Show);
    if let Command::Config = command {
        return check_config(&args);
    }

    let (config, _) = match Config::load_validated(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => return Ok(report_error(ConfigError(format!("{:#}", e)).into())),
    };

    let provider = match WeatherProvider::new(&config.weather) {
        Ok(provider) => provider,
        Err(e) => return Ok(report_error(e.into())),
    };
    let locator = match GeolocationSource::from_config(&config.location) {
        Ok(locator) => locator,
        Err(e) => return Ok(report_error(e.into())),
    };
    let preferences = PreferenceStore::open(config.preferences_path());
    let mut dashboard = Dashboard::new(
        provider,
        locator,
        preferences,
        config.forecast.clone(),
        config.display.temperature_unit,
    );
    apply_unit_override(&mut dashboard, args.unit);

    let outcome = match command {
        Command::Show => dashboard.load_current_location().await,
        Command::Search { city } => dashboard.search(&city.join(" ")).await,
        Command::Coords {
            latitude,
            longitude,
        } => {
            dashboard
                .use_coordinates(Coordinates::new(latitude, longitude))
                .await
        }
        Command::Clear { all } => {
            if all {
                dashboard.clear_all_history()?;
            }
            dashboard.clear_history().await
        }
        Command::Unit { action } => return change_unit(&mut dashboard, action, args.json),
        Command::History => return print_history(&dashboard, args.json),
        Command::Config => return check_config(&args),
    };

    print_dashboard(&dashboard, args.json)?;

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(report_error(e.into())),
    }
}

/// `--unit` changes this run's display only; the saved preference is untouched.
fn apply_unit_override<L>(dashboard: &mut Dashboard<L>, unit: Option<TemperatureUnit>)
where
    L: skycast_weather::LocationProvider,
{
    if let Some(unit) = unit {
        dashboard.override_unit(unit);
    }
}

fn print_dashboard<L>(dashboard: &Dashboard<L>, json: bool) -> Result<()>
where
    L: skycast_weather::LocationProvider,
{
    let view = dashboard.view(Utc::now());
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &view).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        render::dashboard(&view, &mut out)?;
    }
    Ok(())
}

fn change_unit<L>(
    dashboard: &mut Dashboard<L>,
    action: Option<UnitAction>,
    json: bool,
) -> Result<ExitCode>
where
    L: skycast_weather::LocationProvider,
{
    let saved = match action {
        None => Ok(()),
        Some(UnitAction::Toggle) => dashboard.toggle_unit().map(|_| ()),
        Some(UnitAction::Celsius) => dashboard.set_unit(TemperatureUnit::Celsius),
        Some(UnitAction::Fahrenheit) => dashboard.set_unit(TemperatureUnit::Fahrenheit),
    };
    if let Err(e) = saved {
        return Ok(report_error(e.into()));
    }

    let unit = dashboard.state().unit;
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &UnitReport { temperature_unit: unit })?;
        writeln!(out)?;
    } else {
        writeln!(out, "Temperature unit: {} (°{})", unit, unit.symbol())?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_history<L>(dashboard: &Dashboard<L>, json: bool) -> Result<ExitCode>
where
    L: skycast_weather::LocationProvider,
{
    let prefs = dashboard.preferences();
    let history = render::HistoryView {
        last_searched_city: prefs.last_searched_city(),
        recent_cities: prefs.recent_cities(),
    };
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &history)?;
        writeln!(out)?;
    } else {
        render::history(&history, &mut out)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// `skycast config` reports problems instead of refusing to start.
fn check_config(args: &Args) -> Result<ExitCode> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&path)?;
    let result = config.validate();

    let mut out = io::stdout().lock();
    render::validation(&path, &result, &mut out)?;
    writeln!(out, "Preferences: {}", config.preferences_path().display())?;

    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Exit status for a run that ended in the error state
const EXIT_ERROR: u8 = 1;

/// User message on stderr; the full cause goes to the log.
fn report_error(error: AppError) -> ExitCode {
    ExitCode::from(error_status(&error))
}

fn error_status(error: &AppError) -> u8 {
    tracing::debug!("{}", error);
    eprintln!("{}", error.user_message());
    EXIT_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use skycast_core::{ForecastConfig, WeatherError};
    use skycast_weather::FixedLocation;

    fn dashboard(dir: &tempfile::TempDir) -> Dashboard<FixedLocation> {
        Dashboard::new(
            WeatherProvider::with_base_url("http://127.0.0.1:9", "test-key"),
            FixedLocation(Coordinates::new(0.0, 0.0)),
            PreferenceStore::open(dir.path().join("preferences.json")),
            ForecastConfig::default(),
            TemperatureUnit::Celsius,
        )
    }

    #[test]
    fn test_error_state_exits_non_zero() {
        for error in [
            AppError::from(WeatherError::NoLocation),
            AppError::from(WeatherError::MissingApiKey),
            AppError::from(ConfigError("forecast.days: must be at least 1".into())),
        ] {
            assert_ne!(error_status(&error), 0);
        }
    }

    #[test]
    fn test_unit_flag_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from(["skycast", "--unit", "f", "search", "Lima"]).unwrap();
        assert!(matches!(args.command, Some(Command::Search { .. })));

        let mut dash = dashboard(&dir);
        apply_unit_override(&mut dash, args.unit);

        assert_eq!(dash.state().unit, TemperatureUnit::Fahrenheit);
        assert_eq!(dash.preferences().temperature_unit(), None);
        assert_eq!(dashboard(&dir).state().unit, TemperatureUnit::Celsius);
    }

    #[test]
    fn test_unit_command_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut dash = dashboard(&dir);
        change_unit(&mut dash, Some(UnitAction::Toggle), true).unwrap();

        assert_eq!(dashboard(&dir).state().unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let args = Args::try_parse_from(["skycast", "coords", "-33.92", "-70.65"]).unwrap();
        match args.command {
            Some(Command::Coords {
                latitude,
                longitude,
            }) => {
                assert_eq!(latitude, -33.92);
                assert_eq!(longitude, -70.65);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_means_show() {
        let args = Args::try_parse_from(["skycast", "--json"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.json);
    }
}
