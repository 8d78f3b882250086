pub mod config;
pub mod error;

pub use config::{
    Config, DayBoundary, DisplayConfig, ForecastConfig, LocationConfig, TemperatureUnit,
    ValidationResult, WeatherConfig,
};
pub use error::{
    AppError, ConfigError, LocationError, NetworkError, ReqwestErrorExt, StorageError,
    WeatherError,
};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so stdout
/// only carries dashboard output.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Skycast core initialized");
    Ok(())
}
