use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One entry of the `weather` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub id: u32,
    pub main: String,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }

    pub fn theme(&self) -> ConditionTheme {
        ConditionTheme::from_main(&self.main)
    }
}

/// Temperature block, in the units requested (always metric here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    #[serde(default)]
    pub pressure: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    /// Metres per second
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SunTimes {
    #[serde(default)]
    pub country: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub sunrise: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiCoord {
    pub lat: f64,
    pub lon: f64,
}

/// `/weather` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    #[serde(default)]
    pub coord: Option<ApiCoord>,
    #[serde(default)]
    pub sys: SunTimes,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    /// Metres
    #[serde(default)]
    pub visibility: Option<u32>,
    /// Unix seconds of the observation
    #[serde(default)]
    pub dt: i64,
    /// Offset from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

impl CurrentWeather {
    /// The primary condition, if the API sent one
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn theme(&self) -> ConditionTheme {
        self.condition()
            .map(Condition::theme)
            .unwrap_or(ConditionTheme::Default)
    }
}

/// One 3-hourly sample of the `/forecast` feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Unix seconds
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
}

impl ForecastEntry {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Offset from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
}

/// `/forecast` response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    #[serde(default)]
    pub city: ForecastCity,
}

impl Forecast {
    /// UTC offset of the forecast location
    pub fn utc_offset(&self) -> FixedOffset {
        offset_from_seconds(self.city.timezone)
    }
}

/// Convert an API `timezone` value to an offset, falling back to UTC when out of range
pub fn offset_from_seconds(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| {
        tracing::warn!("Ignoring out-of-range UTC offset: {}s", seconds);
        Utc.fix()
    })
}

/// Current conditions and forecast fetched together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Forecast,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReport {
    pub fn new(current: CurrentWeather, forecast: Forecast) -> Self {
        Self {
            current,
            forecast,
            fetched_at: Utc::now(),
        }
    }
}

/// Visual category of a condition, used for backgrounds and glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTheme {
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
    Stormy,
    Drizzle,
    #[default]
    Default,
}

impl ConditionTheme {
    /// Classify an OpenWeatherMap `main` group ("Clear", "Rain", ...).
    ///
    /// Substring checks run in a fixed order, so "Rain" wins over later groups.
    pub fn from_main(main: &str) -> Self {
        let main = main.to_lowercase();
        if main.contains("clear") {
            Self::Sunny
        } else if main.contains("rain") {
            Self::Rainy
        } else if main.contains("cloud") {
            Self::Cloudy
        } else if main.contains("snow") {
            Self::Snowy
        } else if main.contains("thunderstorm") {
            Self::Stormy
        } else if main.contains("drizzle") {
            Self::Drizzle
        } else {
            Self::Default
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Sunny => "☀",
            Self::Rainy => "🌧",
            Self::Cloudy => "☁",
            Self::Snowy => "❄",
            Self::Stormy => "⛈",
            Self::Drizzle => "🌦",
            Self::Default => "🌡",
        }
    }
}

/// URL of the 2x PNG for an OpenWeatherMap icon code
pub fn icon_url(code: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, code)
}
