//! Daily aggregation of the 3-hourly forecast feed.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{Condition, ForecastEntry};
use crate::units::round_one_decimal;

/// Days shown when nothing else is configured
pub const DEFAULT_FORECAST_DAYS: usize = 5;

/// How a forecast day is named relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "weekday", rename_all = "snake_case")]
pub enum DayLabel {
    Today,
    Tomorrow,
    Weekday(Weekday),
}

impl DayLabel {
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            Self::Today
        } else if today.succ_opt() == Some(date) {
            Self::Tomorrow
        } else {
            Self::Weekday(date.weekday())
        }
    }
}

impl std::fmt::Display for DayLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Today => f.write_str("Today"),
            Self::Tomorrow => f.write_str("Tomorrow"),
            Self::Weekday(day) => f.write_str(weekday_name(*day)),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One calendar day of forecast, temperatures in Celsius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub label: DayLabel,
    pub high: f64,
    pub low: f64,
    pub feels_like: f64,
    /// Mean relative humidity, rounded
    pub humidity: u8,
    /// Mean wind speed in m/s, one decimal
    pub wind_speed: f64,
    /// Weather of the day's first sample
    pub condition: Option<Condition>,
    pub samples: usize,
}

impl DailyForecast {
    /// Short date such as "Oct 16"
    pub fn short_date(&self) -> String {
        self.date.format("%b %-d").to_string()
    }
}

#[derive(Default)]
struct DayBucket {
    temps: Vec<f64>,
    feels_like: Vec<f64>,
    humidity: Vec<f64>,
    wind: Vec<f64>,
    condition: Option<Condition>,
}

impl DayBucket {
    fn push(&mut self, entry: &ForecastEntry) {
        if self.temps.is_empty() {
            self.condition = entry.weather.first().cloned();
        }
        self.temps.push(entry.main.temp);
        self.feels_like.push(entry.main.feels_like);
        self.humidity.push(f64::from(entry.main.humidity));
        self.wind.push(entry.wind.speed);
    }

    fn summarize(self, date: NaiveDate, today: NaiveDate) -> DailyForecast {
        let high = self.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let low = self.temps.iter().copied().fold(f64::INFINITY, f64::min);
        DailyForecast {
            date,
            label: DayLabel::for_date(date, today),
            high,
            low,
            feels_like: mean(&self.feels_like),
            humidity: mean(&self.humidity).round().clamp(0.0, 100.0) as u8,
            wind_speed: round_one_decimal(mean(&self.wind)),
            condition: self.condition,
            samples: self.temps.len(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Group forecast samples into calendar days of `tz`.
///
/// Days before today (as seen from `now` in `tz`) are dropped, the rest are
/// sorted ascending and truncated to `days`. Each day keeps the first
/// sample's weather in feed order.
pub fn aggregate_daily<Tz: TimeZone>(
    entries: &[ForecastEntry],
    tz: &Tz,
    now: DateTime<Utc>,
    days: usize,
) -> Vec<DailyForecast> {
    let today = now.with_timezone(tz).date_naive();
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for entry in entries {
        let Some(time) = entry.time() else {
            tracing::debug!("Skipping forecast sample with invalid timestamp {}", entry.dt);
            continue;
        };
        let date = time.with_timezone(tz).date_naive();
        if date < today {
            continue;
        }
        buckets.entry(date).or_default().push(entry);
    }

    buckets
        .into_iter()
        .take(days)
        .map(|(date, bucket)| bucket.summarize(date, today))
        .collect()
}
