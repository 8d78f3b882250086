//! Persisted user preferences: unit choice, last searched city and recent searches.
//!
//! Stored as a small JSON document in the config directory. Every setter
//! writes through immediately.

use serde::{Deserialize, Serialize};
use skycast_core::{StorageError, TemperatureUnit};
use std::fs;
use std::path::{Path, PathBuf};

/// Most recent searches kept
pub const MAX_RECENT_CITIES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_unit: Option<TemperatureUnit>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_searched_city: Option<String>,

    #[serde(default)]
    pub recent_cities: Vec<String>,
}

#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields defaults. An unreadable or corrupt file is logged
    /// and replaced by defaults on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt preferences at {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
            Err(e) => {
                tracing::warn!("Failed to read preferences at {}: {}", path.display(), e);
                Preferences::default()
            }
        };

        Self { path, prefs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn temperature_unit(&self) -> Option<TemperatureUnit> {
        self.prefs.temperature_unit
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) -> Result<(), StorageError> {
        self.prefs.temperature_unit = Some(unit);
        self.save()
    }

    pub fn last_searched_city(&self) -> Option<&str> {
        self.prefs.last_searched_city.as_deref()
    }

    pub fn set_last_searched_city(&mut self, city: &str) -> Result<(), StorageError> {
        self.prefs.last_searched_city = Some(city.to_string());
        self.save()
    }

    pub fn clear_last_searched_city(&mut self) -> Result<(), StorageError> {
        if self.prefs.last_searched_city.take().is_some() {
            self.save()?;
        }
        Ok(())
    }

    pub fn recent_cities(&self) -> &[String] {
        &self.prefs.recent_cities
    }

    /// Move `city` to the front of the recent list.
    ///
    /// Matching is case-insensitive; the newest spelling wins. The list is
    /// capped at [`MAX_RECENT_CITIES`].
    pub fn add_recent_city(&mut self, city: &str) -> Result<&[String], StorageError> {
        let lowered = city.to_lowercase();
        self.prefs
            .recent_cities
            .retain(|c| c.to_lowercase() != lowered);
        self.prefs.recent_cities.insert(0, city.to_string());
        self.prefs.recent_cities.truncate(MAX_RECENT_CITIES);
        self.save()?;
        Ok(&self.prefs.recent_cities)
    }

    pub fn clear_recent_cities(&mut self) -> Result<(), StorageError> {
        self.prefs.recent_cities.clear();
        self.save()
    }

    /// Forget the last searched city and the recent list; the unit stays.
    pub fn clear_all_weather_data(&mut self) -> Result<(), StorageError> {
        self.prefs.last_searched_city = None;
        self.prefs.recent_cities.clear();
        self.save()
    }

    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.prefs)?;
        fs::write(&self.path, json).map_err(|source| StorageError::Write {
            path: self.path.display().to_string(),
            source,
        })?;

        tracing::debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}
