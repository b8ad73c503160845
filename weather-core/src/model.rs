use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub address: String,
    pub when: Option<DateTime<Utc>>,
}

impl WeatherRequest {
    pub fn current(address: impl Into<String>) -> Self {
        Self { address: address.into(), when: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub provider: String,
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

/// One temperature sample held by the temperature page and written to export files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub date_time: DateTime<Utc>,
    pub temperature_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TemperatureReading {
    pub fn new(date_time: DateTime<Utc>, temperature_c: f64) -> Self {
        Self { date_time, temperature_c, location: None }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl From<&WeatherResponse> for TemperatureReading {
    fn from(res: &WeatherResponse) -> Self {
        Self {
            date_time: res.observation_time,
            temperature_c: res.temperature_c,
            location: Some(res.location_name.clone()),
        }
    }
}

impl fmt::Display for TemperatureReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {:.1} °C", self.date_time.format("%Y-%m-%d %H:%M UTC"), self.temperature_c)?;
        if let Some(location) = &self.location {
            write!(f, "  {location}")?;
        }
        Ok(())
    }
}

/// Pretty-printed JSON array, newline-terminated, as written by export.
pub fn readings_to_json(readings: &[TemperatureReading]) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(readings)?;
    json.push('\n');
    Ok(json)
}

/// Parse a JSON array of readings. Whitespace and indentation are irrelevant.
pub fn readings_from_json(text: &str) -> serde_json::Result<Vec<TemperatureReading>> {
    serde_json::from_str(text)
}
