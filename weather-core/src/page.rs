use anyhow::{Result, anyhow};
use std::{convert::TryFrom, fmt};
use tracing::info;

use crate::{
    error::AppError,
    model::{TemperatureReading, WeatherRequest},
    provider::ServiceHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Temperature,
    Configuration,
}

impl PageId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageId::Temperature => "temperature",
            PageId::Configuration => "configuration",
        }
    }

    /// Registration order; the first entry is the startup page.
    pub const fn all() -> &'static [PageId] {
        &[PageId::Temperature, PageId::Configuration]
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PageId {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        PageId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == lower)
            .ok_or_else(|| AppError::UnknownPage(value.to_string()))
    }
}

/// Fetches temperatures for a city and keeps the readings in fetch order.
#[derive(Debug, Default)]
pub struct TemperaturePage {
    city: String,
    raw_text: String,
    readings: Option<Vec<TemperatureReading>>,
    service: Option<ServiceHandle>,
}

impl TemperaturePage {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), ..Self::default() }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn set_raw_text(&mut self, text: impl Into<String>) {
        self.raw_text = text.into();
    }

    /// `None` until the first fetch or import.
    pub fn readings(&self) -> Option<&[TemperatureReading]> {
        self.readings.as_deref()
    }

    pub fn replace_readings(&mut self, readings: Vec<TemperatureReading>) {
        self.readings = Some(readings);
    }

    pub fn service(&self) -> Option<&ServiceHandle> {
        self.service.as_ref()
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn set_service(&mut self, service: ServiceHandle) {
        self.service = Some(service);
    }

    /// Fetch the current temperature and append it to the readings.
    ///
    /// Without a service the page keeps its placeholder text and returns `None`.
    pub async fn fetch(&mut self) -> Result<Option<&TemperatureReading>> {
        let Some(service) = self.service.clone() else {
            return Ok(None);
        };

        let city = self.city.trim();
        if city.is_empty() {
            return Err(anyhow!("No city set. Enter a city before fetching."));
        }

        let response = service.get_weather(&WeatherRequest::current(city)).await?;
        let reading = TemperatureReading::from(&response);
        info!(city = %self.city, temperature_c = reading.temperature_c, "temperature fetched");

        self.raw_text = reading.to_string();
        let readings = self.readings.get_or_insert_with(Vec::new);
        readings.push(reading);

        Ok(readings.last())
    }
}

/// Holds the API key the user is editing until it is saved to settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationPage {
    api_key: String,
}

impl ConfigurationPage {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into() }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into().trim().to_string();
    }
}
