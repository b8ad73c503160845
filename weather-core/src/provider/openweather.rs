use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use crate::{
    model::{WeatherRequest, WeatherResponse},
    provider::{DateRequest, classify_date},
};

use super::WeatherProvider;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const FORECAST_DAYS: i64 = 5;
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Endpoint::Current => "current weather",
            Endpoint::Forecast => "5-day forecast",
        }
    }
}

/// OpenWeather client whose key can be swapped while pages share it.
#[derive(Debug)]
pub struct OpenWeatherService {
    api_key: RwLock<String>,
    http: Client,
}

impl OpenWeatherService {
    pub fn new(api_key: String) -> Self {
        Self { api_key: RwLock::new(api_key), http: Client::new() }
    }

    /// GET `endpoint` for `address` in metric units and decode the body as `T`.
    async fn call<T: DeserializeOwned>(&self, endpoint: Endpoint, address: &str) -> Result<T> {
        let api_key = self.api_key();
        let url = format!("{BASE_URL}/{}", endpoint.path());
        debug!(endpoint = endpoint.label(), address, "calling OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[("q", address), ("appid", api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .with_context(|| format!("OpenWeather {} request could not be sent", endpoint.label()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("OpenWeather {} response body unreadable", endpoint.label()))?;

        if !status.is_success() {
            bail!("OpenWeather {} answered {status}: {}", endpoint.label(), excerpt(&body));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("OpenWeather {} response is not the expected JSON", endpoint.label()))
    }
}

/// Fields shared by the current-weather payload and each forecast slot.
#[derive(Debug, Deserialize)]
struct Sample {
    dt: i64,
    main: Readings,
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentPayload {
    name: String,
    #[serde(flatten)]
    sample: Sample,
}

#[derive(Debug, Deserialize)]
struct City {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct ForecastPayload {
    city: City,
    list: Vec<Sample>,
}

impl Sample {
    fn into_response(self, location_name: String) -> WeatherResponse {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map_or_else(|| "Unknown".to_string(), |c| c.description);

        WeatherResponse {
            provider: "openweather".to_string(),
            location_name,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            condition,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            observation_time: DateTime::from_timestamp(self.dt, 0).unwrap_or_else(Utc::now),
        }
    }
}

impl ForecastPayload {
    /// The slot closest to `when`, labelled "City, CC".
    fn closest_to(self, when: DateTime<Utc>) -> Option<WeatherResponse> {
        let target = when.timestamp();
        let location = format!("{}, {}", self.city.name, self.city.country);

        self.list
            .into_iter()
            .min_by_key(|s| (s.dt - target).abs())
            .map(|s| s.into_response(location))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherService {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherResponse> {
        let now = Utc::now();

        match classify_date(now, request.when) {
            DateRequest::Current => {
                let payload: CurrentPayload = self.call(Endpoint::Current, &request.address).await?;
                Ok(payload.sample.into_response(payload.name))
            }
            DateRequest::Past(when) => Err(anyhow!(
                "The free OpenWeather plan has no history; {when} is in the past. \
                 Ask for now or up to {FORECAST_DAYS} days ahead."
            )),
            DateRequest::Future(when) => {
                let horizon = now + Duration::days(FORECAST_DAYS);
                if when > horizon {
                    bail!("{when} is beyond the OpenWeather forecast horizon ({horizon}).");
                }

                let payload: ForecastPayload = self.call(Endpoint::Forecast, &request.address).await?;
                payload
                    .closest_to(when)
                    .ok_or_else(|| anyhow!("OpenWeather forecast for {} has no slots", request.address))
            }
        }
    }

    fn api_key(&self) -> String {
        self.api_key.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_api_key(&self, api_key: &str) {
        debug!("OpenWeather API key replaced");
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) = api_key.to_string();
    }
}

/// First `MAX_ERROR_BODY` characters of an error body.
fn excerpt(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
