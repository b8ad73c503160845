use crate::{WeatherRequest, WeatherResponse, provider::openweather::OpenWeatherService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Requests within this window of "now" are served as current weather.
const CURRENT_TOLERANCE_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRequest {
    Current,
    Past(DateTime<Utc>),
    Future(DateTime<Utc>),
}

pub fn classify_date(now: DateTime<Utc>, when: Option<DateTime<Utc>>) -> DateRequest {
    let Some(when) = when else {
        return DateRequest::Current;
    };

    let tolerance = Duration::minutes(CURRENT_TOLERANCE_MINUTES);
    if when < now - tolerance {
        DateRequest::Past(when)
    } else if when > now + tolerance {
        DateRequest::Future(when)
    } else {
        DateRequest::Current
    }
}

/// Client to the external weather provider.
///
/// The key lives behind the handle so it can be swapped without replacing
/// the client that pages already hold.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, request: &WeatherRequest) -> anyhow::Result<WeatherResponse>;

    fn api_key(&self) -> String;

    fn set_api_key(&self, api_key: &str);
}

/// Shared weather client; the orchestrator and the temperature page hold clones.
pub type ServiceHandle = Arc<dyn WeatherProvider>;

/// Builds a handle from an API key.
pub type ServiceFactory = Box<dyn Fn(&str) -> ServiceHandle>;

pub fn openweather_factory() -> ServiceFactory {
    Box::new(|api_key| Arc::new(OpenWeatherService::new(api_key.to_owned())))
}
