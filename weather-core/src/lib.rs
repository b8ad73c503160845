//! Core library for the weather app.
//!
//! This crate defines:
//! - The orchestrator: active page, service handoff, import/export, language switch
//! - The temperature and configuration pages
//! - Settings persistence and API key resolution
//! - The OpenWeather client and shared domain models
//!
//! It is used by `weather-cli`, but any front-end that can prompt for paths
//! and show message boxes can drive it.

pub mod config;
pub mod error;
pub mod files;
pub mod language;
pub mod model;
pub mod orchestrator;
pub mod page;
pub mod provider;

#[cfg(test)]
mod testing;

pub use config::{Config, LaunchProfile, SettingsStore, TomlSettings};
pub use error::AppError;
pub use files::{FileDialogOptions, FileFilter, FileGateway};
pub use language::{LanguageChange, Messages, ProcessHost, RestartChoice, SystemHost, UserDialogs};
pub use model::{TemperatureReading, WeatherRequest, WeatherResponse};
pub use orchestrator::{Collaborators, ImportOutcome, Orchestrator};
pub use page::{ConfigurationPage, PageId, TemperaturePage};
pub use provider::{ServiceHandle, WeatherProvider};
