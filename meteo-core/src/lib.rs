//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - A JSON HTTP client bound to the forecast API base URL
//! - The Open-Meteo weather service (forecast and geocoding queries)
//! - Serde models for forecast and geocoding payloads, plus the WMO code table
//! - View-state machines for location search and weather display
//! - Configuration handling
//!
//! It is used by `meteo-cli`, but any other front end can drive the same
//! [`view`] types.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod service;
pub mod view;
pub mod weather_code;

pub use app::AppContext;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    Coordinates, CurrentWeather, DailyWeather, GeocodingResponse, GeocodingResult, HourlyWeather,
    WeatherResponse,
};
pub use service::{WeatherService, open_meteo::OpenMeteoService};
pub use view::{Completion, LocationSearch, Remote, View, WeatherFetcher};
