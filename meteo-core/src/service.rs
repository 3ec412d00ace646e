use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

use crate::{
    Config,
    error::Result,
    model::{Coordinates, GeocodingResponse, WeatherResponse},
    service::open_meteo::OpenMeteoService,
};

pub mod open_meteo;

pub const DEFAULT_FORECAST_DAYS: u8 = 7;
pub const MAX_FORECAST_DAYS: u8 = 16;
pub const DEFAULT_SEARCH_COUNT: u32 = 10;
pub const DEFAULT_GEOCODING_BASE: &str = "https://geocoding-api.open-meteo.com/v1";

pub const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "weather_code",
    "wind_speed_10m",
    "wind_direction_10m",
    "is_day",
];

pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "precipitation",
    "weather_code",
    "wind_speed_10m",
];

pub const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
    "precipitation_sum",
    "wind_speed_10m_max",
];

/// Parameters of one `GET /forecast` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastQuery {
    pub coordinates: Coordinates,
    pub current: bool,
    pub hourly: bool,
    pub daily: bool,
    /// Only sent with hourly/daily sections.
    pub forecast_days: Option<u8>,
}

impl ForecastQuery {
    pub fn current(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            current: true,
            hourly: false,
            daily: false,
            forecast_days: None,
        }
    }

    pub fn hourly(coordinates: Coordinates, days: u8) -> Self {
        Self {
            coordinates,
            current: false,
            hourly: true,
            daily: false,
            forecast_days: Some(days),
        }
    }

    pub fn daily(coordinates: Coordinates, days: u8) -> Self {
        Self {
            coordinates,
            current: false,
            hourly: false,
            daily: true,
            forecast_days: Some(days),
        }
    }

    pub fn complete(coordinates: Coordinates, days: u8) -> Self {
        Self {
            coordinates,
            current: true,
            hourly: true,
            daily: true,
            forecast_days: Some(days),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", self.coordinates.latitude.to_string()),
            ("longitude", self.coordinates.longitude.to_string()),
        ];

        if self.current {
            params.push(("current", CURRENT_FIELDS.join(",")));
        }
        if self.hourly {
            params.push(("hourly", HOURLY_FIELDS.join(",")));
        }
        if self.daily {
            params.push(("daily", DAILY_FIELDS.join(",")));
        }
        if let Some(days) = self.forecast_days {
            params.push(("forecast_days", days.clamp(1, MAX_FORECAST_DAYS).to_string()));
        }

        params.push(("timezone", "auto".to_string()));
        params
    }
}

/// Query parameters of a geocoding search.
pub fn search_params(query: &str, count: u32) -> Vec<(&'static str, String)> {
    vec![
        ("name", query.to_string()),
        ("count", count.to_string()),
        ("language", "en".to_string()),
        ("format", "json".to_string()),
    ]
}

#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherResponse>;

    async fn hourly_forecast(&self, coordinates: Coordinates, days: u8) -> Result<WeatherResponse>;

    async fn daily_forecast(&self, coordinates: Coordinates, days: u8) -> Result<WeatherResponse>;

    /// Current conditions plus hourly and daily series in a single request.
    async fn complete_weather(&self, coordinates: Coordinates, days: u8) -> Result<WeatherResponse>;

    async fn search_location(&self, query: &str, count: u32) -> Result<GeocodingResponse>;

    /// Resolve `city` to its best geocoding match and fetch complete weather there.
    ///
    /// `Ok(None)` when the name matches nothing; every other failure is returned
    /// unchanged.
    async fn weather_by_city(&self, city: &str, days: u8) -> Result<Option<WeatherResponse>> {
        let found = self.search_location(city, 1).await?;

        let Some(place) = found.first() else {
            debug!(city, "no geocoding match");
            return Ok(None);
        };

        debug!(city, matched = %place.name, coordinates = %place.coordinates(), "resolved city");
        self.complete_weather(place.coordinates(), days).await.map(Some)
    }
}

/// Build the Open-Meteo service described by `config`.
pub fn service_from_config(config: &Config) -> Result<Arc<dyn WeatherService>> {
    let service = OpenMeteoService::new(config.api_base(), config.geocoding_base())?;
    Ok(Arc::new(service))
}
