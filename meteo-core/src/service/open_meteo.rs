use async_trait::async_trait;
use tracing::instrument;

use crate::{
    error::Result,
    http::HttpClient,
    model::{Coordinates, GeocodingResponse, WeatherResponse},
    service::{ForecastQuery, WeatherService, search_params},
};

/// [`WeatherService`] backed by the Open-Meteo forecast and geocoding APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoService {
    http: HttpClient,
    search_url: String,
}

impl OpenMeteoService {
    /// `api_base` hosts `/forecast`; the search endpoint lives under `geocoding_base`.
    pub fn new(api_base: &str, geocoding_base: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(api_base)?,
            search_url: format!("{}/search", geocoding_base.trim_end_matches('/')),
        })
    }

    async fn forecast(&self, query: ForecastQuery) -> Result<WeatherResponse> {
        let response: WeatherResponse = self.http.get_json("/forecast", &query.params()).await?;
        response.check_aligned()?;
        Ok(response)
    }
}

#[async_trait]
impl WeatherService for OpenMeteoService {
    #[instrument(skip(self), fields(coordinates = %coordinates))]
    async fn current_weather(&self, coordinates: Coordinates) -> Result<WeatherResponse> {
        self.forecast(ForecastQuery::current(coordinates)).await
    }

    #[instrument(skip(self), fields(coordinates = %coordinates))]
    async fn hourly_forecast(&self, coordinates: Coordinates, days: u8) -> Result<WeatherResponse> {
        self.forecast(ForecastQuery::hourly(coordinates, days)).await
    }

    #[instrument(skip(self), fields(coordinates = %coordinates))]
    async fn daily_forecast(&self, coordinates: Coordinates, days: u8) -> Result<WeatherResponse> {
        self.forecast(ForecastQuery::daily(coordinates, days)).await
    }

    #[instrument(skip(self), fields(coordinates = %coordinates))]
    async fn complete_weather(
        &self,
        coordinates: Coordinates,
        days: u8,
    ) -> Result<WeatherResponse> {
        self.forecast(ForecastQuery::complete(coordinates, days)).await
    }

    #[instrument(skip(self))]
    async fn search_location(&self, query: &str, count: u32) -> Result<GeocodingResponse> {
        self.http
            .get_json(&self.search_url, &search_params(query, count))
            .await
    }
}
