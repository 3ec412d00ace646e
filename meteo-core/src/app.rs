use std::sync::Arc;

use crate::{
    Config,
    error::Result,
    service::{WeatherService, service_from_config},
    view::{LocationSearch, WeatherFetcher},
};

/// Everything a front end needs, built once at start-up and passed down
/// explicitly.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    service: Arc<dyn WeatherService>,
}

impl AppContext {
    pub fn from_config(config: Config) -> Result<Self> {
        let service = service_from_config(&config)?;
        Ok(Self { config, service })
    }

    /// Use a caller-supplied service, e.g. a fake in tests.
    pub fn with_service(config: Config, service: Arc<dyn WeatherService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> Arc<dyn WeatherService> {
        Arc::clone(&self.service)
    }

    pub fn location_search(&self) -> LocationSearch {
        LocationSearch::new(self.service(), self.config.search_count())
    }

    /// A weather view, pointed at the configured default location if any.
    pub fn weather(&self) -> WeatherFetcher {
        let days = self.config.forecast_days();
        match self.config.default_location {
            Some(coordinates) => WeatherFetcher::with_initial(self.service(), days, coordinates),
            None => WeatherFetcher::new(self.service(), days),
        }
    }
}
