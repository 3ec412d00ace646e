use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    model::{Coordinates, WeatherResponse},
    service::WeatherService,
    view::{Completion, Remote, Retain, SharedError, Ticket, Tracker, View},
};

pub type WeatherView = View<WeatherResponse, SharedError>;

/// Weather for one place at a time.
///
/// A failed fetch keeps showing the last successful weather next to the error;
/// only a newer success replaces it.
#[derive(Debug)]
pub struct WeatherFetcher {
    service: Arc<dyn WeatherService>,
    forecast_days: u8,
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tracker: Tracker<WeatherResponse, SharedError>,
    /// Coordinates of the last fetch that landed; `refresh` re-issues them.
    last_coordinates: Option<Coordinates>,
}

impl WeatherFetcher {
    pub fn new(service: Arc<dyn WeatherService>, forecast_days: u8) -> Self {
        Self {
            service,
            forecast_days,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Start out pointed at `coordinates`: `refresh` fetches them until some
    /// other fetch lands. Nothing is requested until then.
    pub fn with_initial(
        service: Arc<dyn WeatherService>,
        forecast_days: u8,
        coordinates: Coordinates,
    ) -> Self {
        let fetcher = Self::new(service, forecast_days);
        fetcher.inner.lock().last_coordinates = Some(coordinates);
        fetcher
    }

    pub async fn fetch_weather(&self, coordinates: Coordinates) -> Completion {
        let ticket = self.begin();
        let result = self
            .service
            .complete_weather(coordinates, self.forecast_days)
            .await;
        self.settle(ticket, result, Some(coordinates))
    }

    /// Resolve `city` through the geocoder first. No match ends in a failed
    /// state carrying [`Error::CityNotFound`].
    pub async fn fetch_weather_by_city(&self, city: &str) -> Completion {
        let ticket = self.begin();
        let result = match self.service.weather_by_city(city, self.forecast_days).await {
            Ok(Some(weather)) => Ok(weather),
            Ok(None) => Err(Error::CityNotFound(city.to_string())),
            Err(err) => Err(err),
        };
        self.settle(ticket, result, None)
    }

    /// Fetch again at the last successful (or initial) coordinates; skipped if
    /// there are none.
    pub async fn refresh(&self) -> Completion {
        let Some(coordinates) = self.last_coordinates() else {
            return Completion::Skipped;
        };
        self.fetch_weather(coordinates).await
    }

    pub fn last_coordinates(&self) -> Option<Coordinates> {
        self.inner.lock().last_coordinates
    }

    pub fn snapshot(&self) -> WeatherView {
        self.inner.lock().tracker.state().view()
    }

    pub fn state(&self) -> Remote<WeatherResponse, SharedError> {
        self.inner.lock().tracker.state().clone()
    }

    fn begin(&self) -> Ticket {
        self.inner.lock().tracker.begin()
    }

    /// `requested` wins over the coordinates echoed back by the API, which
    /// snaps them to its grid.
    fn settle(
        &self,
        ticket: Ticket,
        result: Result<WeatherResponse>,
        requested: Option<Coordinates>,
    ) -> Completion {
        let mut inner = self.inner.lock();
        let completion = match result {
            Ok(weather) => {
                let coordinates = requested.unwrap_or_else(|| weather.coordinates());
                let completion = inner.tracker.succeed(ticket, weather);
                if completion == Completion::Applied {
                    inner.last_coordinates = Some(coordinates);
                    info!(%coordinates, "weather updated");
                }
                completion
            }
            Err(err) => {
                let message = err.to_string();
                let completion = inner.tracker.fail(ticket, Arc::new(err), Retain::Keep);
                if completion == Completion::Applied {
                    warn!(error = %message, "weather fetch failed");
                }
                completion
            }
        };

        if completion == Completion::Discarded {
            warn!("dropping superseded weather response");
        }
        completion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentWeather, GeocodingResponse, GeocodingResult};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    type Reply = Result<WeatherResponse>;

    /// Geocodes from a fixed list; forecast replies are released through
    /// gates consumed in call order.
    #[derive(Debug, Default)]
    struct GatedWeather {
        places: Vec<GeocodingResult>,
        gates: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
        requested: Mutex<Vec<Coordinates>>,
    }

    impl GatedWeather {
        fn with_places(places: Vec<GeocodingResult>) -> Self {
            Self {
                places,
                ..Self::default()
            }
        }

        fn gate(&self) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().push_back(rx);
            tx
        }

        fn reply(&self, reply: Reply) {
            self.gate().send(reply).unwrap();
        }

        fn requested(&self) -> Vec<Coordinates> {
            self.requested.lock().clone()
        }
    }

    #[async_trait]
    impl WeatherService for GatedWeather {
        async fn current_weather(&self, _: Coordinates) -> Result<WeatherResponse> {
            unreachable!("hooks always fetch complete weather")
        }

        async fn hourly_forecast(&self, _: Coordinates, _: u8) -> Result<WeatherResponse> {
            unreachable!("hooks always fetch complete weather")
        }

        async fn daily_forecast(&self, _: Coordinates, _: u8) -> Result<WeatherResponse> {
            unreachable!("hooks always fetch complete weather")
        }

        async fn complete_weather(
            &self,
            coordinates: Coordinates,
            _days: u8,
        ) -> Result<WeatherResponse> {
            self.requested.lock().push(coordinates);
            let rx = self.gates.lock().pop_front().expect("no gate queued");
            rx.await.expect("gate dropped")
        }

        async fn search_location(&self, query: &str, count: u32) -> Result<GeocodingResponse> {
            let results: Vec<_> = self
                .places
                .iter()
                .filter(|p| p.name.eq_ignore_ascii_case(query))
                .take(count as usize)
                .cloned()
                .collect();
            Ok(GeocodingResponse {
                results: (!results.is_empty()).then_some(results),
            })
        }
    }

    fn paris() -> GeocodingResult {
        GeocodingResult {
            id: 2988507,
            name: "Paris".into(),
            latitude: 48.8566,
            longitude: 2.3522,
            country: "France".into(),
            admin1: Some("Île-de-France".into()),
            admin2: None,
        }
    }

    fn weather_at(latitude: f64, longitude: f64, temperature: f64) -> WeatherResponse {
        WeatherResponse {
            latitude,
            longitude,
            timezone: "Europe/Paris".into(),
            timezone_abbreviation: None,
            utc_offset_seconds: None,
            elevation: None,
            current: Some(CurrentWeather {
                time: "2024-01-15T12:00".into(),
                temperature_2m: temperature,
                weather_code: 0,
                wind_speed_10m: 10.0,
                wind_direction_10m: 180.0,
                is_day: 1,
            }),
            hourly: None,
            daily: None,
        }
    }

    fn unavailable() -> Error {
        Error::Status {
            url: "https://forecast.test/forecast".into(),
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    fn temperature(view: &WeatherView) -> Option<f64> {
        view.data
            .as_ref()
            .and_then(|w| w.current.as_ref())
            .map(|c| c.temperature_2m)
    }

    #[tokio::test]
    async fn unknown_city_fails_with_not_found() {
        let service = Arc::new(GatedWeather::with_places(vec![paris()]));
        let fetcher = WeatherFetcher::new(service.clone(), 7);

        assert_eq!(fetcher.fetch_weather_by_city("Atlantis").await, Completion::Applied);

        let view = fetcher.snapshot();
        assert!(!view.loading);
        assert!(view.data.is_none());
        let err = view.error.expect("error stored");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "City not found: Atlantis");
        assert!(service.requested().is_empty());
    }

    #[tokio::test]
    async fn city_lookup_fetches_at_first_match() {
        let service = Arc::new(GatedWeather::with_places(vec![paris()]));
        let fetcher = WeatherFetcher::new(service.clone(), 7);

        service.reply(Ok(weather_at(48.86, 2.35, 11.0)));
        assert_eq!(fetcher.fetch_weather_by_city("paris").await, Completion::Applied);

        assert_eq!(service.requested(), [Coordinates::new(48.8566, 2.3522)]);
        assert_eq!(temperature(&fetcher.snapshot()), Some(11.0));
        // By-city fetches remember where the API placed the forecast.
        assert_eq!(fetcher.last_coordinates(), Some(Coordinates::new(48.86, 2.35)));
    }

    #[tokio::test]
    async fn refresh_reissues_last_successful_coordinates() {
        let service = Arc::new(GatedWeather::default());
        let fetcher = WeatherFetcher::new(service.clone(), 7);

        assert_eq!(fetcher.refresh().await, Completion::Skipped);
        assert!(service.requested().is_empty());

        let berlin = Coordinates::new(52.52, 13.41);
        service.reply(Ok(weather_at(52.52, 13.42, 3.0)));
        fetcher.fetch_weather(berlin).await;

        // A failed fetch elsewhere does not move the refresh target.
        service.reply(Err(unavailable()));
        fetcher.fetch_weather(Coordinates::new(0.0, 0.0)).await;

        service.reply(Ok(weather_at(52.52, 13.42, 4.0)));
        assert_eq!(fetcher.refresh().await, Completion::Applied);

        let requested = service.requested();
        assert_eq!(requested.last(), Some(&berlin));
        assert_eq!(temperature(&fetcher.snapshot()), Some(4.0));
    }

    #[tokio::test]
    async fn initial_coordinates_are_refreshable() {
        let service = Arc::new(GatedWeather::default());
        let oslo = Coordinates::new(59.91, 10.75);
        let fetcher = WeatherFetcher::with_initial(service.clone(), 7, oslo);

        assert!(matches!(fetcher.state(), Remote::Idle));
        assert!(service.requested().is_empty());
        assert_eq!(fetcher.last_coordinates(), Some(oslo));

        service.reply(Ok(weather_at(59.9, 10.76, -2.0)));
        assert_eq!(fetcher.refresh().await, Completion::Applied);

        assert_eq!(service.requested(), [oslo]);
        assert_eq!(temperature(&fetcher.snapshot()), Some(-2.0));
    }

    #[tokio::test]
    async fn failure_keeps_previous_weather() {
        let service = Arc::new(GatedWeather::default());
        let fetcher = WeatherFetcher::new(service.clone(), 7);
        let here = Coordinates::new(48.8566, 2.3522);

        service.reply(Ok(weather_at(48.86, 2.35, 9.0)));
        fetcher.fetch_weather(here).await;

        service.reply(Err(unavailable()));
        fetcher.fetch_weather(here).await;

        let view = fetcher.snapshot();
        assert!(!view.loading);
        assert_eq!(temperature(&view), Some(9.0));
        assert_eq!(view.error.unwrap().status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn loading_is_visible_while_in_flight() {
        let service = Arc::new(GatedWeather::default());
        let fetcher = WeatherFetcher::new(service.clone(), 7);
        let gate = service.gate();

        let release = async {
            let view = fetcher.snapshot();
            assert!(view.loading);
            assert!(view.error.is_none());
            gate.send(Ok(weather_at(1.0, 2.0, 20.0))).unwrap();
        };

        let (completion, ()) =
            tokio::join!(fetcher.fetch_weather(Coordinates::new(1.0, 2.0)), release);

        assert_eq!(completion, Completion::Applied);
        assert!(!fetcher.snapshot().loading);
    }

    #[tokio::test]
    async fn superseded_fetch_is_dropped() {
        let service = Arc::new(GatedWeather::default());
        let fetcher = WeatherFetcher::new(service.clone(), 7);
        let slow = service.gate();
        let fast = service.gate();

        let release = async {
            while service.requested().len() < 2 {
                tokio::task::yield_now().await;
            }
            fast.send(Ok(weather_at(2.0, 2.0, 22.0))).unwrap();
            tokio::task::yield_now().await;
            slow.send(Ok(weather_at(1.0, 1.0, 11.0))).unwrap();
        };

        let (first, second, ()) = tokio::join!(
            fetcher.fetch_weather(Coordinates::new(1.0, 1.0)),
            fetcher.fetch_weather(Coordinates::new(2.0, 2.0)),
            release,
        );

        assert_eq!(first, Completion::Discarded);
        assert_eq!(second, Completion::Applied);
        assert_eq!(temperature(&fetcher.snapshot()), Some(22.0));
        assert_eq!(fetcher.last_coordinates(), Some(Coordinates::new(2.0, 2.0)));
    }
}
