use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::Result,
    model::GeocodingResult,
    service::WeatherService,
    view::{Completion, Remote, Retain, SharedError, Ticket, Tracker, View},
};

/// Queries shorter than this reset the search instead of hitting the API.
pub const MIN_QUERY_CHARS: usize = 3;

pub type SearchView = View<Vec<GeocodingResult>, SharedError>;

/// Location search driven by typed text.
#[derive(Debug)]
pub struct LocationSearch {
    service: Arc<dyn WeatherService>,
    count: u32,
    tracker: Mutex<Tracker<Vec<GeocodingResult>, SharedError>>,
}

impl LocationSearch {
    pub fn new(service: Arc<dyn WeatherService>, count: u32) -> Self {
        Self {
            service,
            count,
            tracker: Mutex::new(Tracker::new()),
        }
    }

    /// Run a search for `query`.
    ///
    /// Fewer than [`MIN_QUERY_CHARS`] characters resets to idle without a request.
    pub async fn search(&self, query: &str) -> Completion {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.clear();
            return Completion::Skipped;
        }

        let ticket = self.tracker.lock().begin();
        let result = self.service.search_location(query, self.count).await;
        self.settle(ticket, query, result.map(|r| r.into_results()))
    }

    /// Reset to idle. A search still in flight will be dropped when it returns.
    pub fn clear(&self) {
        self.tracker.lock().reset();
    }

    pub fn snapshot(&self) -> SearchView {
        self.tracker.lock().state().view()
    }

    pub fn state(&self) -> Remote<Vec<GeocodingResult>, SharedError> {
        self.tracker.lock().state().clone()
    }

    /// Current results; empty while idle or after a failure.
    pub fn results(&self) -> Vec<GeocodingResult> {
        self.tracker
            .lock()
            .state()
            .data()
            .cloned()
            .unwrap_or_default()
    }

    fn settle(
        &self,
        ticket: Ticket,
        query: &str,
        result: Result<Vec<GeocodingResult>>,
    ) -> Completion {
        let mut tracker = self.tracker.lock();
        let completion = match result {
            Ok(results) => {
                let found = results.len();
                let completion = tracker.succeed(ticket, results);
                if completion == Completion::Applied {
                    info!(query, found, "location search finished");
                }
                completion
            }
            Err(err) => tracker.fail(ticket, Arc::new(err), Retain::Clear),
        };

        if completion == Completion::Discarded {
            warn!(query, "dropping superseded search response");
        }
        completion
    }
}
