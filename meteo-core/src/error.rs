use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the HTTP client, the weather service and the view hooks.
///
/// Transport and status errors are passed through as they arrive; nothing in this
/// crate retries or rewrites them.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (DNS, connect, invalid URL, ...).
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A `hourly`/`daily` section whose parallel arrays disagree on length.
    #[error("{section} series `{field}` has {actual} entries, expected {expected}")]
    MisalignedSeries {
        section: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("City not found: {0}")]
    CityNotFound(String),
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::CityNotFound(_))
    }
}
