//! State machines behind the search and weather screens.
//!
//! Each trigger takes a [`Ticket`] from a [`Tracker`] before suspending on I/O.
//! When the response comes back it is applied only if no newer ticket was
//! issued in the meantime, so the state always reflects the last request the
//! user made no matter which response arrives first.

use std::{mem, sync::Arc};

use crate::error::Error;

pub mod search;
pub mod weather;

pub use search::LocationSearch;
pub use weather::WeatherFetcher;

/// Errors as stored in view state: shared, so snapshots are cheap to clone.
pub type SharedError = Arc<Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Remote<T, E> {
    Idle,
    Loading {
        previous: Option<T>,
    },
    Succeeded(T),
    Failed {
        error: E,
        previous: Option<T>,
    },
}

impl<T, E> Default for Remote<T, E> {
    fn default() -> Self {
        Remote::Idle
    }
}

impl<T, E> Remote<T, E> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading { .. })
    }

    /// Latest data on screen: the success payload or whatever it is still showing.
    pub fn data(&self) -> Option<&T> {
        match self {
            Remote::Idle => None,
            Remote::Succeeded(value) => Some(value),
            Remote::Loading { previous } | Remote::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Remote::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    fn into_data(self) -> Option<T> {
        match self {
            Remote::Idle => None,
            Remote::Succeeded(value) => Some(value),
            Remote::Loading { previous } | Remote::Failed { previous, .. } => previous,
        }
    }

    /// Enter `Loading`, clearing any error but keeping displayed data.
    pub fn start(self) -> Self {
        Remote::Loading {
            previous: self.into_data(),
        }
    }

    pub fn succeed(self, value: T) -> Self {
        Remote::Succeeded(value)
    }

    pub fn fail(self, error: E, retain: Retain) -> Self {
        let previous = match retain {
            Retain::Keep => self.into_data(),
            Retain::Clear => None,
        };
        Remote::Failed { error, previous }
    }

    pub fn view(&self) -> View<T, E>
    where
        T: Clone,
        E: Clone,
    {
        View {
            data: self.data().cloned(),
            loading: self.is_loading(),
            error: self.error().cloned(),
        }
    }
}

/// What happens to displayed data when a request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retain {
    Keep,
    Clear,
}

/// The `{data, loading, error}` triple handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct View<T, E> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<E>,
}

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// How a trigger ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response landed in state.
    Applied,
    /// A newer request or a reset superseded this one; its response was dropped.
    Discarded,
    /// No request was sent.
    Skipped,
}

/// A [`Remote`] plus the sequence counter that guards it.
#[derive(Debug, Clone)]
pub struct Tracker<T, E> {
    state: Remote<T, E>,
    issued: u64,
}

impl<T, E> Default for Tracker<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Tracker<T, E> {
    pub fn new() -> Self {
        Self {
            state: Remote::Idle,
            issued: 0,
        }
    }

    pub fn state(&self) -> &Remote<T, E> {
        &self.state
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state = mem::take(&mut self.state).start();
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    pub fn succeed(&mut self, ticket: Ticket, value: T) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Discarded;
        }
        self.state = mem::take(&mut self.state).succeed(value);
        Completion::Applied
    }

    pub fn fail(&mut self, ticket: Ticket, error: E, retain: Retain) -> Completion {
        if !self.is_current(ticket) {
            return Completion::Discarded;
        }
        self.state = mem::take(&mut self.state).fail(error, retain);
        Completion::Applied
    }

    /// Back to `Idle`; every outstanding ticket becomes stale.
    pub fn reset(&mut self) {
        self.issued += 1;
        self.state = Remote::Idle;
    }
}
