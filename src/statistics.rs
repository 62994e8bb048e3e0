//! [`Statistics`] is the data container for transport-level [`Response`] and error counts
//!
//! these numbers are diagnostic only; they're never part of a search's result
//!
//! [`Response`]: crate::responses::Response
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::time::Instant;

use crate::error::{RequestErrorKind, SweepError};
use crate::responses::Response;

/// search's tracked statistics
#[derive(Default, Debug, Clone)]
pub struct Statistics {
    /// tracker for total number of requests that received a response or errored out
    requests: usize,

    /// tracker for total number of transport errors encountered by the client
    ///
    /// these errors are not related to status codes. The errors tracked here
    /// reflect things like network connection errors, timeouts, etc...
    errors: usize,

    /// tracker for number of timeouts seen by the client
    timeouts: usize,

    /// tracker for number of errors related to connecting
    connection_errors: usize,

    /// tracker for number of requests that couldn't be built from the template
    builder_errors: usize,

    /// tracker for any other transport error
    request_errors: usize,

    /// tracker for overall number of any status code seen by the client
    statuses: HashMap<u16, usize>,

    /// tracker for when the search began
    start_time: Option<Instant>,
}

impl Statistics {
    /// create a new default instance of `Statistics`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// mark the beginning of a search; the first call wins
    pub fn start(&mut self) {
        self.start_time.get_or_insert_with(Instant::now);
    }

    /// get the number of requests sent
    #[must_use]
    pub const fn requests(&self) -> usize {
        self.requests
    }

    /// get the number of transport errors
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.errors
    }

    /// get the number of request timeouts
    #[must_use]
    pub const fn timeouts(&self) -> usize {
        self.timeouts
    }

    /// get the number of connection errors
    #[must_use]
    pub const fn connection_errors(&self) -> usize {
        self.connection_errors
    }

    /// get the number of requests that couldn't be built
    #[must_use]
    pub const fn builder_errors(&self) -> usize {
        self.builder_errors
    }

    /// get the number of other transport errors
    #[must_use]
    pub const fn request_errors(&self) -> usize {
        self.request_errors
    }

    /// get the mapping of status codes to the number of times each was seen
    #[must_use]
    pub const fn statuses(&self) -> &HashMap<u16, usize> {
        &self.statuses
    }

    /// number of seconds since [`Statistics::start`] was called
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.start_time
            .map_or(0.0, |start| start.elapsed().as_secs_f64())
    }

    /// average number of requests per second since the search began
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_reqs_per_sec(&self) -> f64 {
        let elapsed = self.elapsed();

        if elapsed > 0.0 {
            self.requests as f64 / elapsed
        } else {
            0.0
        }
    }

    /// update the statistics from a received [`Response`]
    pub fn update(&mut self, response: &Response) {
        self.requests += 1;

        *self.statuses.entry(response.status_code()).or_insert(0) += 1;
    }

    /// update the statistics from a transport error; other errors are ignored
    pub fn update_from_error(&mut self, error: &SweepError) {
        let Some(kind) = error.request_error_kind() else {
            return;
        };

        self.requests += 1;
        self.errors += 1;

        match kind {
            RequestErrorKind::Timeout => self.timeouts += 1,
            RequestErrorKind::Connect(_) => self.connection_errors += 1,
            RequestErrorKind::Builder => self.builder_errors += 1,
            _ => self.request_errors += 1,
        }
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut statuses: Vec<_> = self.statuses.iter().collect();
        statuses.sort_unstable();

        write!(
            f,
            "requests={} errors={} timeouts={} connection_errors={} builder_errors={} request_errors={} elapsed={:.2}s avg_reqs_per_sec={:.2} statuses={:?}",
            self.requests,
            self.errors,
            self.timeouts,
            self.connection_errors,
            self.builder_errors,
            self.request_errors,
            self.elapsed(),
            self.avg_reqs_per_sec(),
            statuses
        )
    }
}
