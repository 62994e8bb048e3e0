//! the slice of a server's response that matters to a search: status code and headers
use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::requests::RequestId;

/// a server's response; the body is never retained
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    id: RequestId,
    status_code: u16,
    // keys are lowercased header names
    headers: HashMap<String, Vec<u8>>,
    elapsed: Duration,
}

impl Response {
    /// create a new `Response`
    ///
    /// header names are lowercased, so lookups are case-insensitive
    #[must_use]
    pub fn new(
        id: RequestId,
        status_code: u16,
        headers: HashMap<String, Vec<u8>>,
        elapsed: Duration,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        Self {
            id,
            status_code,
            headers,
            elapsed,
        }
    }

    /// Create a `Response` from a [`RequestId`], [`reqwest::Response`], and [`Duration`]
    ///
    /// only the status code and headers are kept; the body is drained so that the
    /// underlying connection can go back to the client's pool
    #[instrument(skip(resp, elapsed), level = "trace")]
    pub async fn from_reqwest_response(
        id: RequestId,
        resp: reqwest::Response,
        elapsed: Duration,
    ) -> Self {
        let status_code = resp.status().as_u16();

        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();

        // a failure to drain the body has no bearing on the verdict
        if let Err(error) = resp.bytes().await {
            debug!(%id, status_code, %error, "could not drain the response body");
        }

        Self {
            id,
            status_code,
            headers,
            elapsed,
        }
    }

    /// get the id of the request that produced this response
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// get the status code
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// get a reference to the headers
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, Vec<u8>> {
        &self.headers
    }

    /// get a header's value by (case-insensitive) name, if it's valid utf-8
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|value| std::str::from_utf8(value).ok())
    }

    /// value of the `Location` header
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// time it took to receive the response
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
