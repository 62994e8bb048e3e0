//! a single, ready-to-send attempt derived from a [`RequestTemplate`]
//!
//! [`RequestTemplate`]: crate::requests::RequestTemplate
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// request identifier; the index of the candidate within the enumerated range
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(usize);

impl RequestId {
    /// create a new `RequestId`
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<usize> for RequestId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "RequestId<{}>", self.0)
    }
}

/// everything a transport needs to send one candidate
///
/// always sent as a form `POST`, with redirects left unfollowed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    candidate: String,
    url: String,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    body: String,
    timeout: Duration,
}

impl Request {
    /// create a new `Request`; normally done through [`RequestTemplate::build_request`]
    ///
    /// [`RequestTemplate::build_request`]: crate::requests::RequestTemplate::build_request
    #[must_use]
    pub const fn new(
        id: RequestId,
        candidate: String,
        url: String,
        headers: BTreeMap<String, String>,
        cookies: BTreeMap<String, String>,
        body: String,
        timeout: Duration,
    ) -> Self {
        Self {
            id,
            candidate,
            url,
            headers,
            cookies,
            body,
            timeout,
        }
    }

    /// get the request's id
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// the candidate code carried by this request's body
    #[must_use]
    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    /// target url
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// headers to forward
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// cookies to forward
    #[must_use]
    pub const fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// the mutated body
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// cookies joined into a single `Cookie` header value, or `None` when there
    /// are no cookies to send
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let joined = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");

        Some(joined)
    }
}
