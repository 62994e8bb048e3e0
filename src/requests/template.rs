//! Parsing of a captured, raw HTTP/1.x request into a replayable [`RequestTemplate`]
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, instrument};
use url::Url;

use super::{Request, RequestId};
use crate::error::SweepError;
use crate::mutators::{CodeFieldMutator, Mutator};

/// headers that are regenerated by the transport for every request and
/// therefore never forwarded from the captured request
const REGENERATED_HEADERS: [&str; 2] = ["host", "content-length"];

/// an immutable, parsed representation of a captured request
///
/// # Examples
///
/// ```
/// # use codesweep::requests::RequestTemplate;
/// # use codesweep::error::SweepError;
/// # fn main() -> Result<(), SweepError> {
/// let raw = "POST /verify_mfa.php HTTP/1.1\n\
///            Host: lab.local\n\
///            Content-Type: application/x-www-form-urlencoded\n\
///            Content-Length: 9\n\
///            Cookie: PHPSESSID=abc123\n\
///            \n\
///            code=0000";
///
/// let template = RequestTemplate::parse(raw)?;
///
/// assert_eq!(template.url(), "http://lab.local/verify_mfa.php");
/// assert_eq!(template.cookies().get("PHPSESSID").map(String::as_str), Some("abc123"));
/// assert_eq!(template.body(), "code=0000");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestTemplate {
    method: String,
    url: String,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    body: String,
}

impl RequestTemplate {
    /// parse a raw request of the shape
    ///
    /// ```text
    /// <METHOD> <PATH> <VERSION>
    /// Header-Name: value
    /// Cookie: a=1; b=2
    ///
    /// <body lines...>
    /// ```
    ///
    /// # Errors
    ///
    /// - [`SweepError::MalformedRequest`] when the request line isn't exactly three tokens
    /// - [`SweepError::MissingHost`] when no `Host:` header line (case-insensitive) exists
    /// - [`SweepError::MalformedCookie`] when a `Cookie` segment has no `=`
    /// - [`SweepError::InvalidUrl`] when the host and path don't form a valid url
    #[instrument(skip_all, level = "trace")]
    pub fn parse(raw: &str) -> Result<Self, SweepError> {
        let mut lines = raw.trim().lines();

        let request_line = lines.next().unwrap_or_default().trim();

        let (method, path) = match request_line.split_whitespace().collect::<Vec<_>>()[..] {
            [method, path, _version] => (method, path),
            _ => {
                return Err(SweepError::MalformedRequest {
                    reason: "the request line must be exactly `METHOD PATH VERSION`",
                    line: request_line.to_string(),
                })
            }
        };

        let mut host = None;
        let mut headers = BTreeMap::new();
        let mut cookies = BTreeMap::new();
        let mut body = String::new();
        let mut in_body = false;

        for line in lines.map(str::trim) {
            if line.is_empty() {
                in_body = true;
                continue;
            }

            if in_body {
                body.push_str(line);
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                debug!(%line, "ignoring header line without a colon");
                continue;
            };

            let (key, value) = (key.trim(), value.trim());
            let lowered = key.to_ascii_lowercase();

            if lowered == "host" {
                host.get_or_insert_with(|| value.to_string());
            }

            if REGENERATED_HEADERS.contains(&lowered.as_str()) {
                continue;
            }

            if lowered == "cookie" {
                parse_cookies(value, &mut cookies)?;
            } else {
                headers.insert(key.to_string(), value.to_string());
            }
        }

        let host = host
            .filter(|host| !host.is_empty())
            .ok_or(SweepError::MissingHost)?;

        let url = format!("http://{host}{path}");

        Url::parse(&url).map_err(|source| SweepError::InvalidUrl {
            source,
            url: url.clone(),
        })?;

        debug!(%method, %url, headers = headers.len(), cookies = cookies.len(), "parsed request template");

        Ok(Self {
            method: method.to_string(),
            url,
            headers,
            cookies,
            body,
        })
    }

    /// the method from the captured request line
    ///
    /// # Note
    ///
    /// informational only; every attempt is sent as a `POST`
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// target url, always `http://<host><path>`
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// forwarded headers; never contains `Host`, `Content-Length` or `Cookie`
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// cookies parsed from the captured `Cookie` header(s)
    #[must_use]
    pub const fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// the body that gets mutated for each candidate
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// whether or not the body carries a `<field>=<digits>` placeholder
    #[must_use]
    pub fn has_placeholder(&self, field: &str) -> bool {
        CodeFieldMutator::new(field).matches(&self.body)
    }

    /// build the [`Request`] that will be sent for `candidate`, with its body
    /// mutated by the given [`Mutator`]
    #[must_use]
    pub fn build_request<M>(
        &self,
        id: RequestId,
        candidate: &str,
        mutator: &M,
        timeout: Duration,
    ) -> Request
    where
        M: Mutator + ?Sized,
    {
        Request::new(
            id,
            candidate.to_string(),
            self.url.clone(),
            self.headers.clone(),
            self.cookies.clone(),
            mutator.mutate(&self.body, candidate),
            timeout,
        )
    }
}

/// split a `Cookie` header value on `;` and each segment on its first `=`
fn parse_cookies(value: &str, cookies: &mut BTreeMap<String, String>) -> Result<(), SweepError> {
    // an empty segment (`a=1;`, a bare `Cookie:`) has no `=` either
    for segment in value.split(';').map(str::trim) {
        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| SweepError::MalformedCookie {
                segment: segment.to_string(),
            })?;

        cookies.insert(name.trim().to_string(), value.trim().to_string());
    }

    Ok(())
}

impl FromStr for RequestTemplate {
    type Err = SweepError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Display for RequestTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL: {}", self.url)?;
        writeln!(f, "Headers: {:?}", self.headers)?;
        writeln!(f, "Cookies: {:?}", self.cookies)?;
        write!(f, "Body Template: {}", self.body)
    }
}
