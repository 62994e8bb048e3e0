//! Custom error-type definitions
use thiserror::Error;
use url::ParseError;

/// primary error-type for the codesweep library
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SweepError {
    /// Represents a raw request whose structure couldn't be understood, i.e. a
    /// request line that isn't exactly `METHOD PATH VERSION`
    #[error("Malformed request, {reason}: `{line}`")]
    MalformedRequest {
        /// what was wrong with the offending line
        reason: &'static str,

        /// the offending line
        line: String,
    },

    /// Represents a raw request without any `Host:` header line
    #[error("Malformed request, no `Host` header was found")]
    MissingHost,

    /// Represents a `Cookie` header segment that has no `=` separator
    #[error("Malformed request, the cookie segment `{segment}` has no `=`")]
    MalformedCookie {
        /// the segment that couldn't be split into a name and value
        segment: String,
    },

    /// Represents a failure to parse the given string into a [`url::Url`](https://docs.rs/url/latest/url/struct.Url.html).
    #[error("The url `{url}` is invalid and couldn't be parsed.")]
    InvalidUrl {
        /// underlying source error-type
        source: ParseError,

        /// the url that couldn't be parsed
        url: String,
    },

    /// Represents an invalid parameter passed to some function or constructor
    #[error("Invalid parameter provided, {message}: {param}")]
    InvalidParameter {
        /// the failing parameter
        param: String,

        /// the associated message to help the user
        message: &'static str,
    },

    /// Represents a failure encountered during sending a request / receiving a response
    #[error("An error occurred while sending the request: {kind:?} {message}")]
    RequestError {
        /// what category of error occurred
        kind: RequestErrorKind,

        /// the underlying error message
        message: String,
    },

    /// Represents a failure to build the underlying [`reqwest::Client`]
    #[error("Could not build the http client")]
    ClientBuildError {
        /// underlying source error-type
        #[from]
        source: reqwest::Error,
    },

    /// Represents a poisoned lock around the shared search state
    #[error("The shared search state is poisoned; a worker panicked while holding it")]
    PoisonedState,

    /// Represents a failure to open a configuration file.
    #[error("The configuration file `{path}` couldn't be opened.")]
    ConfigFileOpenError {
        /// underlying source error-type
        source: std::io::Error,

        /// path to the file that couldn't be opened
        path: String,
    },

    /// Represents a failure to parse a configuration file's JSON
    #[error("Could not parse the given configuration as JSON")]
    JSONParseError {
        /// underlying source error-type
        #[from]
        source: serde_json::Error,
    },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError {
        /// underlying source error-type
        #[from]
        source: std::io::Error,
    },
}

impl SweepError {
    /// whether or not this error means the raw request couldn't be turned into a
    /// [`RequestTemplate`]; these are the only errors fatal to a whole search
    ///
    /// [`RequestTemplate`]: crate::requests::RequestTemplate
    #[must_use]
    pub const fn is_malformed_request(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest { .. }
                | Self::MissingHost
                | Self::MalformedCookie { .. }
                | Self::InvalidUrl { .. }
        )
    }

    /// the [`RequestErrorKind`] of a transport error, if this is one
    #[must_use]
    pub const fn request_error_kind(&self) -> Option<RequestErrorKind> {
        match self {
            Self::RequestError { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Used to differentiate between different types of errors that occur when making requests.
///
/// That differentiation is then used internally to update the proper error counts in [`Statistics`]
///
/// [`Statistics`]: crate::statistics::Statistics
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[non_exhaustive]
pub enum RequestErrorKind {
    /// Represents a failure to read a response body
    Body(Option<u16>),

    /// Represents a failure to build the request from the template, i.e. an invalid header name
    Builder,

    /// Represents a failure during client connection to target
    Connect(Option<u16>),

    /// Represents a failure to decode a response body
    Decode(Option<u16>),

    /// Represents a failure to related to redirection
    Redirect(Option<u16>),

    /// Represents a failure related to the request
    Request(Option<u16>),

    /// Represents a timeout during the request
    Timeout,

    /// Represents an unexpected error
    #[default]
    Unknown,
}
