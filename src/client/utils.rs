use crate::error::{RequestErrorKind, SweepError};
use tracing::{debug, instrument};

/// internal helper to convert [`reqwest::Error`] to [`SweepError`]
#[allow(clippy::needless_pass_by_value)]
#[instrument(skip_all, level = "trace")]
pub(super) fn reqwest_to_sweep_error(source: reqwest::Error) -> SweepError {
    let status = source.status().map(|status_code| status_code.as_u16());

    let kind = if source.is_builder() {
        // invalid header names/values from the captured request end up here
        RequestErrorKind::Builder
    } else if source.is_body() {
        RequestErrorKind::Body(status)
    } else if source.is_connect() {
        // note: connect is a more specific error than a request error and both
        // can be true at the same time; don't change the order of the if statements
        // without thinking about the specificity of the error
        RequestErrorKind::Connect(status)
    } else if source.is_decode() {
        RequestErrorKind::Decode(status)
    } else if source.is_redirect() {
        RequestErrorKind::Redirect(status)
    } else if source.is_timeout() {
        // note: timeout is a more specific error than a request error, same as connect
        RequestErrorKind::Timeout
    } else if source.is_request() {
        RequestErrorKind::Request(status)
    } else {
        RequestErrorKind::Unknown
    };

    // transport errors are expected and plentiful against a struggling target; they're
    // counted in the statistics, so debug is loud enough
    debug!(?kind, "error occurred while sending request: {}", source);

    SweepError::RequestError {
        kind,
        message: source.to_string(),
    }
}
