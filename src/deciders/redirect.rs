use super::Decider;
use crate::actions::Action;
use crate::responses::Response;

use tracing::instrument;

/// status code that signals an accepted code
pub const DEFAULT_SUCCESS_STATUS: u16 = 302;

/// substring the `Location` header must contain for an accepted code
pub const DEFAULT_LOCATION_MARKER: &str = "login.php";

/// Decide upon an [`Action`] based on a response's status code and its `Location` header
///
/// a response is a hit iff its status code is exactly the expected one AND its
/// `Location` header contains the expected marker; anything else is discarded
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use std::time::Duration;
/// # use codesweep::actions::Action;
/// # use codesweep::deciders::{Decider, RedirectDecider};
/// # use codesweep::requests::RequestId;
/// # use codesweep::responses::Response;
/// let decider = RedirectDecider::default();
///
/// let mut headers = HashMap::new();
/// headers.insert("location".to_string(), b"login.php?mfa=ok".to_vec());
///
/// let hit = Response::new(RequestId::new(0), 302, headers.clone(), Duration::ZERO);
/// let miss = Response::new(RequestId::new(1), 200, headers, Duration::ZERO);
///
/// assert_eq!(decider.decide(&hit), Action::StopSearching);
/// assert_eq!(decider.decide(&miss), Action::Discard);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RedirectDecider {
    status_code: u16,
    location_marker: String,
}

impl RedirectDecider {
    /// create a new `RedirectDecider` that expects `status_code` and a `Location`
    /// header containing `location_marker`
    pub fn new(status_code: u16, location_marker: impl Into<String>) -> Self {
        Self {
            status_code,
            location_marker: location_marker.into(),
        }
    }

    /// the expected status code
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// the substring the `Location` header must contain
    #[must_use]
    pub fn location_marker(&self) -> &str {
        &self.location_marker
    }
}

impl Default for RedirectDecider {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_STATUS, DEFAULT_LOCATION_MARKER)
    }
}

impl Decider for RedirectDecider {
    #[instrument(skip_all, level = "trace")]
    fn decide(&self, response: &Response) -> Action {
        if response.status_code() != self.status_code {
            return Action::Discard;
        }

        match response.location() {
            Some(location) if location.contains(&self.location_marker) => Action::StopSearching,
            _ => Action::Discard,
        }
    }
}
