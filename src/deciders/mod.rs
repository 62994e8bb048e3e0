//! [`Decider`]s examine a [`Response`] and reach an [`Action`] about the candidate that
//! produced it
//!
//! [`Response`]: crate::responses::Response
mod redirect;

pub use self::redirect::{RedirectDecider, DEFAULT_LOCATION_MARKER, DEFAULT_SUCCESS_STATUS};

use crate::actions::Action;
use crate::responses::Response;

/// A trait that decides whether a response proves its candidate was accepted
///
/// implementors are shared between every worker, and so must be `Send + Sync`
pub trait Decider: Send + Sync {
    /// examine the given [`Response`] and reach a decision
    fn decide(&self, response: &Response) -> Action;
}
