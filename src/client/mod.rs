//! Asynchronous http client trait, with an implementation using [`reqwest`]
mod async_client;
mod utils; // maps reqwest errors to SweepError

pub use self::async_client::AsyncClient;

use async_trait::async_trait;

use crate::error::SweepError;
use crate::requests::Request;
use crate::responses::Response;

/// trait for asynchronous clients
///
/// any error returned from [`AsyncRequests::send`] is treated as a failed attempt
/// for that one candidate and never stops a search
#[async_trait]
pub trait AsyncRequests: Send + Sync {
    /// send the given [`Request`] as a form `POST`, without following redirects,
    /// and receive its [`Response`]
    ///
    /// see [`AsyncClient`] for an example
    ///
    /// # Note
    ///
    /// This is the most likely place to populate the `elapsed` field of the resulting [`Response`]
    ///
    /// # Errors
    ///
    /// Implementors should return a [`SweepError::RequestError`] when things go awry
    async fn send(&self, request: Request) -> Result<Response, SweepError>;
}
